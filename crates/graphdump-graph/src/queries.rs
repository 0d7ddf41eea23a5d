//! Export queries and conversion of driver rows into records.
//!
//! The query texts are shared with the command-line source so both
//! sources ask the database the same questions.

use std::fmt;

use neo4rs::query;
use serde_json::Value;

use graphdump_core::{
    is_identifier, MalformedRow, NodeRecord, PropertyMap, PropertyValue, RecordError,
    RelationshipProperties, RelationshipRecord,
};

use crate::client::{GraphClient, GraphError};

/// Every node with its labels and properties.
pub const NODES_QUERY: &str = "MATCH (n) RETURN labels(n) as labels, properties(n) as props";

/// Total node count.
pub const COUNT_NODES_QUERY: &str = "MATCH (n) RETURN count(n)";

/// Total relationship count.
pub const COUNT_RELATIONSHIPS_QUERY: &str = "MATCH ()-[r]->() RETURN count(r)";

/// Every relationship whose endpoints both carry the identity property.
pub fn relationships_query(identity: &str) -> String {
    format!(
        "MATCH (a)-[r]->(b)
WHERE a.{identity} IS NOT NULL AND b.{identity} IS NOT NULL
RETURN a.{identity} as from_iri, type(r) as rel_type, properties(r) as props, b.{identity} as to_iri"
    )
}

/// One fetched row: a record, or the reason it was rejected.
pub type Fetched<T> = Result<T, MalformedRow>;

impl GraphClient {
    pub async fn count_nodes(&self) -> Result<i64, GraphError> {
        self.count(COUNT_NODES_QUERY).await
    }

    pub async fn count_relationships(&self) -> Result<i64, GraphError> {
        self.count(COUNT_RELATIONSHIPS_QUERY).await
    }

    async fn count(&self, cypher: &str) -> Result<i64, GraphError> {
        let cypher = format!("{cypher} AS cnt");
        match self.query_one(query(&cypher)).await? {
            Some(row) => row
                .get::<i64>("cnt")
                .map_err(|e| GraphError::Deserialization(format!("Failed to read count: {e}"))),
            None => Ok(0),
        }
    }

    /// Fetch every node as a record.
    pub async fn fetch_nodes(&self) -> Result<Vec<Fetched<NodeRecord>>, GraphError> {
        let rows = self.query_rows(query(NODES_QUERY)).await?;
        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            results.push(node_from_columns(row.get("labels"), row.get("props")));
        }

        tracing::debug!(rows = results.len(), "Fetched node rows");
        Ok(results)
    }

    /// Fetch every relationship between identified nodes as a record.
    pub async fn fetch_relationships(
        &self,
        identity: &str,
    ) -> Result<Vec<Fetched<RelationshipRecord>>, GraphError> {
        let rows = self
            .query_rows(query(&relationships_query(identity)))
            .await?;
        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            results.push(relationship_from_columns(
                row.get("from_iri"),
                row.get("rel_type"),
                row.get("props"),
                row.get("to_iri"),
            ));
        }

        tracing::debug!(rows = results.len(), "Fetched relationship rows");
        Ok(results)
    }
}

/// Take a column value, or reject the row if the driver could not read it.
pub fn read_column<T, E: fmt::Display>(column: &str, read: Result<T, E>) -> Fetched<T> {
    read.map_err(|e| {
        MalformedRow::new(
            format!("unreadable {column} column: {e}"),
            RecordError::MissingColumn(column.to_string()),
        )
    })
}

/// Build a node record from the driver's reads of `labels` and `props`.
pub fn node_from_columns<E: fmt::Display>(
    labels: Result<Vec<String>, E>,
    props: Result<Value, E>,
) -> Fetched<NodeRecord> {
    let labels = read_column("labels", labels)?;
    let props = read_column("props", props)?;
    node_from_row(labels, props)
}

/// Build a relationship record from the driver's reads of its four columns.
pub fn relationship_from_columns<E: fmt::Display>(
    from: Result<Value, E>,
    rel_type: Result<String, E>,
    props: Result<Value, E>,
    to: Result<Value, E>,
) -> Fetched<RelationshipRecord> {
    relationship_from_row(
        read_column("from_iri", from)?,
        read_column("rel_type", rel_type)?,
        read_column("props", props)?,
        read_column("to_iri", to)?,
    )
}

/// Build a node record from the `labels` and `props` columns.
pub fn node_from_row(labels: Vec<String>, props: Value) -> Fetched<NodeRecord> {
    let describe = || format!("{labels:?}, {props}");

    if let Some(bad) = labels.iter().find(|label| !is_identifier(label)) {
        return Err(MalformedRow::new(describe(), RecordError::InvalidLabel(bad.clone())));
    }

    let properties = match &props {
        Value::Object(map) => property_map(map).map_err(|e| MalformedRow::new(describe(), e))?,
        Value::Null => PropertyMap::new(),
        _ => {
            return Err(MalformedRow::new(
                describe(),
                RecordError::MissingColumn("props".to_string()),
            ))
        }
    };

    Ok(NodeRecord { labels, properties })
}

/// Build a relationship record from its four columns.
pub fn relationship_from_row(
    from: Value,
    rel_type: String,
    props: Value,
    to: Value,
) -> Fetched<RelationshipRecord> {
    let describe = || format!("{from}, {rel_type}, {props}, {to}");

    let build = || -> Result<RelationshipRecord, RecordError> {
        let from_id = identifier(&from).ok_or(RecordError::MissingIdentifier("source"))?;
        let to_id = identifier(&to).ok_or(RecordError::MissingIdentifier("destination"))?;
        if !is_identifier(&rel_type) {
            return Err(RecordError::InvalidRelationshipType(rel_type.clone()));
        }

        let properties = match &props {
            Value::Object(map) if !map.is_empty() => {
                Some(RelationshipProperties::Typed(property_map(map)?))
            }
            _ => None,
        };

        Ok(RelationshipRecord {
            from_id,
            rel_type: rel_type.clone(),
            properties,
            to_id,
        })
    };

    build().map_err(|e| MalformedRow::new(describe(), e))
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn property_map(map: &serde_json::Map<String, Value>) -> Result<PropertyMap, RecordError> {
    let mut props = PropertyMap::new();
    for (key, value) in map {
        if !is_identifier(key) {
            return Err(RecordError::InvalidPropertyKey(key.clone()));
        }
        props.insert(key.as_str(), property_value(key, value)?);
    }
    Ok(props)
}

/// Convert a driver value into a property value.
///
/// Nulls and nested maps cannot be written back as property literals.
pub fn property_value(key: &str, value: &Value) -> Result<PropertyValue, RecordError> {
    let unsupported = |kind: &str| RecordError::UnsupportedValue {
        key: key.to_string(),
        kind: kind.to_string(),
    };

    match value {
        Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(PropertyValue::Integer(i)),
            None => n
                .as_f64()
                .map(PropertyValue::Float)
                .ok_or_else(|| unsupported("number")),
        },
        Value::String(s) => Ok(PropertyValue::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) => Err(unsupported("nested list")),
                other => property_value(key, other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::List),
        Value::Null => Err(unsupported("null")),
        Value::Object(_) => Err(unsupported("map")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relationships_query_uses_identity_property() {
        let q = relationships_query("iri");
        assert!(q.contains("WHERE a.iri IS NOT NULL AND b.iri IS NOT NULL"));
        assert!(q.contains("RETURN a.iri as from_iri"));
        assert!(q.contains("b.iri as to_iri"));

        let q = relationships_query("uid");
        assert!(q.contains("a.uid as from_iri"));
        assert!(!q.contains("iri IS NOT NULL"));
    }

    #[test]
    fn node_row_converts_scalars() {
        let node = node_from_row(
            vec!["Device".to_string(), "Router".to_string()],
            json!({"active": true, "name": "Router-1", "port": 8080, "load": 0.5}),
        )
        .unwrap();

        assert_eq!(node.labels, vec!["Device", "Router"]);
        assert_eq!(node.properties.get("active"), Some(&PropertyValue::Bool(true)));
        assert_eq!(node.properties.get("port"), Some(&PropertyValue::Integer(8080)));
        assert_eq!(node.properties.get("load"), Some(&PropertyValue::Float(0.5)));
        assert_eq!(
            node.properties.get("name"),
            Some(&PropertyValue::from("Router-1"))
        );
    }

    #[test]
    fn node_row_converts_lists() {
        let node = node_from_row(vec![], json!({"tags": ["core", "edge"]})).unwrap();
        assert_eq!(
            node.properties.get("tags"),
            Some(&PropertyValue::List(vec!["core".into(), "edge".into()]))
        );
    }

    #[test]
    fn node_row_rejects_nested_map() {
        let err = node_from_row(vec!["X".to_string()], json!({"meta": {"a": 1}})).unwrap_err();
        assert!(matches!(err.error, RecordError::UnsupportedValue { ref key, .. } if key == "meta"));
    }

    #[test]
    fn relationship_row_with_empty_props_has_none() {
        let rel = relationship_from_row(
            json!("urn:a"),
            "CONNECTS_TO".to_string(),
            json!({}),
            json!("urn:b"),
        )
        .unwrap();
        assert_eq!(rel.from_id, "urn:a");
        assert_eq!(rel.to_id, "urn:b");
        assert!(rel.properties.is_none());
    }

    #[test]
    fn relationship_row_keeps_typed_props() {
        let rel = relationship_from_row(
            json!("urn:a"),
            "LINKS".to_string(),
            json!({"weight": 3}),
            json!("urn:b"),
        )
        .unwrap();
        match rel.properties {
            Some(RelationshipProperties::Typed(props)) => {
                assert_eq!(props.get("weight"), Some(&PropertyValue::Integer(3)));
            }
            other => panic!("expected typed props, got {other:?}"),
        }
    }

    #[test]
    fn node_row_rejects_unusable_names() {
        let err = node_from_row(vec!["Bad Label".to_string()], json!({"x": 1})).unwrap_err();
        assert_eq!(err.error, RecordError::InvalidLabel("Bad Label".to_string()));

        let err = node_from_row(vec!["Device".to_string()], json!({"my-key": 1})).unwrap_err();
        assert_eq!(err.error, RecordError::InvalidPropertyKey("my-key".to_string()));

        let err = node_from_row(vec!["3G".to_string()], json!({})).unwrap_err();
        assert_eq!(err.error, RecordError::InvalidLabel("3G".to_string()));
    }

    #[test]
    fn relationship_row_rejects_unusable_names() {
        let err = relationship_from_row(
            json!("urn:a"),
            "HAS PART".to_string(),
            json!({}),
            json!("urn:b"),
        )
        .unwrap_err();
        assert_eq!(
            err.error,
            RecordError::InvalidRelationshipType("HAS PART".to_string())
        );

        let err = relationship_from_row(
            json!("urn:a"),
            "LINKS".to_string(),
            json!({"link speed": 10}),
            json!("urn:b"),
        )
        .unwrap_err();
        assert_eq!(
            err.error,
            RecordError::InvalidPropertyKey("link speed".to_string())
        );
    }

    #[test]
    fn unreadable_node_column_rejects_row() {
        let err = node_from_columns(
            Ok(vec!["Device".to_string()]),
            Err("cannot convert Point2D"),
        )
        .unwrap_err();
        assert_eq!(err.error, RecordError::MissingColumn("props".to_string()));
        assert!(err.line.contains("cannot convert Point2D"));

        let err = node_from_columns(Err("not a list"), Ok(json!({"x": 1}))).unwrap_err();
        assert_eq!(err.error, RecordError::MissingColumn("labels".to_string()));
    }

    #[test]
    fn unreadable_relationship_column_rejects_row() {
        let err = relationship_from_columns(
            Ok(json!("urn:a")),
            Ok("LINKS".to_string()),
            Err("cannot convert Duration"),
            Ok(json!("urn:b")),
        )
        .unwrap_err();
        assert_eq!(err.error, RecordError::MissingColumn("props".to_string()));

        let rel = relationship_from_columns::<&str>(
            Ok(json!("urn:a")),
            Ok("LINKS".to_string()),
            Ok(json!({})),
            Ok(json!("urn:b")),
        )
        .unwrap();
        assert_eq!(rel.rel_type, "LINKS");
    }

    #[test]
    fn relationship_row_requires_identifiers() {
        let err =
            relationship_from_row(Value::Null, "LINKS".to_string(), json!({}), json!("urn:b"))
                .unwrap_err();
        assert_eq!(err.error, RecordError::MissingIdentifier("source"));
    }
}
