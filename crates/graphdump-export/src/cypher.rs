//! Rendering records as Cypher replay statements.

use graphdump_core::{
    NodeRecord, PropertyMap, PropertyValue, RelationshipProperties, RelationshipRecord,
};

/// Escape text for use inside a double-quoted Cypher string.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render a property value as a Cypher literal.
pub fn format_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Integer(n) => n.to_string(),
        // Debug keeps a fractional part (`1.0`), so the value stays a float.
        PropertyValue::Float(f) => format!("{f:?}"),
        PropertyValue::String(s) => format!("\"{}\"", escape_string(s)),
        PropertyValue::List(items) => {
            let items: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// Render a property map literal, or an empty string for no properties.
pub fn format_properties(props: &PropertyMap) -> String {
    if props.is_empty() {
        return String::new();
    }
    let pairs: Vec<_> = props
        .iter()
        .map(|(k, v)| format!("{k}: {}", format_value(v)))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

/// `CREATE (:L1:L2 {k: v});` followed by a newline.
pub fn create_node_statement(node: &NodeRecord) -> String {
    let label_part = if node.labels.is_empty() {
        String::new()
    } else {
        format!(":{}", node.labels.join(":"))
    };

    let props = format_properties(&node.properties);
    let props_part = if props.is_empty() {
        String::new()
    } else {
        format!(" {props}")
    };

    format!("CREATE ({label_part}{props_part});\n")
}

/// A MATCH on both endpoints by identity property, then the CREATE of the
/// relationship, followed by a blank line.
pub fn create_relationship_statement(rel: &RelationshipRecord, identity: &str) -> String {
    let props_part = match &rel.properties {
        Some(RelationshipProperties::Verbatim(text)) => format!(" {text}"),
        Some(RelationshipProperties::Typed(props)) if !props.is_empty() => {
            format!(" {}", format_properties(props))
        }
        _ => String::new(),
    };

    format!(
        "MATCH (a {{{identity}: \"{from}\"}}), (b {{{identity}: \"{to}\"}})\n\
         CREATE (a)-[:{rel_type}{props_part}]->(b);\n\n",
        from = escape_string(&rel.from_id),
        to = escape_string(&rel.to_id),
        rel_type = rel.rel_type,
    )
}
