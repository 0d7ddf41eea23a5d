//! Parser for the client's `--format plain` output.
//!
//! The plain format prints a header line followed by one row per line,
//! columns joined by `, `. Nothing about it is escaped or documented, so
//! parsing is heuristic: strings are recognised by their surrounding
//! quotes, maps by braces, and a value containing `, ` or `}` will be
//! cut short.

use std::sync::OnceLock;

use regex::Regex;

use graphdump_core::{
    is_identifier, NodeRecord, PropertyMap, PropertyValue, RecordError, RelationshipProperties,
    RelationshipRecord,
};

/// `key: value` pairs inside a rendered map.
fn property_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\w+):\s*([^,}]+)").expect("valid property pattern"))
}

/// Data rows of a plain-format result: the output is trimmed, the header
/// line dropped, and blank lines ignored.
pub fn data_lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .trim()
        .split('\n')
        .skip(1)
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

/// The last line of a result, which for a single-value query is the value.
pub fn last_line(output: &str) -> &str {
    output.trim().rsplit('\n').next().unwrap_or("").trim()
}

/// Parse one row of `labels(n), properties(n)`.
///
/// Returns `Ok(None)` for a row without the `, {` that separates labels
/// from properties; such rows are not data and are skipped silently.
pub fn parse_node_line(line: &str) -> Result<Option<NodeRecord>, RecordError> {
    let Some((labels_part, props_rest)) = line.split_once(", {") else {
        return Ok(None);
    };

    let labels_str = labels_part.trim_matches(|c| matches!(c, '[' | ']' | '"' | ' '));
    let mut labels = Vec::new();
    for token in labels_str.split(',') {
        if token.trim().is_empty() {
            continue;
        }
        let label = token.trim_matches(|c| c == '"' || c == ' ');
        if !is_identifier(label) {
            return Err(RecordError::InvalidLabel(label.to_string()));
        }
        labels.push(label.to_string());
    }

    let props_str = format!("{{{props_rest}");
    let properties = parse_properties(&props_str)?;

    Ok(Some(NodeRecord { labels, properties }))
}

/// Scan a rendered map for `key: value` pairs.
pub fn parse_properties(text: &str) -> Result<PropertyMap, RecordError> {
    let mut props = PropertyMap::new();
    for caps in property_pattern().captures_iter(text) {
        let key = &caps[1];
        if !is_identifier(key) {
            return Err(RecordError::InvalidPropertyKey(key.to_string()));
        }
        props.insert(key, infer_value(caps[2].trim()));
    }
    Ok(props)
}

/// Type a rendered value from its text.
///
/// Quoted text is a string; `true`/`false` (any case) a boolean; text that
/// parses as an integer or a finite float a number. Anything else is kept
/// as a string of the raw text.
pub fn infer_value(text: &str) -> PropertyValue {
    if text.starts_with('"') && text.ends_with('"') {
        let inner = if text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            ""
        };
        return PropertyValue::String(inner.to_string());
    }

    if text.eq_ignore_ascii_case("true") {
        return PropertyValue::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return PropertyValue::Bool(false);
    }
    if let Ok(n) = text.parse::<i64>() {
        return PropertyValue::Integer(n);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && looks_numeric(text) => PropertyValue::Float(f),
        _ => PropertyValue::String(text.to_string()),
    }
}

// `f64::from_str` also accepts "inf" and "NaN" spellings.
fn looks_numeric(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// Parse one row of `from_iri, rel_type, props, to_iri`.
///
/// The destination is always the last `, `-separated token and the
/// properties are everything between the type and the destination, so an
/// identifier containing `, ` misparses. Rows with fewer than three
/// tokens are skipped silently.
pub fn parse_relationship_line(line: &str) -> Result<Option<RelationshipRecord>, RecordError> {
    let parts: Vec<&str> = line.split(", ").collect();
    if parts.len() < 3 {
        return Ok(None);
    }

    let strip = |s: &str| s.trim_matches(|c| c == '"' || c == ' ').to_string();

    let from_id = strip(parts[0]);
    let rel_type = strip(parts[1]);
    let to_id = strip(parts[parts.len() - 1]);

    if from_id.is_empty() {
        return Err(RecordError::MissingIdentifier("source"));
    }
    if to_id.is_empty() {
        return Err(RecordError::MissingIdentifier("destination"));
    }
    if !is_identifier(&rel_type) {
        return Err(RecordError::InvalidRelationshipType(rel_type));
    }

    let properties = if parts.len() > 3 {
        let props = parts[2..parts.len() - 1].join(", ");
        (!props.is_empty() && props != "{}").then_some(RelationshipProperties::Verbatim(props))
    } else {
        None
    };

    Ok(Some(RelationshipRecord {
        from_id,
        rel_type,
        properties,
        to_id,
    }))
}
