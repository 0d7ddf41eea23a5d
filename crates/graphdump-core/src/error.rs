use thiserror::Error;

/// Why a single result row could not be turned into a record.
///
/// Row errors never abort an export: the row is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),

    #[error("Invalid relationship type: {0:?}")]
    InvalidRelationshipType(String),

    #[error("Invalid property key: {0:?}")]
    InvalidPropertyKey(String),

    #[error("Missing {0} identifier")]
    MissingIdentifier(&'static str),

    #[error("Unsupported value for property {key}: {kind}")]
    UnsupportedValue { key: String, kind: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),
}

/// A row that was recognised as data but could not be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct MalformedRow {
    /// The raw line, or a description of the driver row.
    pub line: String,
    #[source]
    pub error: RecordError,
}

impl MalformedRow {
    pub fn new(line: impl Into<String>, error: RecordError) -> Self {
        Self {
            line: line.into(),
            error,
        }
    }

    /// The first 50 characters of the offending line, for log output.
    pub fn excerpt(&self) -> String {
        let mut excerpt: String = self.line.chars().take(50).collect();
        if self.line.chars().count() > 50 {
            excerpt.push_str("...");
        }
        excerpt
    }
}
