//! graphdump-manifest: Hashed records of export runs.
//!
//! A manifest captures what one export run produced: the source it read
//! from, the counts the source reported, and a BLAKE3 digest of every
//! statement script written. The manifest itself is content-hashed so a
//! modified manifest is detectable, and the script digests let two runs
//! be compared for byte-identical output.

pub mod hash;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Core Types ───────────────────────────────────────────────────

/// Unique identifier for an export run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ManifestId(pub Uuid);

impl ManifestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ManifestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ManifestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ManifestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Digest of one statement script written by a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptDigest {
    /// File name relative to the export directory.
    pub file_name: String,
    /// Statements written.
    pub statements: u64,
    /// Rows skipped because they could not be parsed.
    pub malformed: u64,
    /// BLAKE3 hex digest of the file contents.
    pub blake3: String,
}

/// The record of one export run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportManifest {
    pub id: ManifestId,
    /// Which source the records were read from ("shell" or "bolt").
    pub source: String,
    /// Node count as reported by the source, verbatim.
    pub node_count: String,
    /// Relationship count as reported by the source, verbatim.
    pub relationship_count: String,
    pub scripts: Vec<ScriptDigest>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl ExportManifest {
    /// Compute the BLAKE3 hash of the manifest's content.
    /// The hash covers all fields except `content_hash` itself.
    pub fn compute_hash(&self) -> String {
        hash::compute_manifest_hash(self)
    }

    /// Verify that the stored content_hash matches a freshly computed hash.
    pub fn verify_integrity(&self) -> bool {
        match &self.content_hash {
            Some(stored) => stored == &self.compute_hash(),
            None => false,
        }
    }

    /// Look up the digest recorded for a script file.
    pub fn script(&self, file_name: &str) -> Option<&ScriptDigest> {
        self.scripts.iter().find(|s| s.file_name == file_name)
    }

    /// True when both runs wrote the same scripts with identical bytes.
    pub fn same_output(&self, other: &ExportManifest) -> bool {
        self.scripts.len() == other.scripts.len()
            && self.scripts.iter().all(|s| {
                other
                    .script(&s.file_name)
                    .is_some_and(|o| o.blake3 == s.blake3)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ManifestSession;

    fn digest(name: &str, hash: &str) -> ScriptDigest {
        ScriptDigest {
            file_name: name.to_string(),
            statements: 3,
            malformed: 0,
            blake3: hash.to_string(),
        }
    }

    #[test]
    fn same_output_compares_digests_by_file() {
        let mut a = ManifestSession::new("shell");
        a.add_script(digest("01_nodes.cypher", "aa"));
        a.add_script(digest("02_relationships.cypher", "bb"));
        let a = a.finalize();

        let mut b = ManifestSession::new("shell");
        b.add_script(digest("02_relationships.cypher", "bb"));
        b.add_script(digest("01_nodes.cypher", "aa"));
        let b = b.finalize();

        assert!(a.same_output(&b));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn changed_digest_is_different_output() {
        let mut a = ManifestSession::new("shell");
        a.add_script(digest("01_nodes.cypher", "aa"));
        let a = a.finalize();

        let mut b = ManifestSession::new("shell");
        b.add_script(digest("01_nodes.cypher", "cc"));
        let b = b.finalize();

        assert!(!a.same_output(&b));
    }

    #[test]
    fn manifest_id_parses() {
        let id = ManifestId::new();
        let parsed: ManifestId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ManifestId>().is_err());
    }
}
