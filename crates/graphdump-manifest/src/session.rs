//! Builder for a run manifest.
//!
//! ```no_run
//! # use graphdump_manifest::session::ManifestSession;
//! # use graphdump_manifest::ScriptDigest;
//! let mut session = ManifestSession::new("shell");
//! session.set_counts("42", "17");
//! session.add_script(ScriptDigest {
//!     file_name: "01_nodes.cypher".to_string(),
//!     statements: 42,
//!     malformed: 0,
//!     blake3: "00".repeat(32),
//! });
//! let manifest = session.finalize();
//! assert!(manifest.verify_integrity());
//! ```

use chrono::Utc;

use crate::{ExportManifest, ManifestId, ScriptDigest};

/// Records one export run incrementally.
pub struct ManifestSession {
    manifest: ExportManifest,
}

impl ManifestSession {
    /// Start recording a run against the named source.
    pub fn new(source: &str) -> Self {
        Self {
            manifest: ExportManifest {
                id: ManifestId::new(),
                source: source.to_string(),
                node_count: String::new(),
                relationship_count: String::new(),
                scripts: Vec::new(),
                started_at: Utc::now(),
                completed_at: None,
                content_hash: None,
            },
        }
    }

    /// Record the counts the source reported before the export.
    pub fn set_counts(&mut self, nodes: &str, relationships: &str) {
        self.manifest.node_count = nodes.to_string();
        self.manifest.relationship_count = relationships.to_string();
    }

    pub fn add_script(&mut self, digest: ScriptDigest) {
        self.manifest.scripts.push(digest);
    }

    /// Finalize: set completed_at and compute the content hash.
    pub fn finalize(mut self) -> ExportManifest {
        self.manifest.completed_at = Some(Utc::now());
        let hash = self.manifest.compute_hash();
        self.manifest.content_hash = Some(hash);
        self.manifest
    }
}
