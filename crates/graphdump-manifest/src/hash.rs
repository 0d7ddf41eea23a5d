//! BLAKE3 content hashing.
//!
//! Manifests are hashed over every field except the stored hash, so any
//! later edit is detectable. Script files are hashed as raw bytes.

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::ExportManifest;

/// Hashable representation of a manifest (excludes content_hash).
#[derive(Serialize)]
struct HashableManifest<'a> {
    id: &'a crate::ManifestId,
    source: &'a str,
    node_count: &'a str,
    relationship_count: &'a str,
    scripts: &'a [crate::ScriptDigest],
    started_at: &'a chrono::DateTime<chrono::Utc>,
    completed_at: &'a Option<chrono::DateTime<chrono::Utc>>,
}

/// Compute the BLAKE3 hash of a manifest's content.
///
/// Serializes all fields except `content_hash` to JSON, then hashes the
/// bytes. Returns the hex-encoded hash.
pub fn compute_manifest_hash(manifest: &ExportManifest) -> String {
    let hashable = HashableManifest {
        id: &manifest.id,
        source: &manifest.source,
        node_count: &manifest.node_count,
        relationship_count: &manifest.relationship_count,
        scripts: &manifest.scripts,
        started_at: &manifest.started_at,
        completed_at: &manifest.completed_at,
    };

    let json = serde_json::to_vec(&hashable).expect("Manifest serialization should not fail");
    blake3::hash(&json).to_hex().to_string()
}

/// Hex BLAKE3 digest of a byte slice.
pub fn digest_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Hex BLAKE3 digest of a file's contents.
pub fn digest_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(digest_bytes(&bytes))
}
