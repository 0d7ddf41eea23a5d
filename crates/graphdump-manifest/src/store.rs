//! Manifest storage: trait + file-system implementation.
//!
//! Manifests are stored as pretty JSON files organized by date and run ID.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{ExportManifest, ManifestId};

/// Errors that can occur during manifest storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Manifest not found: {0}")]
    NotFound(ManifestId),

    #[error("No manifests recorded under {0}")]
    Empty(String),

    #[error("Integrity check failed for manifest {0}: stored hash does not match content")]
    IntegrityViolation(ManifestId),

    #[error("Manifest has no content hash (not finalized)")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Query parameters for listing manifests.
#[derive(Debug, Default)]
pub struct ManifestQuery {
    /// Only runs read from this source kind.
    pub source: Option<String>,
}

/// Trait for manifest persistence backends.
pub trait ManifestStore {
    /// Store a finalized manifest. Returns an error if it has no content hash.
    fn save(&self, manifest: &ExportManifest) -> Result<PathBuf, StoreError>;

    /// Retrieve a manifest by ID, verifying integrity.
    fn get(&self, id: ManifestId) -> Result<ExportManifest, StoreError>;

    /// List manifests matching the query, ordered by started_at descending.
    fn list(&self, query: &ManifestQuery) -> Result<Vec<ExportManifest>, StoreError>;

    /// The most recently started run matching the query, verified.
    fn latest(&self, query: &ManifestQuery) -> Result<ExportManifest, StoreError>;
}

/// File-system backed manifest store.
///
/// ```text
/// {root}/
///   2026/
///     10/
///       15/
///         {run_id}.json
/// ```
pub struct FileManifestStore {
    root: PathBuf,
}

impl FileManifestStore {
    /// Create a new store rooted at the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn manifest_path(&self, manifest: &ExportManifest) -> PathBuf {
        let date = manifest.started_at.format("%Y/%m/%d");
        self.root.join(format!("{}/{}.json", date, manifest.id.0))
    }

    fn find_path(&self, id: ManifestId) -> Result<PathBuf, StoreError> {
        let filename = format!("{}.json", id.0);
        find_file_recursive(&self.root, &filename).ok_or(StoreError::NotFound(id))
    }
}

impl ManifestStore for FileManifestStore {
    fn save(&self, manifest: &ExportManifest) -> Result<PathBuf, StoreError> {
        if manifest.content_hash.is_none() {
            return Err(StoreError::NotFinalized);
        }

        let path = self.manifest_path(manifest);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(&path, json)?;

        tracing::debug!(
            manifest_id = %manifest.id,
            path = %path.display(),
            "Manifest saved"
        );

        Ok(path)
    }

    fn get(&self, id: ManifestId) -> Result<ExportManifest, StoreError> {
        let path = self.find_path(id)?;
        let json = fs::read_to_string(&path)?;
        let manifest: ExportManifest = serde_json::from_str(&json)?;

        if !manifest.verify_integrity() {
            return Err(StoreError::IntegrityViolation(id));
        }

        Ok(manifest)
    }

    fn list(&self, query: &ManifestQuery) -> Result<Vec<ExportManifest>, StoreError> {
        let mut results = Vec::new();
        collect_manifests_recursive(&self.root, query, &mut results)?;
        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(results)
    }

    fn latest(&self, query: &ManifestQuery) -> Result<ExportManifest, StoreError> {
        let newest = self
            .list(query)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Empty(self.root.display().to_string()))?;

        if !newest.verify_integrity() {
            return Err(StoreError::IntegrityViolation(newest.id));
        }
        Ok(newest)
    }
}

/// Recursively find a file by name.
fn find_file_recursive(dir: &Path, filename: &str) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_file_recursive(&path, filename) {
                return Some(found);
            }
        } else if path.file_name().and_then(|n| n.to_str()) == Some(filename) {
            return Some(path);
        }
    }

    None
}

fn collect_manifests_recursive(
    dir: &Path,
    query: &ManifestQuery,
    results: &mut Vec<ExportManifest>,
) -> Result<(), StoreError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_manifests_recursive(&path, query, results)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            let json = fs::read_to_string(&path)?;
            let manifest: ExportManifest = serde_json::from_str(&json)?;

            if matches_query(&manifest, query) {
                results.push(manifest);
            }
        }
    }

    Ok(())
}

fn matches_query(manifest: &ExportManifest, query: &ManifestQuery) -> bool {
    query
        .source
        .as_ref()
        .map_or(true, |source| &manifest.source == source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ManifestSession;
    use crate::ScriptDigest;

    fn create_test_manifest(source: &str) -> ExportManifest {
        let mut session = ManifestSession::new(source);
        session.set_counts("3", "2");
        session.add_script(ScriptDigest {
            file_name: "01_nodes.cypher".to_string(),
            statements: 3,
            malformed: 1,
            blake3: crate::hash::digest_bytes(b"nodes"),
        });
        session.finalize()
    }

    #[test]
    fn save_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();
        let manifest = create_test_manifest("shell");
        let id = manifest.id;

        let path = store.save(&manifest).unwrap();
        assert!(path.starts_with(dir.path()));

        let retrieved = store.get(id).unwrap();
        assert_eq!(retrieved, manifest);
        assert!(retrieved.verify_integrity());
    }

    #[test]
    fn integrity_violation_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();
        let manifest = create_test_manifest("shell");
        let id = manifest.id;
        store.save(&manifest).unwrap();

        // Rewrite a recorded digest.
        let path = store.find_path(id).unwrap();
        let mut tampered: ExportManifest =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        tampered.scripts[0].blake3 = "0".repeat(64);
        fs::write(&path, serde_json::to_string_pretty(&tampered).unwrap()).unwrap();

        assert!(matches!(store.get(id), Err(StoreError::IntegrityViolation(_))));
        assert!(matches!(store.latest(&ManifestQuery::default()), Err(StoreError::IntegrityViolation(_))));
    }

    #[test]
    fn save_rejects_unfinalized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();
        let mut manifest = create_test_manifest("shell");
        manifest.content_hash = None;

        assert!(matches!(store.save(&manifest), Err(StoreError::NotFinalized)));
    }

    #[test]
    fn list_filters_by_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();

        store.save(&create_test_manifest("shell")).unwrap();
        store.save(&create_test_manifest("bolt")).unwrap();
        store.save(&create_test_manifest("shell")).unwrap();

        let query = ManifestQuery {
            source: Some("shell".to_string()),
        };
        let results = store.list(&query).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|m| m.source == "shell"));
    }

    #[test]
    fn latest_returns_newest_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();

        let older = create_test_manifest("shell");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let newer = create_test_manifest("bolt");
        store.save(&older).unwrap();
        store.save(&newer).unwrap();

        assert_eq!(store.latest(&ManifestQuery::default()).unwrap().id, newer.id);

        let shell_only = ManifestQuery {
            source: Some("shell".to_string()),
        };
        assert_eq!(store.latest(&shell_only).unwrap().id, older.id);
    }

    #[test]
    fn latest_on_empty_store_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();
        assert!(matches!(store.latest(&ManifestQuery::default()), Err(StoreError::Empty(_))));
    }
}
