//! Manifest helpers for export runs.

use std::path::Path;

use graphdump_core::SourceKind;
use graphdump_manifest::session::ManifestSession;
use graphdump_manifest::store::{FileManifestStore, ManifestQuery, ManifestStore, StoreError};
use graphdump_manifest::{ExportManifest, ManifestId};

use crate::script::ScriptSummary;

/// Start recording a run.
pub fn start_session(kind: SourceKind) -> ManifestSession {
    ManifestSession::new(&kind.to_string())
}

pub fn record_script(session: &mut ManifestSession, summary: &ScriptSummary) {
    session.add_script(summary.digest());
}

/// Finalize the session and store the manifest.
///
/// Storage failures are logged; the export itself has already succeeded.
pub fn finalize_and_store(session: ManifestSession, manifest_dir: &Path) -> ExportManifest {
    let manifest = session.finalize();

    match FileManifestStore::new(manifest_dir) {
        Ok(store) => match store.save(&manifest) {
            Ok(path) => {
                tracing::info!(
                    manifest_id = %manifest.id,
                    path = %path.display(),
                    "Manifest recorded for export run"
                );
            }
            Err(e) => tracing::warn!(error = %e, "Failed to store manifest"),
        },
        Err(e) => tracing::warn!(error = %e, "Failed to initialize manifest store"),
    }

    manifest
}

/// Load the manifest to verify against: the given run, or else the
/// latest run, optionally only among runs read from `source`.
pub fn select_manifest(
    manifest_dir: &Path,
    id: Option<ManifestId>,
    source: Option<SourceKind>,
) -> Result<ExportManifest, StoreError> {
    let store = FileManifestStore::new(manifest_dir)?;
    match id {
        Some(id) => store.get(id),
        None => store.latest(&ManifestQuery {
            source: source.map(|kind| kind.to_string()),
        }),
    }
}

/// Outcome of re-hashing one script against a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCheck {
    Matches,
    Changed { actual: String },
    Missing,
}

/// Re-hash every script a manifest recorded, as found in `export_dir`.
pub fn verify_scripts(export_dir: &Path, manifest: &ExportManifest) -> Vec<(String, ScriptCheck)> {
    manifest
        .scripts
        .iter()
        .map(|script| {
            let path = export_dir.join(&script.file_name);
            let check = match graphdump_manifest::hash::digest_file(&path) {
                Ok(actual) if actual == script.blake3 => ScriptCheck::Matches,
                Ok(actual) => ScriptCheck::Changed { actual },
                Err(_) => ScriptCheck::Missing,
            };
            (script.file_name.clone(), check)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphdump_manifest::hash::digest_bytes;
    use std::path::PathBuf;

    fn summary(dir: &Path, name: &str, contents: &str) -> ScriptSummary {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        ScriptSummary {
            path: PathBuf::from(&path),
            statements: 1,
            malformed: 0,
            blake3: digest_bytes(contents.as_bytes()),
        }
    }

    #[test]
    fn test_finalize_and_store_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = start_session(SourceKind::Shell);
        session.set_counts("1", "0");
        record_script(&mut session, &summary(dir.path(), "01_nodes.cypher", "CREATE ();\n"));

        let manifest = finalize_and_store(session, &dir.path().join("manifests"));
        assert_eq!(manifest.source, "shell");
        assert!(manifest.verify_integrity());

        let latest = select_manifest(&dir.path().join("manifests"), None, None).unwrap();
        assert_eq!(latest.id, manifest.id);
    }

    #[test]
    fn test_select_manifest_by_source_and_id() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join("manifests");

        let shell_run = finalize_and_store(start_session(SourceKind::Shell), &manifests);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let bolt_run = finalize_and_store(start_session(SourceKind::Bolt), &manifests);

        let latest = select_manifest(&manifests, None, None).unwrap();
        assert_eq!(latest.id, bolt_run.id);

        let latest_shell = select_manifest(&manifests, None, Some(SourceKind::Shell)).unwrap();
        assert_eq!(latest_shell.id, shell_run.id);

        let by_id =
            select_manifest(&manifests, Some(shell_run.id), Some(SourceKind::Bolt)).unwrap();
        assert_eq!(by_id.id, shell_run.id);

        let empty = dir.path().join("none");
        assert!(matches!(
            select_manifest(&empty, None, Some(SourceKind::Bolt)),
            Err(StoreError::Empty(_))
        ));
    }

    #[test]
    fn test_verify_scripts_detects_changes_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = start_session(SourceKind::Shell);
        record_script(&mut session, &summary(dir.path(), "a.cypher", "A\n"));
        record_script(&mut session, &summary(dir.path(), "b.cypher", "B\n"));
        record_script(&mut session, &summary(dir.path(), "c.cypher", "C\n"));
        let manifest = session.finalize();

        std::fs::write(dir.path().join("b.cypher"), "B changed\n").unwrap();
        std::fs::remove_file(dir.path().join("c.cypher")).unwrap();

        let checks = verify_scripts(dir.path(), &manifest);
        assert_eq!(checks[0], ("a.cypher".to_string(), ScriptCheck::Matches));
        assert_eq!(
            checks[1],
            (
                "b.cypher".to_string(),
                ScriptCheck::Changed {
                    actual: digest_bytes(b"B changed\n")
                }
            )
        );
        assert_eq!(checks[2], ("c.cypher".to_string(), ScriptCheck::Missing));
    }
}
