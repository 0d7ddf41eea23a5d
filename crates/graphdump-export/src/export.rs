//! The export pipeline: counts, node script, relationship script, manifest.
//!
//! Strictly sequential. Each step awaits the client before the next one
//! starts, and the two scripts are written one after the other.

use std::path::Path;
use std::time::Instant;

use graphdump_manifest::ExportManifest;

use crate::config::ExportSettings;
use crate::cypher;
use crate::error::Result;
use crate::manifest;
use crate::script::{self, ScriptSummary, ScriptWriter};
use crate::source::RecordSource;

/// Outcome of a full export run.
#[derive(Debug)]
pub struct ExportSummary {
    pub node_count: String,
    pub relationship_count: String,
    pub nodes: ScriptSummary,
    pub relationships: ScriptSummary,
    pub manifest: Option<ExportManifest>,
}

/// Write the node script.
pub async fn export_nodes<S: RecordSource>(source: &S, path: &Path) -> Result<ScriptSummary> {
    tracing::info!(path = %path.display(), "Exporting nodes");

    let rows = source.nodes().await?;
    let mut writer = ScriptWriter::create(path, &script::nodes_header())?;

    for row in &rows {
        match row {
            Ok(node) => writer.write_statement(&cypher::create_node_statement(node))?,
            Err(malformed) => writer.skip(malformed),
        }
    }

    let summary = writer.finish()?;
    tracing::info!(
        path = %summary.path.display(),
        statements = summary.statements,
        malformed = summary.malformed,
        "Node export complete"
    );
    Ok(summary)
}

/// Write the relationship script.
pub async fn export_relationships<S: RecordSource>(
    source: &S,
    path: &Path,
    identity: &str,
    nodes_file: &str,
) -> Result<ScriptSummary> {
    tracing::info!(path = %path.display(), "Exporting relationships");

    let rows = source.relationships().await?;
    let mut writer = ScriptWriter::create(path, &script::relationships_header(nodes_file))?;

    for row in &rows {
        match row {
            Ok(rel) => {
                writer.write_statement(&cypher::create_relationship_statement(rel, identity))?
            }
            Err(malformed) => writer.skip(malformed),
        }
    }

    let summary = writer.finish()?;
    tracing::info!(
        path = %summary.path.display(),
        statements = summary.statements,
        malformed = summary.malformed,
        "Relationship export complete"
    );
    Ok(summary)
}

/// Run a full export: counts → nodes → relationships → manifest.
pub async fn run_export<S: RecordSource>(
    source: &S,
    settings: &ExportSettings,
) -> Result<ExportSummary> {
    let start = Instant::now();
    std::fs::create_dir_all(&settings.dir)?;

    let mut session = manifest::start_session(source.kind());

    let node_count = source.node_count().await?;
    let relationship_count = source.relationship_count().await?;
    tracing::info!(
        source = %source.kind(),
        nodes = %node_count,
        relationships = %relationship_count,
        "Source statistics"
    );
    session.set_counts(&node_count, &relationship_count);

    let nodes = export_nodes(source, &settings.nodes_path()).await?;
    manifest::record_script(&mut session, &nodes);

    let relationships = export_relationships(
        source,
        &settings.relationships_path(),
        &settings.identity_property,
        &settings.nodes_file,
    )
    .await?;
    manifest::record_script(&mut session, &relationships);

    let manifest = settings
        .write_manifest
        .then(|| manifest::finalize_and_store(session, &settings.manifest_dir()));

    tracing::info!(
        dir = %settings.dir.display(),
        nodes = nodes.statements,
        relationships = relationships.statements,
        malformed = nodes.malformed + relationships.malformed,
        duration_ms = start.elapsed().as_millis(),
        "Export complete"
    );

    Ok(ExportSummary {
        node_count,
        relationship_count,
        nodes,
        relationships,
        manifest,
    })
}
