//! Console text shown after an export.

use crate::config::ExportSettings;
use crate::export::ExportSummary;

const RULE: &str = "==================================================";

/// One-paragraph result of the run.
pub fn summary(summary: &ExportSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Nodes reported:         {}\n", summary.node_count));
    out.push_str(&format!(
        "Relationships reported: {}\n",
        summary.relationship_count
    ));
    for script in [&summary.nodes, &summary.relationships] {
        out.push_str(&format!(
            "Wrote {} ({} statements, {} skipped)\n",
            script.path.display(),
            script.statements,
            script.malformed
        ));
    }
    if let Some(manifest) = &summary.manifest {
        out.push_str(&format!("Manifest {}\n", manifest.id));
    }
    out
}

/// How to replay the two scripts into a fresh database.
pub fn import_instructions(settings: &ExportSettings) -> String {
    let nodes = settings.nodes_path();
    let rels = settings.relationships_path();

    format!(
        "{RULE}\n\
         Importing into a new Neo4j instance\n\
         {RULE}\n\
         \n\
         Option 1: cypher-shell (recommended)\n  \
         cat {nodes} | docker exec -i <container> cypher-shell -u neo4j -p <password>\n  \
         cat {rels} | docker exec -i <container> cypher-shell -u neo4j -p <password>\n\
         \n\
         Option 2: Neo4j Browser\n  \
         1. Open http://localhost:7474\n  \
         2. Paste and run the contents of both files, nodes first\n",
        nodes = nodes.display(),
        rels = rels.display(),
    )
}
