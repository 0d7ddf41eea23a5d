//! CLI entry point for the graphdump exporter.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use graphdump_core::SourceKind;
use graphdump_graph::GraphClient;
use graphdump_manifest::ManifestId;

use graphdump_export::config::{AppConfig, LogFormat};
use graphdump_export::export::run_export;
use graphdump_export::manifest::{select_manifest, verify_scripts, ScriptCheck};
use graphdump_export::report;
use graphdump_export::shell::CypherShell;
use graphdump_export::source::{BoltSource, ShellSource};

#[derive(Parser)]
#[command(name = "graphdump")]
#[command(about = "Dump a Neo4j database as Cypher replay scripts")]
struct Cli {
    /// Defaults to `export`.
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file prefix (default: graphdump).
    #[arg(short, long, default_value = "graphdump", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Write the node and relationship scripts.
    Export,
    /// Check the scripts on disk against a recorded manifest.
    Verify {
        /// Manifest ID (default: the latest run).
        #[arg(long)]
        manifest: Option<ManifestId>,

        /// Only consider runs read from this source (shell or bolt).
        #[arg(long)]
        source: Option<SourceKind>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    init_logging(config.log_format);

    match cli.command.unwrap_or(Command::Export) {
        Command::Export => export(&config).await,
        Command::Verify { manifest, source } => verify(&config, manifest, source),
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn export(config: &AppConfig) -> anyhow::Result<()> {
    let identity = &config.export.identity_property;

    let summary = match config.export.source {
        SourceKind::Shell => {
            let shell = CypherShell::new(&config.shell, &config.neo4j);
            let source = ShellSource::new(shell, identity);
            run_export(&source, &config.export).await?
        }
        SourceKind::Bolt => {
            let client = GraphClient::connect(&config.neo4j.graph_config()).await?;
            let source = BoltSource::new(client, identity);
            run_export(&source, &config.export).await?
        }
    };

    println!("{}", report::summary(&summary));
    println!("{}", report::import_instructions(&config.export));
    Ok(())
}

fn verify(
    config: &AppConfig,
    manifest_id: Option<ManifestId>,
    source: Option<SourceKind>,
) -> anyhow::Result<()> {
    let manifest = select_manifest(&config.export.manifest_dir(), manifest_id, source)?;

    println!("Manifest {} ({}, {})", manifest.id, manifest.source, manifest.started_at);

    let mut mismatches = 0;
    for (file_name, check) in verify_scripts(&config.export.dir, &manifest) {
        match check {
            ScriptCheck::Matches => println!("  ok       {file_name}"),
            ScriptCheck::Changed { actual } => {
                mismatches += 1;
                println!("  changed  {file_name} (now {actual})");
            }
            ScriptCheck::Missing => {
                mismatches += 1;
                println!("  missing  {file_name}");
            }
        }
    }

    if mismatches > 0 {
        anyhow::bail!("{mismatches} script(s) differ from manifest {}", manifest.id);
    }
    Ok(())
}
