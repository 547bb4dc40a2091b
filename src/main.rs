//! kbase CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use kbase::{
    commands::{
        cmd_ingest, cmd_init, cmd_load, cmd_query, cmd_reset, cmd_status, format_answer,
        print_ingest_stats, print_load_report, print_query_results, print_status, QueryOptions,
    },
    config::Config,
    embed::create_embedder,
    error::{Error, Result},
    mcp::McpServer,
    progress::{self, LogWriterFactory},
    store::QdrantStore,
    websearch::WebSearchClient,
};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kbase")]
#[command(version, about = "Normalize mixed documents into a Qdrant knowledge base, with MCP server support", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Normalize a knowledge-base directory and write the snapshot only
    Load {
        /// Directory to read
        dir: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Normalize, embed and upsert a knowledge-base directory
    Ingest {
        /// Directory to read
        dir: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Search the knowledge base
    Query {
        /// The search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Minimum similarity score
        #[arg(short, long)]
        min_score: Option<f32>,

        /// Print the formatted answer instead of the scored list
        #[arg(long)]
        answer: bool,
    },

    /// Start MCP server on stdio
    Mcp,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Manage the Qdrant collection
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Overrides shared by `load` and `ingest`
#[derive(clap::Args)]
struct RunArgs {
    /// Where to write the JSON snapshot
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Keep Markdown/text files whole
    #[arg(long)]
    no_chunk: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.snapshot {
            config.ingest.snapshot_path = path.display().to_string();
        }
        if self.no_chunk {
            config.chunk.enabled = false;
        }
    }
}

/// Database management actions
#[derive(Subcommand)]
enum DbAction {
    /// Show collection status
    Status,

    /// Delete the collection and all its vectors
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries JSON-RPC in MCP mode, so logs must stay on stderr
    if matches!(cli.command, Commands::Mcp) {
        progress::disable_bars();
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
            .with(filter)
            .init();
        return;
    }

    if cli.json {
        progress::disable_bars();
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_config_path);

    match cli.command {
        Commands::Init { force } => {
            let path = cmd_init(&config_path, force)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "status": "ok", "config_path": path.display().to_string() })
                );
            } else {
                println!("✓ Wrote default config to {}", path.display());
                println!("\nNext steps:");
                println!("  1. Start Qdrant: docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant");
                println!("  2. Ingest a folder: kbase ingest ./knowledgebase");
                println!("  3. Ask a question: kbase query \"What are decorators?\"");
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "kbase", &mut std::io::stdout());
        }

        Commands::Load { dir, run } => {
            let mut config = load_config(cli.config.as_deref(), &config_path)?;
            run.apply(&mut config);

            let report = cmd_load(&config, &dir)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_load_report(&report, &config.ingest.snapshot_path);
            }
        }

        Commands::Ingest { dir, run } => {
            let mut config = load_config(cli.config.as_deref(), &config_path)?;
            run.apply(&mut config);

            let store = QdrantStore::connect(&config)?;
            let embedder = create_embedder(&config.embedding).await?;

            let stats = cmd_ingest(&config, embedder.as_ref(), &store, &dir).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_ingest_stats(&stats);
            }
        }

        Commands::Query {
            query,
            top_k,
            min_score,
            answer,
        } => {
            let config = load_config(cli.config.as_deref(), &config_path)?;
            let store = QdrantStore::connect(&config)?;
            let embedder = create_embedder(&config.embedding).await?;

            let options = QueryOptions { top_k, min_score };
            let result = cmd_query(&config, embedder.as_ref(), &store, &query, options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if answer {
                println!("{}", format_answer(&result));
            } else {
                print_query_results(&result);
            }
        }

        Commands::Mcp => {
            let config = load_config(cli.config.as_deref(), &config_path)?;
            let store = QdrantStore::connect(&config)?;
            let embedder = create_embedder(&config.embedding).await?;
            let web = WebSearchClient::from_config(&config.web_search)?;

            let server = McpServer::new(config, embedder, Box::new(store), web);
            server.run().await?;
        }

        Commands::Db { action } => {
            let config = load_config(cli.config.as_deref(), &config_path)?;
            handle_db_action(&config, action, cli.json).await?;
        }
    }

    Ok(())
}

async fn handle_db_action(config: &Config, action: DbAction, json: bool) -> Result<()> {
    let store = QdrantStore::connect(config)?;

    match action {
        DbAction::Status => {
            let status = cmd_status(config, &store).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
        DbAction::Reset { yes } => {
            if !yes {
                return Err(Error::Other(
                    "This will delete ALL indexed data! Run with --yes to confirm.".to_string(),
                ));
            }
            let deleted = cmd_reset(config, &store).await?;
            if json {
                println!("{}", serde_json::json!({ "status": "ok", "deleted": deleted }));
            } else if deleted {
                println!("✓ Collection {} deleted", config.collection_name);
            } else {
                println!("Collection {} did not exist", config.collection_name);
            }
        }
    }

    Ok(())
}

/// An explicit `-c` path must exist; the default location falls back to defaults
fn load_config(explicit: Option<&Path>, config_path: &Path) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => Config::load_or_default(config_path),
    }
}
