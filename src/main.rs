use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use knowledge_extractor::api::{
    self, AnalyzeRequest, BatchAnalyzeRequest, ErrorResponse, ExtractorService, SearchParams,
};
use knowledge_extractor::config::Config;
use knowledge_extractor::db::{self, AnalysisStore, SqliteStore};
use knowledge_extractor::output::{self, terminal};
use knowledge_extractor::provider;
use knowledge_extractor::status;

/// Knowledge Extractor: summarize and tag text with an LLM.
///
/// Each analysis stores a summary, title, topics, sentiment and locally
/// extracted keywords in SQLite, searchable by topic or keyword.
#[derive(Parser)]
#[command(name = "knowledge-extractor", version, about)]
struct Cli {
    /// Print JSON responses instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Analyze a single text and store the result
    Analyze {
        /// The text to analyze
        text: String,
    },

    /// Analyze up to 10 texts concurrently
    Batch {
        /// Texts to analyze
        texts: Vec<String>,

        /// Read texts from a JSON file shaped like {"texts": [...]}
        #[arg(long, conflicts_with = "texts")]
        file: Option<PathBuf>,
    },

    /// Search stored analyses by topic and/or keyword
    Search {
        /// Match records whose topics contain this value
        #[arg(long)]
        topic: Option<String>,

        /// Match records whose text, summary or metadata contain this value
        #[arg(long)]
        keyword: Option<String>,

        /// Page size (default: 50, max: 100)
        #[arg(long)]
        limit: Option<u32>,

        /// Records to skip
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one stored analysis
    Show {
        /// The analysis id
        id: String,
    },

    /// Show system status (DB size, provider, aggregate stats)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("knowledge_extractor=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing database...");
            let conn = db::initialize(&config.db_path)?;
            let store = SqliteStore::new(conn);
            let table_count = store.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nProvider: {}", config.provider);
            println!("\nThen run: knowledge-extractor analyze \"some text\"");
        }

        Commands::Analyze { text } => {
            let service = build_service(&config)?;
            let result = service.analyze(AnalyzeRequest { text }).await;
            render(cli.json, result, |resp: &api::AnalyzeResponse| {
                terminal::display_analysis(&resp.id, &resp.summary, &resp.metadata, resp.confidence)
            })?;
        }

        Commands::Batch { texts, file } => {
            let request = match file {
                Some(path) => {
                    let body = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    match api::parse_request::<BatchAnalyzeRequest>(&body) {
                        Ok(request) => request,
                        Err(err) => return fail(cli.json, &err),
                    }
                }
                None => BatchAnalyzeRequest { texts },
            };

            let service = build_service(&config)?;

            let spinner = (!cli.json).then(|| {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("  {spinner} Analyzing {msg} texts...")
                        .expect("valid template"),
                );
                pb.set_message(request.texts.len().to_string());
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            });

            let result = service.analyze_batch(request).await;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            render(cli.json, result, terminal::display_batch)?;
        }

        Commands::Search {
            topic,
            keyword,
            limit,
            offset,
        } => {
            let service = build_service(&config)?;
            let params = SearchParams {
                topic,
                keyword,
                limit,
                offset,
            };
            let result = service.search(params).await;
            render(cli.json, result, terminal::display_search)?;
        }

        Commands::Show { id } => {
            let service = build_service(&config)?;
            match service.get(&id).await {
                Ok(Some(record)) => render(cli.json, Ok(record), terminal::display_record)?,
                Ok(None) => anyhow::bail!("No analysis found with id {id}"),
                Err(err) => return fail(cli.json, &err),
            }
        }

        Commands::Status => {
            if !status::database_exists(&config.db_path) {
                status::show_uninitialized();
                return Ok(());
            }

            let provider = provider::create_provider(&config)?;
            let store = SqliteStore::new(db::open(&config.db_path)?);
            let report = status::collect(&store, provider.as_ref(), &config.db_path).await?;

            if cli.json {
                println!("{}", output::to_json(&report)?);
            } else {
                status::show(&report);
            }
        }
    }

    Ok(())
}

/// Wire provider + store into the service and hook Ctrl-C up to cancellation.
fn build_service(config: &Config) -> Result<ExtractorService> {
    let provider = provider::create_provider(config)?;
    if !provider.is_available() {
        warn!(provider = provider.name(), "Provider reports it is not available");
    }

    let conn = db::open(&config.db_path)?;
    let store: Arc<dyn AnalysisStore> = Arc::new(SqliteStore::new(conn));
    let service = ExtractorService::new(provider, store);

    let shutdown = service.analyzer().shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight analyses");
            shutdown.cancel();
        }
    });

    Ok(service)
}

/// Print a service result either as JSON or through a terminal renderer.
/// A boundary error ends the process with a non-zero status.
fn render<T: Serialize>(
    json: bool,
    result: Result<T, ErrorResponse>,
    display: impl FnOnce(&T),
) -> Result<()> {
    match result {
        Ok(value) => {
            if json {
                println!("{}", output::to_json(&value)?);
            } else {
                display(&value);
            }
            Ok(())
        }
        Err(err) => fail(json, &err),
    }
}

fn fail(json: bool, err: &ErrorResponse) -> Result<()> {
    if json {
        println!("{}", output::to_json(err)?);
    } else {
        terminal::display_error(err);
    }
    std::process::exit(1);
}
