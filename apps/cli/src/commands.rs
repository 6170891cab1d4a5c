//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::RwLock;
use tracing::info;

use leadlens_core::{Analyzer, GenerateClient, JobStore};
use leadlens_enrich::EnrichClient;
use leadlens_knowledge::{IngestMetadata, KnowledgeEngine};
use leadlens_shared::{
    AppConfig, DocumentId, JobStatus, Priority, api_key_from_env, data_dir, init_config,
    load_config, require_generation_key,
};
use leadlens_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LeadLens — prospect analysis and outreach generation.
#[derive(Parser)]
#[command(
    name = "leadlens",
    version,
    about = "Analyze a prospect's profile and generate a strategic brief with personalized outreach.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze a prospect's profile URL and wait for the result.
    Analyze {
        /// Public profile URL (https://www.linkedin.com/in/...).
        url: String,
    },

    /// Look up an archived analysis by job id.
    Status {
        /// Job id returned by `analyze`.
        id: String,
    },

    /// Ingest documents into the knowledge base.
    Ingest {
        /// Files to ingest (pdf, docx, txt, md, json).
        files: Vec<String>,

        /// Category to file the documents under.
        #[arg(short, long)]
        category: Option<String>,

        /// Comma-separated tags.
        #[arg(short, long)]
        tags: Option<String>,

        /// Priority: low, medium, or high.
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Search the knowledge base.
    Search {
        /// Free-text query.
        query: String,

        /// Restrict to one category.
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum results.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List knowledge-base documents.
    List,

    /// Show knowledge-base statistics.
    Stats,

    /// Delete a knowledge-base document by id.
    Delete {
        /// Document id.
        id: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadlens=info",
        1 => "leadlens=debug",
        _ => "leadlens=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze { url } => cmd_analyze(&url).await,
        Command::Status { id } => cmd_status(&id).await,
        Command::Ingest {
            files,
            category,
            tags,
            priority,
        } => cmd_ingest(&files, category, tags.as_deref(), priority.as_deref()).await,
        Command::Search {
            query,
            category,
            limit,
        } => cmd_search(&query, category.as_deref(), limit).await,
        Command::List => cmd_list().await,
        Command::Stats => cmd_stats().await,
        Command::Delete { id } => cmd_delete(&id).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Shared wiring
// ---------------------------------------------------------------------------

fn open_storage(config: &AppConfig) -> Result<Arc<Storage>> {
    Ok(Arc::new(Storage::open(data_dir(config)?)?))
}

fn open_engine(config: &AppConfig, storage: Arc<Storage>) -> Result<KnowledgeEngine> {
    Ok(KnowledgeEngine::open(storage, config.defaults.chunk_size)?)
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

async fn cmd_analyze(url: &str) -> Result<()> {
    let config = load_config()?;
    // Validate the generation key before doing anything.
    let generation_key = require_generation_key(&config)?;

    let storage = open_storage(&config)?;
    let engine = open_engine(&config, storage.clone())?;

    let enricher = EnrichClient::new(
        config.enrichment.base_url.as_str(),
        api_key_from_env(&config.enrichment.api_key_env),
        config.enrichment.timeout_secs,
    )?;
    let generator = GenerateClient::new(
        config.generation.base_url.as_str(),
        generation_key,
        config.generation.model.as_str(),
        config.generation.timeout_secs,
    )?;

    let analyzer = Analyzer::new(
        JobStore::new(config.defaults.retention_secs),
        storage,
        Arc::new(enricher),
        Arc::new(generator),
        Some(Arc::new(RwLock::new(engine))),
    );
    let sweeper = analyzer.spawn_sweeper(60);

    info!(url, "submitting analysis");
    let id = analyzer.submit(url).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let job = loop {
        let job = analyzer.status(&id).await?;
        if job.status.is_terminal() {
            break job;
        }
        spinner.set_message(format!("[{:>3}%] {}", job.progress, job.stage));
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    };
    spinner.finish_and_clear();
    sweeper.abort();

    match job.status {
        JobStatus::Completed => {
            let result = job
                .result
                .ok_or_else(|| eyre!("completed job carries no result"))?;

            println!();
            println!("  Analysis complete!");
            println!("  Job:       {id}");
            println!(
                "  Prospect:  {} — {} at {}",
                result.profile.name, result.profile.title, result.organization.name
            );
            println!(
                "  Scores:    authority {} | budget {} | intent {} | engagement {} | overall {}",
                result.metrics.decision_authority,
                result.metrics.budget_influence,
                result.metrics.buying_intent,
                result.metrics.engagement_score,
                result.metrics.overall_score,
            );
            println!("  Messages:  {}", result.outreach_messages.len());
            println!(
                "  Time:      {:.1}s",
                result.metadata.processing_ms as f64 / 1000.0
            );
            println!();
            println!("{}", result.summary);
            println!();
            for message in &result.outreach_messages {
                println!("--- {} ({}) ---", message.sender, message.focus);
                println!("Subject: {}", message.subject);
                println!("{}", message.body);
                println!();
            }
            Ok(())
        }
        JobStatus::Error => {
            let detail = job
                .error
                .map(|e| format!("{} ({})", e.message, e.code))
                .unwrap_or_else(|| "unknown error".into());
            Err(eyre!("analysis failed: {detail}"))
        }
        _ => unreachable!("loop exits only on terminal status"),
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

async fn cmd_status(id: &str) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config)?;

    let job_id = id
        .parse()
        .map_err(|e| eyre!("invalid job id '{id}': {e}"))?;

    // A fresh process only sees the durable archive; in-memory records
    // belong to the process that created them.
    match storage.load_analysis(&job_id)? {
        Some(job) => {
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(())
        }
        None => Err(eyre!("analysis {id} not found or expired")),
    }
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

async fn cmd_ingest(
    files: &[String],
    category: Option<String>,
    tags: Option<&str>,
    priority: Option<&str>,
) -> Result<()> {
    if files.is_empty() {
        return Err(eyre!("no files given"));
    }

    let config = load_config()?;
    let storage = open_storage(&config)?;
    let mut engine = open_engine(&config, storage)?;

    let meta = IngestMetadata {
        category,
        tags: tags
            .map(|t| {
                t.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        priority: priority.map(parse_priority).transpose()?,
        uploaded_by: None,
    };

    // Stage copies into the uploads area; ingestion consumes (deletes) the
    // staged artifact, never the caller's original.
    let uploads_dir = data_dir(&config)?.join("uploads");
    std::fs::create_dir_all(&uploads_dir)?;

    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let source = PathBuf::from(file);
        let name = source
            .file_name()
            .ok_or_else(|| eyre!("not a file: {file}"))?;
        let target = uploads_dir.join(format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            name.to_string_lossy()
        ));
        std::fs::copy(&source, &target)
            .map_err(|e| eyre!("cannot stage '{file}': {e}"))?;
        staged.push(target);
    }

    let report = engine.ingest_batch(&staged, &meta);

    println!();
    for success in &report.succeeded {
        println!(
            "  ok      {} → {} ({} chunks, {})",
            success.filename, success.id, success.chunks, success.category
        );
    }
    for failure in &report.failed {
        println!("  failed  {} — {}", failure.filename, failure.error);
    }
    println!(
        "\n  {} of {} files ingested",
        report.succeeded.len(),
        report.total()
    );

    if report.succeeded.is_empty() && !report.failed.is_empty() {
        return Err(eyre!("all files failed to ingest"));
    }
    Ok(())
}

fn parse_priority(s: &str) -> Result<Priority> {
    match s.to_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(eyre!(
            "invalid priority '{other}': expected low, medium, or high"
        )),
    }
}

// ---------------------------------------------------------------------------
// search / list / stats / delete
// ---------------------------------------------------------------------------

async fn cmd_search(query: &str, category: Option<&str>, limit: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config)?;
    let engine = open_engine(&config, storage)?;

    let limit = limit.unwrap_or(config.defaults.search_limit);
    let hits = engine.search(query, category, limit)?;

    if hits.is_empty() {
        println!("No matches for '{query}'.");
        return Ok(());
    }

    println!();
    for hit in &hits {
        let relevance = (hit.score * 100.0).round() as u32;
        let band = match hit.score {
            s if s > 0.5 => "high",
            s if s > 0.2 => "medium",
            _ => "low",
        };
        println!(
            "  {relevance:>3}% [{band:<6}] {} ({}) — {}",
            hit.record.filename, hit.record.metadata.category, hit.record.id
        );
    }
    println!("\n  {} result(s)", hits.len());
    Ok(())
}

async fn cmd_list() -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config)?;
    let engine = open_engine(&config, storage)?;

    let documents = engine.list();
    if documents.is_empty() {
        println!("Knowledge base is empty.");
        return Ok(());
    }

    println!();
    for doc in &documents {
        println!(
            "  {} — {} [{} | {} | {} chunks | {} bytes]",
            doc.id, doc.filename, doc.category, doc.priority, doc.chunks, doc.file_size_bytes
        );
    }
    println!("\n  {} document(s)", documents.len());
    Ok(())
}

async fn cmd_stats() -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config)?;
    let engine = open_engine(&config, storage)?;

    let stats = engine.stats();
    println!();
    println!("  Documents:      {}", stats.total_documents);
    println!("  Total size:     {} bytes", stats.total_size_bytes);
    println!("  Recent uploads: {} (last 7 days)", stats.recent_uploads);
    println!("  Categories:");
    for (category, count) in &stats.categories {
        println!("    {category}: {count}");
    }
    Ok(())
}

async fn cmd_delete(id: &str) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config)?;
    let mut engine = open_engine(&config, storage)?;

    let doc_id: DocumentId = id
        .parse()
        .map_err(|e| eyre!("invalid document id '{id}': {e}"))?;

    if engine.delete(&doc_id)? {
        println!("Deleted {id}.");
        Ok(())
    } else {
        Err(eyre!("document {id} not found"))
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
