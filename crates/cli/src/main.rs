use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use apiscout_chunker::{Chunker, ChunkerConfig};
use apiscout_classifier::{ClassificationIndex, RepoScanner, RuleTable};
use apiscout_inference::{NullInference, ReplayInference, SharedInference};
use apiscout_reconciler::CatalogReport;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::pipeline::{RepoSource, RunStats};
use crate::store::ArtifactStore;

mod pipeline;
mod store;

#[derive(Parser)]
#[command(name = "apiscout")]
#[command(about = "Discover HTTP API endpoints across source repositories", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate API files in a repository without chunking them
    Classify(ClassifyArgs),

    /// Scan repositories and persist chunk documents for a job
    Discover(DiscoverArgs),

    /// Analyze stored chunks and persist endpoint result documents
    Extract(ExtractArgs),

    /// Fold result documents into the final endpoint report
    Aggregate(AggregateArgs),

    /// Run the whole pipeline in one process
    Run(RunArgs),
}

#[derive(Args)]
struct ClassifyArgs {
    /// Repository directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Ecosystem rules file (JSON) replacing the built-in table
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DiscoverArgs {
    /// Repository directory to scan (repeatable)
    #[arg(long = "repo", required = true)]
    repos: Vec<PathBuf>,

    /// Artifact store root directory
    #[arg(long, default_value = ".apiscout")]
    artifacts: PathBuf,

    /// Job identifier (defaults to a fresh UUID)
    #[arg(long)]
    job: Option<String>,

    /// Maximum characters per chunk
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Ecosystem rules file (JSON) replacing the built-in table
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Artifact store root directory
    #[arg(long, default_value = ".apiscout")]
    artifacts: PathBuf,

    /// Job identifier produced by discover
    #[arg(long)]
    job: String,

    /// Directory of canned inference responses keyed by request digest
    #[arg(long)]
    responses: Option<PathBuf>,

    /// Maximum concurrent analyses
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AggregateArgs {
    /// Artifact store root directory
    #[arg(long, default_value = ".apiscout")]
    artifacts: PathBuf,

    /// Job identifier produced by discover
    #[arg(long)]
    job: String,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Repository directory to scan (repeatable)
    #[arg(long = "repo", required = true)]
    repos: Vec<PathBuf>,

    /// Directory of canned inference responses keyed by request digest
    #[arg(long)]
    responses: Option<PathBuf>,

    /// Artifact store root for persisting the report (omit to skip persistence)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Maximum characters per chunk
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Ecosystem rules file (JSON) replacing the built-in table
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Maximum concurrent analyses
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // JSON mode keeps stdout machine-readable, so push logs down to warn.
    let json_output = match &cli.command {
        Commands::Classify(args) => args.json,
        Commands::Discover(args) => args.json,
        Commands::Extract(args) => args.json,
        Commands::Aggregate(args) => args.json,
        Commands::Run(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Classify(args) => run_classify(args).await?,
        Commands::Discover(args) => run_discover(args).await?,
        Commands::Extract(args) => run_extract(args).await?,
        Commands::Aggregate(args) => run_aggregate(args).await?,
        Commands::Run(args) => run_run(args).await?,
    }

    Ok(())
}

fn load_rules(rules: Option<&Path>) -> Result<RuleTable> {
    match rules {
        Some(path) => RuleTable::from_file(path)
            .with_context(|| format!("Invalid rules file {}", path.display())),
        None => Ok(RuleTable::builtin()),
    }
}

fn build_scanner(rules: Option<&Path>) -> Result<RepoScanner> {
    Ok(RepoScanner::new(ClassificationIndex::new(load_rules(rules)?)))
}

fn build_chunker(max_chunk_chars: Option<usize>) -> Result<Chunker> {
    let mut config = ChunkerConfig::default();
    if let Some(max) = max_chunk_chars {
        config.max_chunk_chars = max;
    }
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid chunker configuration")?;
    Ok(Chunker::new(config))
}

fn build_backend(responses: Option<PathBuf>) -> SharedInference {
    match responses {
        Some(dir) => Arc::new(ReplayInference::new(dir)),
        None => {
            log::info!("No response directory given; using the null inference backend");
            Arc::new(NullInference)
        }
    }
}

fn resolve_sources(repos: &[PathBuf]) -> Result<Vec<RepoSource>> {
    let mut sources: Vec<RepoSource> = Vec::with_capacity(repos.len());
    for repo in repos {
        let root = repo
            .canonicalize()
            .with_context(|| format!("Invalid repository path {}", repo.display()))?;
        let source = RepoSource::from_root(root);
        // Artifact documents are keyed by repository name, so two roots
        // sharing a basename would overwrite each other's chunks.
        if sources.iter().any(|seen| seen.name == source.name) {
            anyhow::bail!(
                "Duplicate repository name '{}': {} collides with an earlier --repo path",
                source.name,
                repo.display()
            );
        }
        sources.push(source);
    }
    Ok(sources)
}

#[derive(Serialize)]
struct ClassifiedFile {
    path: String,
    ecosystem: String,
}

#[derive(Serialize)]
struct ClassifyOutput {
    repository: String,
    root: String,
    total: usize,
    files: Vec<ClassifiedFile>,
}

async fn run_classify(args: ClassifyArgs) -> Result<()> {
    let root = args.path.canonicalize().context("Invalid repository path")?;
    let index = ClassificationIndex::new(load_rules(args.rules.as_deref())?);
    let scanner = RepoScanner::new(index.clone());
    let source = RepoSource::from_root(root.clone());

    let candidates = scanner.scan(&source.name, &source.root);
    let files: Vec<ClassifiedFile> = candidates
        .iter()
        .map(|candidate| ClassifiedFile {
            ecosystem: index
                .classify(&candidate.relative_path)
                .unwrap_or("unknown")
                .to_string(),
            path: candidate.relative_path.clone(),
        })
        .collect();
    let output = ClassifyOutput {
        repository: source.name,
        root: root.display().to_string(),
        total: files.len(),
        files,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for file in &output.files {
            println!("{:<14} {}", file.ecosystem, file.path);
        }
        eprintln!();
        eprintln!("{} candidate files in {}", output.total, output.repository);
    }
    Ok(())
}

async fn run_discover(args: DiscoverArgs) -> Result<()> {
    let sources = resolve_sources(&args.repos)?;
    let scanner = build_scanner(args.rules.as_deref())?;
    let chunker = build_chunker(args.max_chunk_chars)?;
    let store = ArtifactStore::new(&args.artifacts);
    let job_id = args
        .job
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let stats = pipeline::discover(&store, &job_id, &sources, &scanner, &chunker).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Job {}", stats.job_id);
        println!(
            "{} chunks from {} candidate files across {} repositories",
            stats.chunks_written, stats.candidate_files, stats.repositories
        );
        if stats.files_skipped > 0 {
            println!("{} files skipped", stats.files_skipped);
        }
        for (language, count) in &stats.languages {
            println!("  {language}: {count} files");
        }
    }
    Ok(())
}

async fn run_extract(args: ExtractArgs) -> Result<()> {
    let store = ArtifactStore::new(&args.artifacts);
    let backend = build_backend(args.responses);

    let stats = pipeline::extract(&store, &args.job, backend, args.concurrency).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "{} of {} chunks analyzed, {} candidates found",
            stats.chunks_analyzed, stats.chunks_seen, stats.candidates_found
        );
        if stats.chunks_skipped_small > 0 {
            println!("{} chunks below the analyzable size", stats.chunks_skipped_small);
        }
        if stats.chunks_failed > 0 {
            println!("{} chunks failed", stats.chunks_failed);
        }
    }
    Ok(())
}

async fn run_aggregate(args: AggregateArgs) -> Result<()> {
    let store = ArtifactStore::new(&args.artifacts);
    let (catalog, stats) = pipeline::aggregate(&store, &args.job).await?;
    let report = CatalogReport::build(&args.job, &catalog);

    let report_path = store.write_report(&args.job, &report).await?;
    store
        .write_report_markdown(&args.job, &report.render_markdown())
        .await?;
    log::info!("Report written to {}", report_path.display());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_markdown());
        eprintln!();
        eprintln!(
            "{} unique endpoints from {} result files ({} duplicates folded)",
            stats.unique_endpoints,
            stats.result_files,
            stats.candidates_accepted.saturating_sub(stats.unique_endpoints)
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct RunOutput {
    stats: RunStats,
    report: CatalogReport,
}

async fn run_run(args: RunArgs) -> Result<()> {
    let sources = resolve_sources(&args.repos)?;
    let scanner = build_scanner(args.rules.as_deref())?;
    let chunker = build_chunker(args.max_chunk_chars)?;
    let backend = build_backend(args.responses);
    let job_id = uuid::Uuid::new_v4().to_string();

    let (report, stats) = pipeline::run(
        &job_id,
        &sources,
        &scanner,
        &chunker,
        backend,
        args.concurrency,
    )
    .await?;

    if let Some(artifacts) = &args.artifacts {
        let store = ArtifactStore::new(artifacts);
        let path = store.write_report(&job_id, &report).await?;
        store
            .write_report_markdown(&job_id, &report.render_markdown())
            .await?;
        log::info!("Report written to {}", path.display());
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&RunOutput { stats, report })?
        );
    } else {
        print!("{}", report.render_markdown());
        eprintln!();
        eprintln!(
            "{} unique endpoints from {} chunks across {} repositories",
            stats.unique_endpoints, stats.chunks_total, stats.repositories
        );
    }
    Ok(())
}
