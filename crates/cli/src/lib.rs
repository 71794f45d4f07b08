use anagram_indexer::{AnagramIndex, IndexBuilder, IndexStats};
use anagram_protocol::Framing;
use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub mod batch;
pub mod config;
pub mod server;

use config::AppConfig;

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "anagrams")]
#[command(about = "Group dictionary words by anagram class and serve lookups", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dictionary file, one word per line (overrides ANAGRAM_DICT)
    #[arg(short, long, global = true)]
    dict: Option<PathBuf>,

    /// Upper bound on grouping workers (overrides ANAGRAM_MAX_WORKERS)
    #[arg(long, global = true)]
    max_workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every anagram class that has two or more members
    Batch(BatchArgs),

    /// Look up the anagram class of each given word
    Lookup(LookupArgs),

    /// Build the index and report statistics
    Stats(StatsArgs),

    /// Answer one lookup per line over TCP
    Serve(ServeArgs),
}

#[derive(Args)]
struct BatchArgs {
    /// Sort output lines (default order is unspecified)
    #[arg(long)]
    sorted: bool,
}

#[derive(Args)]
struct LookupArgs {
    /// Words to look up
    #[arg(required = true)]
    words: Vec<String>,

    /// Leave the queried word out of its own class
    #[arg(long)]
    exclude_query: bool,
}

#[derive(Args)]
struct StatsArgs {
    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on (default 127.0.0.1:4567)
    #[arg(long)]
    bind: Option<String>,

    /// Close connections idle for this long; 0 disables
    #[arg(long)]
    idle_timeout_ms: Option<u64>,

    /// Longest accepted request line
    #[arg(long)]
    max_line_bytes: Option<usize>,

    /// Response framing: none|blank-line
    #[arg(long)]
    framing: Option<Framing>,

    /// Leave the queried word out of its own class
    #[arg(long)]
    exclude_query: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dict) = cli.dict {
        config.dictionary = dict;
    }
    if let Some(max_workers) = cli.max_workers {
        config.max_workers = anagram_indexer::clamp_max_workers(max_workers);
    }

    match cli.command {
        Commands::Batch(args) => run_batch(&config, args).await,
        Commands::Lookup(args) => run_lookup(&config, args).await,
        Commands::Stats(args) => run_stats(&config, args).await,
        Commands::Serve(args) => run_serve(config, args).await,
    }
}

async fn build_index(config: &AppConfig) -> Result<(AnagramIndex, IndexStats)> {
    IndexBuilder::new(config.build_config())
        .build()
        .await
        .context("Failed to build anagram index")
}

async fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<()> {
    let (index, _) = build_index(config).await?;
    let mut stdout = io::stdout().lock();
    let written = batch::write_batch(&mut stdout, &index, args.sorted)?;
    log::debug!("Printed {written} anagram classes");
    Ok(())
}

async fn run_lookup(config: &AppConfig, args: LookupArgs) -> Result<()> {
    let (index, _) = build_index(config).await?;
    for word in &args.words {
        let members: Vec<&str> = if args.exclude_query {
            index.anagrams_of(word).map(|w| w.as_ref()).collect()
        } else {
            index.lookup(word).iter().map(|w| w.as_ref()).collect()
        };
        if members.is_empty() {
            print_stdout(&format!("{word}:"))?;
        } else {
            print_stdout(&format!("{word}: {}", members.join(" ")))?;
        }
    }
    Ok(())
}

async fn run_stats(config: &AppConfig, args: StatsArgs) -> Result<()> {
    let (_, stats) = build_index(config).await?;
    if args.json {
        print_stdout(&serde_json::to_string_pretty(&stats)?)
    } else {
        print_stdout(&stats.to_string())
    }
}

async fn run_serve(mut config: AppConfig, args: ServeArgs) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(ms) = args.idle_timeout_ms {
        config.server.idle_timeout_ms = ms;
    }
    if let Some(max) = args.max_line_bytes {
        config.server.max_line_bytes = max;
    }
    if let Some(framing) = args.framing {
        config.server.framing = framing;
    }
    if args.exclude_query {
        config.server.exclude_query = true;
    }

    log::info!("Loading anagrams from {}", config.dictionary.display());
    let (index, _) = build_index(&config).await?;
    let listener = server::bind(&config.server.bind).await?;
    log::info!(
        "Listening on {} (framing: {})",
        listener.local_addr()?,
        config.server.framing
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(err) => {
                log::warn!("Ctrl-C handler unavailable: {err}");
                // Keep the sender alive so the server keeps running.
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    server::serve(
        listener,
        Arc::new(index),
        server::ServerOptions::from(&config.server),
        shutdown_rx,
    )
    .await
}
