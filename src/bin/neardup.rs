//! neardup - near-duplicate text filter
//!
//! Feeds each input line (or each input file) through a [`DuplicateCache`]
//! and prints the items that were not flagged as duplicates.
//!
//! ```bash
//! # Drop near-duplicate lines from a log
//! neardup app.log > unique.log
//!
//! # Compare whole documents, report counts as JSON
//! neardup --mode files --json docs/*.txt
//! ```

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use neardup::{CacheStats, DuplicateCache, NeardupConfig};

/// Filter near-duplicate text using MinHash signatures and LSH banding.
#[derive(Debug, Parser)]
#[command(name = "neardup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the exact-similarity threshold (0.0 - 1.0)
    #[arg(long, value_name = "F")]
    min_similarity: Option<f64>,

    /// Check against the corpus without adding new items to it
    #[arg(long)]
    no_update: bool,

    /// What counts as one item
    #[arg(short, long, value_enum, default_value = "lines")]
    mode: Mode,

    /// Print a JSON summary instead of the surviving items
    #[arg(long)]
    json: bool,

    /// Log filter directive, e.g. "debug" or "neardup=trace"
    #[arg(long, value_name = "LEVEL", env = "NEARDUP_LOG")]
    log_level: Option<String>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,

    /// Input files; "-" reads standard input
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Every line is an item
    Lines,
    /// Every input file is an item
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Serialize)]
struct Summary {
    items: u64,
    unique: u64,
    duplicates: u64,
    stats: CacheStats,
    duplicate_items: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NeardupConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NeardupConfig::default(),
    };

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_writer(io::stderr);
    match cli.log_format {
        LogFormat::Plain => subscriber.init(),
        LogFormat::Json => subscriber.with_thread_ids(true).json().init(),
    }

    let mut opts = config.check_options();
    if let Some(min_similarity) = cli.min_similarity {
        opts.min_similarity = min_similarity;
    }
    if cli.no_update {
        opts.update = false;
    }
    opts.validate()?;

    let cache = DuplicateCache::new(config.cache_config())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut summary = Summary {
        items: 0,
        unique: 0,
        duplicates: 0,
        stats: cache.stats(),
        duplicate_items: Vec::new(),
    };

    let mut handle = |label: String, text: &str, out: &mut dyn Write| -> Result<()> {
        summary.items += 1;
        if cache.is_duplicate_with(text, &opts)? {
            summary.duplicates += 1;
            summary.duplicate_items.push(label);
        } else {
            summary.unique += 1;
            if !cli.json {
                match cli.mode {
                    Mode::Lines => writeln!(out, "{text}")?,
                    Mode::Files => writeln!(out, "{label}")?,
                }
            }
        }
        Ok(())
    };

    for input in &cli.inputs {
        let name = input.display().to_string();
        match cli.mode {
            Mode::Lines => {
                let reader: Box<dyn BufRead> = if name == "-" {
                    Box::new(BufReader::new(io::stdin()))
                } else {
                    let file = fs::File::open(input).with_context(|| format!("opening {name}"))?;
                    Box::new(BufReader::new(file))
                };
                for (lineno, line) in reader.lines().enumerate() {
                    let line = line.with_context(|| format!("reading {name}"))?;
                    handle(format!("{name}:{}", lineno + 1), &line, &mut out)?;
                }
            }
            Mode::Files => {
                let text = if name == "-" {
                    io::read_to_string(io::stdin()).context("reading stdin")?
                } else {
                    fs::read_to_string(input).with_context(|| format!("reading {name}"))?
                };
                handle(name, &text, &mut out)?;
            }
        }
    }

    summary.stats = cache.stats();
    info!(
        items = summary.items,
        unique = summary.unique,
        duplicates = summary.duplicates,
        stored_bytes = summary.stats.stored_bytes,
        "done"
    );

    if cli.json {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    }
    Ok(())
}
