use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytc",
    about = "Collect per-video statistics, comments, and captions for a YouTube channel",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text (TSV, default) or json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Concurrent fetches (default: available parallelism)
    #[arg(short, long, global = true)]
    pub concurrency: Option<usize>,

    /// Show progress and summary on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve channel IDs by scraping video watch pages
    Resolve {
        /// NAME=URL pairs (reads one pair per line from stdin if omitted)
        pairs: Vec<String>,
    },

    /// Walk a channel's uploads playlist and collect per-video data
    Collect {
        /// Channel ID (UC...)
        channel_id: String,

        /// YouTube Data API key (falls back to the config file)
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Preferred caption language
        #[arg(short, long)]
        lang: Option<String>,

        /// Playlist page size (API maximum is 50)
        #[arg(long)]
        page_size: Option<u32>,
    },
}

/// Split a `NAME=URL` argument into the (url, name) pair the resolver takes
pub fn parse_pair(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => {
            Ok((url.trim().to_string(), name.trim().to_string()))
        }
        _ => bail!("expected NAME=URL, got: {arg}"),
    }
}
