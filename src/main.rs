use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Result, bail};
use log::info;

mod cli;

use cli::{Cli, Commands, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytc.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytc")
        .join("logs")
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

fn emit(rendered: &str, output: Option<&Path>, verbose: bool) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, rendered)?;
        if verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();

    // Load config file (non-fatal if missing/invalid); CLI flags take priority
    let config = ytc::config::Config::load().unwrap_or_default();

    let client = reqwest::Client::new();
    let concurrency = cli
        .concurrency
        .or(config.concurrency)
        .unwrap_or_else(default_concurrency);

    match cli.command {
        Commands::Resolve { pairs } => {
            // Collect pairs: from args or stdin
            let raw = if pairs.is_empty() {
                let stdin = io::stdin();
                stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
            } else {
                pairs
            };

            let parsed = raw
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(cli::parse_pair)
                .collect::<Result<Vec<_>>>()?;

            if parsed.is_empty() {
                bail!("no NAME=URL pairs provided\n\nUsage: ytc resolve \"Name=https://www.youtube.com/watch?v=ID\"\n       cat pairs.txt | ytc resolve");
            }

            let resolved = ytc::resolver::resolve_channel_ids(&client, &parsed, concurrency).await;
            if cli.verbose {
                eprintln!("Resolved {}/{} pairs", resolved.len(), parsed.len());
            }

            let rendered = match cli.format {
                OutputFormat::Text => ytc::output::render_resolved_tsv(&resolved),
                OutputFormat::Json => ytc::output::render_resolved_json(&resolved)?,
            };
            emit(&rendered, cli.output.as_deref(), cli.verbose)?;
        }

        Commands::Collect {
            channel_id,
            api_key,
            lang,
            page_size,
        } => {
            let api_key = api_key.or(config.api_key).ok_or_else(|| {
                eyre::eyre!(
                    "no YouTube Data API key\n\nPass --api-key or set api_key in {}",
                    ytc::config::config_path().display()
                )
            })?;
            let lang = lang.or(config.lang).unwrap_or_else(|| "en".to_string());
            let page_size = page_size.or(config.page_size).unwrap_or(50);

            let api = ytc::api::YouTubeApi::new(client, api_key, page_size, lang);
            let records = ytc::collector::collect(&api, &channel_id, concurrency).await?;

            if cli.verbose {
                eprintln!("Channel: {channel_id}\nVideos: {}", records.len());
            }

            let rendered = match cli.format {
                OutputFormat::Text => ytc::output::render_tsv(&records),
                OutputFormat::Json => ytc::output::render_json(&records)?,
            };
            emit(&rendered, cli.output.as_deref(), cli.verbose)?;
        }
    }

    Ok(())
}
