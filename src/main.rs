use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use clipdeck::outputs::download;
use clipdeck::{ClipdeckConfig, HttpTrimService, TrimController};

const TIME_PLACEHOLDER: &str = "00:00:00";

/// Trim a video by time range and download the resulting audio.
#[derive(Parser, Debug)]
#[command(name = "clipdeck", version, about)]
struct Cli {
    /// Video URL to trim
    #[arg(long)]
    url: Option<String>,
    /// Start time (SS, MM:SS or HH:MM:SS)
    #[arg(long)]
    start: Option<String>,
    /// End time (SS, MM:SS or HH:MM:SS)
    #[arg(long)]
    end: Option<String>,
    /// Directory the audio file is saved into
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Trim service endpoint
    #[arg(long)]
    endpoint: Option<String>,
    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Print the download link without saving the file
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipdeck=info")))
        .init();

    let cli = Cli::parse();

    let mut config = ClipdeckConfig::from_env().context("Invalid CLIPDECK_* environment")?;
    if let Some(endpoint) = cli.endpoint.clone() {
        config.endpoint = endpoint;
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = cli.out_dir.clone() {
        config.download_dir = dir;
    }
    tracing::debug!(?config, "Configuration loaded");

    // Anything not given on the command line is asked for, like a form.
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let url = match cli.url {
        Some(url) => url,
        None => prompt(&mut stdin, "Video URL", "Paste video link").await?,
    };
    let start = match cli.start {
        Some(start) => start,
        None => prompt(&mut stdin, "Start Time", TIME_PLACEHOLDER).await?,
    };
    let end = match cli.end {
        Some(end) => end,
        None => prompt(&mut stdin, "End Time", TIME_PLACEHOLDER).await?,
    };

    let service = HttpTrimService::new(&config);
    tracing::info!(endpoint = %service.endpoint(), timeout = ?config.timeout, "Trim service configured");
    let controller = TrimController::new(service);

    // Presentation only observes transitions
    let mut states = controller.subscribe();
    let observer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let label = states.borrow_and_update().label();
            tracing::debug!(state = label, "Observed operation state");
        }
    });

    // Shown on submit, like the form's spinner; watch updates may coalesce
    println!("Processing...");

    let mut task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit(&url, &start, &end).await }
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            task.await
        }
    };
    let outcome = joined.context("Trim task panicked")?;

    let result = match outcome {
        Ok(handle) => {
            println!("Download link: {} ({} bytes)", handle, handle.len());
            if cli.no_save {
                Ok(())
            } else {
                download::retrieve(&controller, &config.download_dir)
                    .await
                    .map(|path| println!("Saved {}", path.display()))
                    .context("Failed to save audio")
            }
        }
        Err(err) => {
            tracing::debug!(detail = %err.detail(), "Trim did not complete");
            Err(err.into())
        }
    };

    controller.shutdown();
    drop(controller);
    observer.abort();

    result
}

async fn prompt<R>(lines: &mut tokio::io::Lines<R>, label: &str, placeholder: &str) -> Result<String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    print!("{} [{}]: ", label, placeholder);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let line = lines.next_line().await.context("Failed to read input")?;
    Ok(line.unwrap_or_default().trim().to_string())
}
