//! Playback Client (aria-pc) - Main entry point
//!
//! Headless playback session against an Aria media server, driven by
//! simple stdin commands.

use anyhow::{Context, Result};
use aria_pc::session::PlaybackSession;
use aria_pc::source::{HttpTrackSource, TrackSource};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for aria-pc
#[derive(Parser, Debug)]
#[command(name = "aria-pc")]
#[command(about = "Playback client for Aria")]
#[command(version)]
struct Args {
    /// Base URL of the media server
    #[arg(short, long, default_value = "http://localhost:3000", env = "ARIA_SERVER_URL")]
    server_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aria_pc=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Connecting to media server at {}", args.server_url);

    let source = HttpTrackSource::new(&args.server_url)?;

    let tracks = source
        .fetch_track_list()
        .await
        .context("Failed to fetch track list")?;
    if tracks.is_empty() {
        anyhow::bail!("No music files available");
    }
    info!("Loaded {} tracks", tracks.len());

    let mut session = PlaybackSession::new(source, tracks);
    let sweep = session.spawn_eviction_sweep();

    let metadata = session.track_changed(0).await?;
    print_now_playing(&session, &metadata);

    // Command loop: next / prev / info / quit
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    println!("commands: next, prev, info, quit");
    while let Some(line) = lines.next_line().await? {
        let metadata = match line.trim() {
            "next" | "n" => Some(session.next().await?),
            "prev" | "p" => Some(session.previous().await?),
            "info" | "i" => {
                if let Some(filename) = session.current_filename().map(str::to_string) {
                    Some(session.metadata(&filename).await)
                } else {
                    None
                }
            }
            "quit" | "q" => break,
            "" => None,
            other => {
                println!("unknown command: {other}");
                None
            }
        };
        if let Some(metadata) = metadata {
            print_now_playing(&session, &metadata);
        }
    }

    sweep.abort();
    session.teardown().await;
    info!("Session closed");
    Ok(())
}

fn print_now_playing<S: TrackSource + 'static>(
    session: &PlaybackSession<S>,
    metadata: &aria_common::TrackMetadata,
) {
    let duration = session
        .active_track()
        .and_then(|track| PlaybackSession::<S>::effective_duration(track, metadata));
    println!(
        "[{}/{}] {} - {} ({})",
        session.current_index() + 1,
        session.track_count(),
        metadata.artist.as_deref().unwrap_or("Unknown Artist"),
        metadata.title.as_deref().unwrap_or("Unknown Track"),
        duration
            .map(format_time)
            .unwrap_or_else(|| "?:??".to_string()),
    );
}

/// `mm:ss` display formatting.
fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
