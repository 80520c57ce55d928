mod core;
mod input;
mod output;
mod socket;

use anyhow::Context;
use jukebox_proto::config::Config;
use tokio::io::BufReader;
use tokio::sync::{broadcast, mpsc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    let data_dir = jukebox_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let log_path = config.log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log {}", log_path.display()))?;

    // RUST_LOG wins over the configured filter
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("jukebox log: {}", log_path.display());

    tracing::info!("jukebox starting…");

    // ── Broadcast channel (DispatchCore → printer) ───────────────────────────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<core::BroadcastMessage>(1024);

    // ── CoreEvent channel (stdin → DispatchCore) ─────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<core::CoreEvent>(1024);

    let dispatch_core = core::DispatchCore::new(&config, broadcast_tx);

    let printer = tokio::spawn(output::print_snapshots(broadcast_rx, tokio::io::stdout()));
    let reader = tokio::spawn(input::forward_lines(
        BufReader::new(tokio::io::stdin()),
        event_tx,
    ));

    dispatch_core.run(event_rx).await?;

    // The core only stops after input is exhausted or the reader is gone
    reader.await??;
    printer.await??;

    tracing::info!("jukebox stopped");
    Ok(())
}
