use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::warn;

use crate::core::BroadcastMessage;

/// Write every broadcast snapshot as one line of redacted JSON.  Failures go
/// to stderr so stdout stays machine-readable.  Returns when the core drops
/// its sender.
pub async fn print_snapshots<W>(
    mut rx: broadcast::Receiver<BroadcastMessage>,
    mut out: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match rx.recv().await {
            Ok(BroadcastMessage::StateUpdated(state)) => {
                let mut line = serde_json::to_vec(&state.redacted())?;
                line.push(b'\n');
                out.write_all(&line).await?;
                out.flush().await?;
            }
            Ok(BroadcastMessage::DispatchFailed(reason)) => {
                eprintln!("jukebox: {}", reason);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("printer lagged, {} snapshots skipped", n);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    Ok(())
}
