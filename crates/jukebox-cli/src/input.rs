use jukebox_proto::protocol::ActionMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::CoreEvent;

/// Read one JSON action envelope per line and forward it to the core.
/// Blank and unparsable lines are skipped.  Sends `Shutdown` at end of input.
pub async fn forward_lines<R>(reader: R, event_tx: mpsc::Sender<CoreEvent>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match ActionMessage::from_line(&line) {
            Ok(message) => {
                if event_tx.send(CoreEvent::Message(message)).await.is_err() {
                    debug!("core gone, stop reading input");
                    return Ok(());
                }
            }
            Err(e) => warn!("line {}: not an action envelope: {}", line_no, e),
        }
    }

    let _ = event_tx.send(CoreEvent::Shutdown).await;
    Ok(())
}
