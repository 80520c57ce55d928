use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use jukebox_state::SocketHandle;
use tokio::net::TcpStream;
use tracing::{info, warn};

/// A TCP connection held in state.  Closing drops the stream, which shuts
/// the connection down; later `close` calls are no-ops.
#[derive(Debug)]
pub struct TcpSocket {
    address: String,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpSocket {
    pub async fn connect(address: &str, timeout: Duration) -> anyhow::Result<Self> {
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
            Ok(result) => result.with_context(|| format!("connecting to {}", address))?,
            Err(_) => anyhow::bail!("timed out connecting to {} after {:?}", address, timeout),
        };
        info!("socket connected to {}", address);
        Ok(Self {
            address: address.to_string(),
            stream: Mutex::new(Some(stream)),
        })
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.stream.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl SocketHandle for TcpSocket {
    fn close(&self) {
        match self.stream.lock() {
            Ok(mut guard) => {
                if guard.take().is_some() {
                    info!("socket to {} closed", self.address);
                }
            }
            Err(_) => warn!("socket to {} lock poisoned; not closed", self.address),
        }
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_close_shuts_connection_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let socket = TcpSocket::connect(&address, Duration::from_secs(2))
            .await
            .unwrap();
        let (mut server_side, _) = listener.accept().await.unwrap();
        assert!(socket.is_open());
        assert_eq!(socket.describe(), format!("tcp://{}", address));

        socket.close();
        assert!(!socket.is_open());
        socket.close();

        let mut buf = [0u8; 8];
        let n = server_side.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = TcpSocket::connect(&address, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.to_string().contains(&address));
    }
}
