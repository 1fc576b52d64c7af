//! JSON-lines bridge over standard streams.
//!
//! Outbound messages are written one JSON object per line. Inbound payloads
//! are read one per line; blank lines are skipped and each line is handed to
//! the shell unparsed.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use crate::bridge::{OutboundMessage, WebContent};
use crate::error::BridgeError;

/// Capacity of the inbound line queue.
const INBOUND_QUEUE: usize = 64;

/// [`WebContent`] writing JSON lines to any async writer.
#[derive(Debug)]
pub struct LineContent<W> {
    out: Mutex<W>,
}

/// [`LineContent`] on stdout.
pub type StdioContent = LineContent<tokio::io::Stdout>;

impl StdioContent {
    /// Bridge writing to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> LineContent<W> {
    /// Bridge writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> WebContent for LineContent<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn post_message(&self, message: &OutboundMessage) -> Result<(), BridgeError> {
        let mut line = message.encode()?;
        line.push('\n');

        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| BridgeError::ContentUnavailable(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| BridgeError::ContentUnavailable(e.to_string()))
    }
}

/// Spawn a task forwarding non-blank lines of `reader`.
///
/// The receiver closes at end of input or on a read error.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(INBOUND_QUEUE);

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(line.to_string()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    log::debug!("Inbound stream closed");
                    break;
                }
                Err(e) => {
                    log::warn!("Inbound stream read failed: {e}");
                    break;
                }
            }
        }
    });

    rx
}
