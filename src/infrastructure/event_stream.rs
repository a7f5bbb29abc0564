//! Server-sent event subscriber.
//!
//! The push channel carries opaque "something changed" notifications; every
//! data frame is translated into a [`RefreshSignal::ServerPush`] on the
//! console's refresh channel. The payload is never authoritative.
//!
//! On transport error the stream closes without retry and the console
//! degrades to the poll fallback; staleness is bounded by one poll period.

use futures::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::events::RefreshSignal;

/// Incremental parser for the `text/event-stream` wire format.
///
/// Frames are separated by a blank line; only `data:` lines matter here.
/// Comment lines (leading `:`) and other fields are ignored.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    data: Vec<String>,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the data payloads of every frame completed
    /// by it. Partial lines are buffered until the next chunk.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                // Frame boundary.
                if !self.data.is_empty() {
                    frames.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.trim_start().to_string());
            }
            // Field lines other than data (event:, id:, retry:, comments)
            // carry nothing the console uses.
        }
        frames
    }
}

/// Spawns the subscriber task.
///
/// Uses the API client's own `Client` so the stream is credentialed with the
/// same cookie jar. The task ends on cancellation, on server end-of-stream,
/// or on the first transport error (no reconnect).
pub fn spawn_event_stream(
    client: Client,
    url: Url,
    refresh_tx: mpsc::Sender<RefreshSignal>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let request = client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let response = tokio::select! {
            () = shutdown.cancelled() => return,
            result = request.send() => result,
        };
        let response = match response.and_then(reqwest::Response::error_for_status) {
            Ok(response) => response,
            Err(error) => {
                warn!("event stream unavailable, relying on poll fallback: {error}");
                return;
            }
        };
        info!("event stream connected: {url}");

        let mut parser = SseParser::new();
        let mut body = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                () = shutdown.cancelled() => break,
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes);
                    for frame in parser.push(&text) {
                        debug!("event stream notification: {frame}");
                        if refresh_tx.send(RefreshSignal::ServerPush).await.is_err() {
                            return;
                        }
                    }
                }
                Some(Err(error)) => {
                    warn!("event stream closed on transport error: {error}");
                    break;
                }
                None => {
                    info!("event stream ended by server");
                    break;
                }
            }
        }
    })
}
