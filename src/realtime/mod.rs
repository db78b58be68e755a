//! # Realtime Push Channel
//!
//! WebSocket connection to the server's push channel. The connection
//! is established only while the embedding UI wants realtime delivery
//! (chat views) and is explicitly torn down when it navigates away;
//! a failed connection stays down until the caller reconnects.
//!
//! A read-loop task decodes JSON frames into [`PushEvent`]s and hands
//! them to the [`Reconciler`]; a writer task drains the outbound
//! channel (mark-as-read receipts). Undecodable frames are logged and
//! skipped.

pub mod events;
pub mod presence;
pub mod reconciler;

pub use events::{ClientEvent, PushEvent};
pub use presence::{PresenceRegistry, TypingRegistry};
pub use reconciler::Reconciler;

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ClientError;

/// Outbound frames queued between caller and writer task
const OUTBOUND_CHANNEL_CAPACITY: usize = 32;

/// A live push channel connection.
///
/// Dropping the handle tears the connection down.
#[derive(Debug)]
pub struct RealtimeConnection {
    outbound_tx: mpsc::Sender<ClientEvent>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl RealtimeConnection {
    /// Connect to the push channel and start pumping events into the
    /// reconciler.
    pub async fn connect(
        config: &Config,
        reconciler: Arc<Reconciler>,
    ) -> Result<Self, ClientError> {
        let url = config
            .socket_url()
            .map_err(|error| ClientError::realtime(error.to_string()))?;

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|error| ClientError::realtime(error.to_string()))?;
        if let Some(token) = config.token() {
            let value = format!("Bearer {}", token)
                .parse()
                .map_err(|_| ClientError::realtime("token is not a valid header value"))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|error| ClientError::realtime(error.to_string()))?;
        info!(%url, "push channel connected");

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) =
            mpsc::channel::<ClientEvent>(OUTBOUND_CHANNEL_CAPACITY);

        let writer_task = tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let frame = match serde_json::to_string(&event) {
                    Ok(frame) => frame,
                    Err(error) => {
                        warn!(%error, "could not encode outbound frame");
                        continue;
                    }
                };
                if let Err(error) = sink.send(Message::Text(frame)).await {
                    warn!(%error, "push channel write failed");
                    break;
                }
            }
        });

        let reader_task = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<PushEvent>(&text) {
                        Ok(event) => reconciler.handle(event).await,
                        Err(error) => warn!(%error, "undecodable push frame"),
                    },
                    Ok(Message::Close(_)) => {
                        info!("push channel closed by server");
                        break;
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%error, "push channel read failed");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            outbound_tx,
            reader_task,
            writer_task,
        })
    }

    /// Queue an outbound frame
    pub async fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.outbound_tx
            .send(event)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Whether the read loop is still alive
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    /// Tear the connection down
    pub fn close(&self) {
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

impl Drop for RealtimeConnection {
    fn drop(&mut self) {
        self.close();
    }
}
