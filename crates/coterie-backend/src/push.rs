//! Realtime push channel: row-level INSERT notifications on `Comments`.
//!
//! The subscription is a websocket session with the backend's realtime
//! endpoint.  A spawned task joins the `Comments` topic, answers the
//! heartbeat, decodes INSERT payloads and forwards them over an mpsc
//! channel; anything it cannot decode is skipped.  Delivery is
//! best-effort by contract — a dropped or missed event is repaired by
//! the consumer's next full sync, never retried here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use coterie_shared::constants::PUSH_HEARTBEAT_SECS;
use coterie_shared::types::{CommentId, PostId, UserId};

use crate::error::PushError;
use crate::http::HttpBackend;
use crate::rows::AuthorJoin;

const COMMENTS_TOPIC: &str = "realtime:public:Comments";
const EVENT_CAPACITY: usize = 64;

/// A freshly inserted `Comments` row as delivered by the push channel.
/// The author join is usually absent; the consumer substitutes the
/// session identity.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommentInsertEvent {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "Users", default)]
    pub author: Option<AuthorJoin>,
}

/// The server-to-client change feed.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Open a subscription to INSERT events on the `Comments`
    /// relation.  The receiver ends when the underlying session does.
    async fn subscribe_comment_inserts(
        &self,
    ) -> Result<mpsc::Receiver<CommentInsertEvent>, PushError>;
}

// ---------------------------------------------------------------------------
// Websocket wire frames (Phoenix-style envelope)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    topic: String,
    event: String,
    payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

impl Frame {
    fn join(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            event: "phx_join".to_string(),
            payload: serde_json::json!({}),
            reference: Some("1".to_string()),
        }
    }

    fn heartbeat() -> Self {
        Self {
            topic: "phoenix".to_string(),
            event: "heartbeat".to_string(),
            payload: serde_json::json!({}),
            reference: None,
        }
    }
}

#[async_trait]
impl PushChannel for HttpBackend {
    async fn subscribe_comment_inserts(
        &self,
    ) -> Result<mpsc::Receiver<CommentInsertEvent>, PushError> {
        let (mut ws, _) = connect_async(self.config.realtime_url()).await?;

        let join = serde_json::to_string(&Frame::join(COMMENTS_TOPIC))
            .map_err(|e| PushError::Handshake(e.to_string()))?;
        ws.send(Message::Text(join)).await?;

        info!(topic = COMMENTS_TOPIC, "Push subscription opened");

        let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
        tokio::spawn(async move {
            subscription_loop(ws, tx).await;
        });

        Ok(rx)
    }
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Pump frames until the socket closes or the consumer goes away.
async fn subscription_loop(mut ws: WsStream, tx: mpsc::Sender<CommentInsertEvent>) {
    let mut heartbeat =
        tokio::time::interval(std::time::Duration::from_secs(PUSH_HEARTBEAT_SECS));
    // First tick fires immediately; the join frame already went out.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let frame = match serde_json::to_string(&Frame::heartbeat()) {
                    Ok(f) => f,
                    Err(_) => continue,
                };
                if ws.send(Message::Text(frame)).await.is_err() {
                    warn!("Push heartbeat failed, closing subscription");
                    break;
                }
            }

            incoming = ws.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = decode_insert(&text) {
                            if tx.send(event).await.is_err() {
                                debug!("Push consumer dropped, closing subscription");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Push channel closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Push channel read error");
                        break;
                    }
                }
            }
        }
    }
}

/// Decode an INSERT frame into an event; anything else is `None`.
fn decode_insert(text: &str) -> Option<CommentInsertEvent> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            debug!(error = %e, "Unparseable push frame, skipping");
            return None;
        }
    };

    if frame.topic != COMMENTS_TOPIC || frame.event != "INSERT" {
        return None;
    }

    let record = frame.payload.get("record")?;
    match serde_json::from_value(record.clone()) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, "Unparseable INSERT record, skipping");
            None
        }
    }
}
