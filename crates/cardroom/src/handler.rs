//! Per-connection tasks.
//!
//! Each accepted connection gets a reader (this task) and a writer (spawned
//! here). The reader decodes frames and forwards them to the dispatcher;
//! the writer drains the connection's outbox, wraps each event in an
//! [`Envelope`] and sends it. Neither touches room state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cardroom_protocol::{ClientFrame, Codec, Envelope, ErrorBody, PlayerId, ServerEvent};
use cardroom_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::CardroomError;
use crate::dispatch::Command;

/// Handles a single connection from accept to close.
///
/// Whatever ends the read loop (clean close, transport error, idle
/// timeout), the dispatcher is told with [`Command::Disconnect`], so a
/// dropped socket goes through the same leave path as `room:leave`.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    commands: mpsc::Sender<Command>,
    codec: Arc<C>,
    idle_timeout: Option<Duration>,
) -> Result<(), CardroomError> {
    let player = PlayerId(conn.id().into_inner());
    let conn = Arc::new(conn);
    let start = Instant::now();
    tracing::debug!(%player, peer = %conn.peer_addr(), "connection opened");

    let (outbox, inbox) = mpsc::unbounded_channel();
    commands
        .send(Command::Connect { player, outbox: outbox.clone() })
        .await
        .map_err(|_| CardroomError::DispatcherClosed)?;

    let writer = tokio::spawn(write_events(
        Arc::clone(&conn),
        inbox,
        Arc::clone(&codec),
        start,
    ));

    loop {
        let received = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::info!(%player, "connection idle, closing");
                    break;
                }
            },
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%player, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "recv error");
                break;
            }
        };

        let frame: ClientFrame = match codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%player, error = %e, "failed to decode frame");
                let e = CardroomError::from(e);
                let _ = outbox.send(ServerEvent::Error(ErrorBody::new(e.code(), e.to_string())));
                continue;
            }
        };

        if commands.send(Command::Frame { player, frame }).await.is_err() {
            return Err(CardroomError::DispatcherClosed);
        }
    }

    // The writer finishes once both its outbox senders are gone: ours here,
    // the gateway's when the dispatcher unregisters the player.
    drop(outbox);
    let disconnected = commands.send(Command::Disconnect { player }).await;
    if disconnected.is_ok() {
        let _ = writer.await;
    } else {
        writer.abort();
    }
    let _ = conn.close().await;

    disconnected.map_err(|_| CardroomError::DispatcherClosed)
}

/// Drains the outbox onto the socket. Sequence numbers start at 1 and
/// timestamps are milliseconds since the connection was accepted.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut inbox: mpsc::UnboundedReceiver<ServerEvent>,
    codec: Arc<C>,
    start: Instant,
) {
    let mut seq: u64 = 0;
    while let Some(payload) = inbox.recv().await {
        seq += 1;
        let envelope = Envelope {
            seq,
            timestamp: start.elapsed().as_millis() as u64,
            payload,
        };
        let bytes = match codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(conn_id = %conn.id(), error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
            break;
        }
    }
}
