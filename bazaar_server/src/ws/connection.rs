use std::fmt::Display;

use actix_web::web;
use bazaar_engine::{
    chat::message::inbound_content,
    db_types::{DisputeId, UserId},
    traits::MessageLog,
    ChatMessage,
    ConnectionKey,
    DisputeApi,
    Hub,
};
use log::*;
use tokio::sync::{mpsc, oneshot};

use super::{Frame, FrameSink, FrameSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Joining,
    Active,
    Closing,
    Closed,
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Joining => write!(f, "Joining"),
            Self::Active => write!(f, "Active"),
            Self::Closing => write!(f, "Closing"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Everything a connection's read loop needs to know about itself.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub key: ConnectionKey,
    pub username: String,
    state: ConnectionState,
}

impl ConnectionContext {
    pub fn new(key: ConnectionKey, username: String) -> Self {
        Self { key, username, state: ConnectionState::Joining }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn transition(&mut self, next: ConnectionState) {
        trace!("🔌️ Connection {} ({}): {} -> {next}", self.key.id, self.key.participant, self.state);
        self.state = next;
    }

    fn message(&self, content: String) -> ChatMessage {
        ChatMessage {
            room: self.key.room.clone(),
            sender: self.key.participant.clone(),
            username: self.username.clone(),
            content,
        }
    }
}

/// Registers a freshly upgraded connection with the hub and spawns its read and write loops.
///
/// The loops run on the current actix worker (`actix_web::rt::spawn`) since the WebSocket stream is not `Send`.
pub async fn spawn_connection<B, S, K>(
    hub: Hub,
    api: web::Data<DisputeApi<B>>,
    source: S,
    sink: K,
    participant: UserId,
    username: String,
    room: DisputeId,
) -> ConnectionContext
where
    B: MessageLog + 'static,
    S: FrameSource + 'static,
    K: FrameSink + 'static,
{
    let (handle, outbound) = hub.new_connection(participant.clone(), username.clone(), room);
    let mut ctx = ConnectionContext::new(handle.key(), username);
    hub.register(handle).await;
    ctx.transition(ConnectionState::Active);
    info!("🔌️ {participant} connected to room {} as '{}' (connection {})", ctx.key.room, ctx.username, ctx.key.id);
    let (dropped_tx, dropped_rx) = oneshot::channel();
    actix_web::rt::spawn(write_loop(outbound, sink.clone(), participant, dropped_tx));
    actix_web::rt::spawn(read_loop(source, sink, hub, api, ctx.clone(), dropped_rx));
    ctx
}

/// Reads frames until the peer goes away, persisting and relaying every text frame.
///
/// Each message is written to the message log exactly once, before it is broadcast. If the write fails, the message
/// is dropped and this connection is closed. The connection is unregistered from the hub however the loop ends.
///
/// `dropped` resolves once the write loop has ended, i.e. when the hub has let go of this connection (replaced by a
/// rejoin, evicted as a slow reader, or its room closed) or the transport failed. Frames that arrive after that are
/// never recorded or relayed.
pub async fn read_loop<S, K, B>(
    mut source: S,
    mut sink: K,
    hub: Hub,
    api: web::Data<DisputeApi<B>>,
    mut ctx: ConnectionContext,
    mut dropped: oneshot::Receiver<()>,
) -> ConnectionContext
where
    S: FrameSource,
    K: FrameSink,
    B: MessageLog,
{
    while ctx.state() == ConnectionState::Active {
        let frame = tokio::select! {
            biased;
            _ = &mut dropped => None,
            frame = source.next_frame() => Some(frame),
        };
        let Some(frame) = frame else {
            debug!("🔌️ Connection {} was dropped. Its write loop has ended", ctx.key.id);
            ctx.transition(ConnectionState::Closing);
            continue;
        };
        match frame {
            Some(Ok(Frame::Text(text))) => {
                let message = ctx.message(inbound_content(&text));
                match api.record_message(message.to_persisted()).await {
                    Ok(saved) => {
                        trace!("🔌️ Message #{} from {} recorded", saved.id, saved.sender_id);
                        hub.broadcast(message).await;
                    },
                    Err(e) => {
                        warn!(
                            "🔌️ Could not record message from {} in room {}. Closing their connection. {e}",
                            ctx.key.participant, ctx.key.room
                        );
                        ctx.transition(ConnectionState::Closing);
                    },
                }
            },
            Some(Ok(Frame::Ping(payload))) => {
                if let Err(e) = sink.pong(&payload).await {
                    debug!("🔌️ Could not answer ping on connection {}. {e}", ctx.key.id);
                    ctx.transition(ConnectionState::Closing);
                }
            },
            Some(Ok(Frame::Other)) => {},
            Some(Ok(Frame::Close)) | None => {
                debug!("🔌️ {} closed connection {}", ctx.key.participant, ctx.key.id);
                ctx.transition(ConnectionState::Closing);
            },
            Some(Err(e)) => {
                debug!("🔌️ Receive error on connection {}. {e}", ctx.key.id);
                ctx.transition(ConnectionState::Closing);
            },
        }
    }
    hub.unregister(ctx.key.clone()).await;
    sink.close().await;
    ctx.transition(ConnectionState::Closed);
    info!("🔌️ {} disconnected from room {} (connection {})", ctx.key.participant, ctx.key.room, ctx.key.id);
    ctx
}

/// Drains the connection's outbound queue onto the transport, in order.
///
/// Ends when the hub drops the connection (the queue closes) or when a write fails. Either way the transport is
/// closed and `dropped` fires, which ends the read loop.
pub async fn write_loop<K: FrameSink>(
    mut outbound: mpsc::Receiver<ChatMessage>,
    mut sink: K,
    participant: UserId,
    dropped: oneshot::Sender<()>,
) {
    while let Some(message) = outbound.recv().await {
        if message.sender == participant {
            continue;
        }
        let frame = match serde_json::to_string(&message.to_wire()) {
            Ok(json) => json,
            Err(e) => {
                error!("🔌️ Could not serialize message for {participant}. {e}");
                continue;
            },
        };
        if let Err(e) = sink.send_text(frame).await {
            debug!("🔌️ Write to {participant} failed. {e}");
            break;
        }
    }
    trace!("🔌️ Write loop for {participant} has ended");
    sink.close().await;
    // The read loop may already be gone
    let _ = dropped.send(());
}
