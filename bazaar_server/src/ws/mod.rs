//! # WebSocket connections
//!
//! Each participant in a dispute room is served by two tasks: a read loop that turns incoming frames into chat
//! messages, and a write loop that drains the connection's outbound queue onto the socket. Both are written against
//! the small [`FrameSource`] / [`FrameSink`] transport traits defined here; `actix-ws` provides the production
//! implementation.
use actix_ws::{CloseCode, CloseReason, Message, MessageStream, Session};
use futures::StreamExt;

use crate::errors::TransportError;

mod connection;

pub use connection::{read_loop, spawn_connection, write_loop, ConnectionContext, ConnectionState};

/// The frames the chat protocol cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Ping(Vec<u8>),
    Close,
    /// Binary, pong and continuation frames. These are ignored.
    Other,
}

/// The receiving half of a transport.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// The next frame, or `None` once the peer has gone away.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// The sending half of a transport. Clones share the same underlying connection.
#[allow(async_fn_in_trait)]
pub trait FrameSink: Clone {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    async fn pong(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    /// Closes the connection. Closing an already closed connection is harmless.
    async fn close(self);
}

impl FrameSource for MessageStream {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        let msg = self.next().await?;
        let frame = match msg {
            Ok(Message::Text(text)) => Ok(Frame::Text(text.to_string())),
            Ok(Message::Ping(bytes)) => Ok(Frame::Ping(bytes.to_vec())),
            Ok(Message::Close(_)) => Ok(Frame::Close),
            Ok(_) => Ok(Frame::Other),
            Err(e) => Err(TransportError::Protocol(e.to_string())),
        };
        Some(frame)
    }
}

impl FrameSink for Session {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.text(text).await.map_err(|_| TransportError::Closed)
    }

    async fn pong(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        Session::pong(self, payload).await.map_err(|_| TransportError::Closed)
    }

    async fn close(self) {
        let reason = CloseReason { code: CloseCode::Normal, description: None };
        let _ = Session::close(self, Some(reason)).await;
    }
}
