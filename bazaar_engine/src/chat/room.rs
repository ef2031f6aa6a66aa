//! Room membership.
//!
//! A [`Room`] is a plain registry of the connections currently joined to one dispute. It is owned and mutated
//! exclusively by the hub coordinator, so it needs no synchronisation of its own.
use std::{
    collections::HashMap,
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use log::*;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{Duration, Instant},
};

use crate::{
    chat::message::ChatMessage,
    db_types::{DisputeId, UserId},
};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier. Distinguishes two connections from the same participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a registered connection for unregistration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionKey {
    pub id: ConnectionId,
    pub participant: UserId,
    pub room: DisputeId,
}

/// The hub's side of a connection: who it belongs to, and the sending half of its outbound queue.
///
/// Dropping the handle closes the queue, which in turn ends the connection's write loop.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub participant: UserId,
    pub username: String,
    pub room: DisputeId,
    outbound: mpsc::Sender<ChatMessage>,
}

impl ConnectionHandle {
    /// Creates a new handle with an outbound queue of `queue_size` messages. The receiving half is returned alongside
    /// it and belongs to the connection's write loop.
    pub fn new(
        participant: UserId,
        username: String,
        room: DisputeId,
        queue_size: usize,
    ) -> (Self, mpsc::Receiver<ChatMessage>) {
        let (outbound, receiver) = mpsc::channel(queue_size.max(1));
        let handle = Self { id: ConnectionId::next(), participant, username, room, outbound };
        (handle, receiver)
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey { id: self.id, participant: self.participant.clone(), room: self.room.clone() }
    }
}

#[derive(Debug)]
pub struct Room {
    id: DisputeId,
    members: HashMap<UserId, ConnectionHandle>,
    empty_since: Option<Instant>,
}

impl Room {
    pub fn new(id: DisputeId) -> Self {
        Self { id, members: HashMap::new(), empty_since: Some(Instant::now()) }
    }

    pub fn id(&self) -> &DisputeId {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> Vec<UserId> {
        let mut ids = self.members.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Adds the connection. A participant holds at most one slot, so any previous connection for the same participant
    /// is replaced and returned.
    pub fn insert(&mut self, conn: ConnectionHandle) -> Option<ConnectionHandle> {
        self.empty_since = None;
        self.members.insert(conn.participant.clone(), conn)
    }

    /// Removes the connection named by `key`, but only if it still holds the participant's slot. Returns the removed
    /// handle, if any.
    pub fn remove(&mut self, key: &ConnectionKey) -> Option<ConnectionHandle> {
        let current = self.members.get(&key.participant)?;
        if current.id != key.id {
            trace!("💬️ Connection {} has already been replaced in room {}", key.id, self.id);
            return None;
        }
        let removed = self.members.remove(&key.participant);
        self.mark_if_empty();
        removed
    }

    /// Pushes `message` onto the queue of every member except its sender, without waiting.
    ///
    /// A member whose queue is full or closed is evicted from the room. Their handles are returned so the caller can
    /// log them; dropping them closes their queues.
    pub fn deliver(&mut self, message: &ChatMessage) -> Vec<ConnectionHandle> {
        let mut failed = Vec::new();
        for (participant, conn) in &self.members {
            if *participant == message.sender {
                continue;
            }
            match conn.outbound.try_send(message.clone()) {
                Ok(()) => {},
                Err(TrySendError::Full(_)) => {
                    warn!("💬️ Outbound queue for {participant} in room {} is full. Dropping them.", self.id);
                    failed.push(participant.clone());
                },
                Err(TrySendError::Closed(_)) => {
                    debug!("💬️ Outbound queue for {participant} in room {} is closed. Dropping them.", self.id);
                    failed.push(participant.clone());
                },
            }
        }
        let evicted = failed.iter().filter_map(|p| self.members.remove(p)).collect::<Vec<_>>();
        self.mark_if_empty();
        evicted
    }

    /// Removes every member, closing all their queues. Returns the number of connections dropped.
    pub fn close(&mut self) -> usize {
        let n = self.members.len();
        self.members.clear();
        self.mark_if_empty();
        n
    }

    /// How long the room has been without members, as of `now`. `None` if it is occupied.
    pub fn idle_for(&self, now: Instant) -> Option<Duration> {
        self.empty_since.map(|t| now.saturating_duration_since(t))
    }

    fn mark_if_empty(&mut self) {
        if self.members.is_empty() && self.empty_since.is_none() {
            self.empty_since = Some(Instant::now());
        }
    }
}
