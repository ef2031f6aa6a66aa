//! The hub is the single, process-wide coordinator of chat rooms.
//!
//! All room state lives inside one coordinator task ([`HubCoordinator`]). Everyone else talks to it through a cheap,
//! cloneable [`Hub`] handle that posts commands onto a bounded queue. Since the coordinator processes commands strictly
//! in the order they arrive and every recipient queue is FIFO, two messages from the same sender always reach a given
//! recipient in the order they were sent.
//!
//! The hub knows nothing about disputes being open or closed. Admission is the access gate's job; the hub merely
//! offers [`Hub::close_room`] so that callers can evict everyone when a dispute is resolved.
use std::collections::HashMap;

use log::*;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant},
};

use crate::{
    chat::{
        message::ChatMessage,
        room::{ConnectionHandle, ConnectionKey, Room},
    },
    db_types::{DisputeId, UserId},
};

pub const DEFAULT_COMMAND_BUFFER: usize = 1024;
pub const DEFAULT_CONNECTION_QUEUE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Capacity of the hub's command queue.
    pub command_buffer: usize,
    /// Capacity of each connection's outbound queue. A recipient that falls this far behind is dropped.
    pub connection_queue_size: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { command_buffer: DEFAULT_COMMAND_BUFFER, connection_queue_size: DEFAULT_CONNECTION_QUEUE_SIZE }
    }
}

#[derive(Debug)]
enum HubCommand {
    Register(ConnectionHandle),
    Unregister(ConnectionKey),
    Broadcast(ChatMessage),
    CreateRoom(DisputeId),
    ListRooms(oneshot::Sender<Vec<DisputeId>>),
    CloseRoom(DisputeId, oneshot::Sender<usize>),
    ReapIdle(Duration, oneshot::Sender<Vec<DisputeId>>),
    RoomMembers(DisputeId, oneshot::Sender<Vec<UserId>>),
}

/// A handle to the hub coordinator.
///
/// None of the methods fail. If the coordinator has stopped, commands are logged and discarded and queries return
/// empty results.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
    config: HubConfig,
}

impl Hub {
    /// Creates a hub handle and its coordinator. The coordinator does nothing until [`HubCoordinator::run`] is polled.
    /// It stops once every `Hub` handle has been dropped.
    pub fn new(config: HubConfig) -> (Self, HubCoordinator) {
        let (commands, receiver) = mpsc::channel(config.command_buffer.max(1));
        let hub = Self { commands, config };
        let coordinator = HubCoordinator { commands: receiver, rooms: HashMap::new() };
        (hub, coordinator)
    }

    /// Creates a hub and spawns its coordinator onto the current tokio runtime.
    pub fn start(config: HubConfig) -> Self {
        let (hub, coordinator) = Self::new(config);
        tokio::spawn(coordinator.run());
        hub
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Creates the hub-side handle for a new connection, sized according to the hub configuration. The returned
    /// receiver is the connection's outbound queue.
    pub fn new_connection(
        &self,
        participant: UserId,
        username: String,
        room: DisputeId,
    ) -> (ConnectionHandle, mpsc::Receiver<ChatMessage>) {
        ConnectionHandle::new(participant, username, room, self.config.connection_queue_size)
    }

    /// Adds the connection to its room, creating the room if necessary. An existing connection for the same
    /// participant in the same room is replaced and its queue closed.
    pub async fn register(&self, conn: ConnectionHandle) {
        self.send(HubCommand::Register(conn)).await;
    }

    /// Removes the connection from its room. Unregistering twice, or unregistering a connection that has since been
    /// replaced, is a no-op.
    pub async fn unregister(&self, key: ConnectionKey) {
        self.send(HubCommand::Unregister(key)).await;
    }

    /// Delivers the message to every member of `message.room` except the sender.
    pub async fn broadcast(&self, message: ChatMessage) {
        self.send(HubCommand::Broadcast(message)).await;
    }

    /// Creates an empty room, if one does not already exist.
    pub async fn create_room(&self, id: DisputeId) {
        self.send(HubCommand::CreateRoom(id)).await;
    }

    /// Returns the identifiers of all rooms the hub currently holds, in sorted order.
    pub async fn list_rooms(&self) -> Vec<DisputeId> {
        self.query(HubCommand::ListRooms).await
    }

    /// Removes the room and disconnects all of its members. Returns the number of connections that were dropped.
    pub async fn close_room(&self, id: DisputeId) -> usize {
        self.query(|tx| HubCommand::CloseRoom(id, tx)).await
    }

    /// Removes every room that has been empty for at least `max_idle`, and returns their ids.
    pub async fn reap_idle_rooms(&self, max_idle: Duration) -> Vec<DisputeId> {
        self.query(|tx| HubCommand::ReapIdle(max_idle, tx)).await
    }

    /// Returns the participants currently joined to the room.
    pub async fn room_members(&self, id: DisputeId) -> Vec<UserId> {
        self.query(|tx| HubCommand::RoomMembers(id, tx)).await
    }

    async fn send(&self, cmd: HubCommand) {
        if let Err(e) = self.commands.send(cmd).await {
            warn!("💬️ Hub coordinator has stopped. Discarding command: {:?}", e.0);
        }
    }

    async fn query<T, F>(&self, make_cmd: F) -> T
    where
        T: Default,
        F: FnOnce(oneshot::Sender<T>) -> HubCommand,
    {
        let (tx, rx) = oneshot::channel();
        self.send(make_cmd(tx)).await;
        rx.await.unwrap_or_default()
    }
}

/// The task that owns every room. Obtain one from [`Hub::new`].
pub struct HubCoordinator {
    commands: mpsc::Receiver<HubCommand>,
    rooms: HashMap<DisputeId, Room>,
}

impl HubCoordinator {
    pub async fn run(mut self) {
        info!("💬️ Hub coordinator started");
        while let Some(cmd) = self.commands.recv().await {
            self.handle(cmd);
        }
        let n = self.rooms.len();
        self.rooms.clear();
        info!("💬️ Hub coordinator has shut down. {n} rooms were closed.");
    }

    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Register(conn) => self.register(conn),
            HubCommand::Unregister(key) => self.unregister(&key),
            HubCommand::Broadcast(message) => self.broadcast(&message),
            HubCommand::CreateRoom(id) => {
                if !self.rooms.contains_key(&id) {
                    debug!("💬️ Room {id} created");
                    self.rooms.insert(id.clone(), Room::new(id));
                }
            },
            HubCommand::ListRooms(reply) => {
                let mut ids = self.rooms.keys().cloned().collect::<Vec<_>>();
                ids.sort();
                let _ = reply.send(ids);
            },
            HubCommand::CloseRoom(id, reply) => {
                let n = self.rooms.remove(&id).map(|mut room| room.close()).unwrap_or_default();
                info!("💬️ Room {id} closed. {n} connections were dropped.");
                let _ = reply.send(n);
            },
            HubCommand::ReapIdle(max_idle, reply) => {
                let _ = reply.send(self.reap_idle(max_idle));
            },
            HubCommand::RoomMembers(id, reply) => {
                let members = self.rooms.get(&id).map(|r| r.member_ids()).unwrap_or_default();
                let _ = reply.send(members);
            },
        }
    }

    fn register(&mut self, conn: ConnectionHandle) {
        let id = conn.room.clone();
        let room = self.rooms.entry(id.clone()).or_insert_with(|| {
            debug!("💬️ Room {id} created on first join");
            Room::new(id.clone())
        });
        let (conn_id, participant) = (conn.id, conn.participant.clone());
        if let Some(old) = room.insert(conn) {
            info!("💬️ {participant} rejoined room {id}. Connection {} replaced by {conn_id}", old.id);
        } else {
            info!("💬️ {participant} joined room {id} on connection {conn_id}. {} members present", room.len());
        }
    }

    fn unregister(&mut self, key: &ConnectionKey) {
        let Some(room) = self.rooms.get_mut(&key.room) else {
            trace!("💬️ Unregister for connection {} ignored. Room {} is gone", key.id, key.room);
            return;
        };
        if room.remove(key).is_some() {
            info!("💬️ {} left room {} (connection {})", key.participant, key.room, key.id);
        }
    }

    fn broadcast(&mut self, message: &ChatMessage) {
        let Some(room) = self.rooms.get_mut(&message.room) else {
            debug!("💬️ Message from {} for unknown room {} discarded", message.sender, message.room);
            return;
        };
        let evicted = room.deliver(message);
        for conn in evicted {
            info!("💬️ {} removed from room {} after failed delivery (connection {})", conn.participant, conn.room, conn.id);
        }
        trace!("💬️ Message from {} delivered in room {}", message.sender, message.room);
    }

    fn reap_idle(&mut self, max_idle: Duration) -> Vec<DisputeId> {
        let now = Instant::now();
        let mut reaped = self
            .rooms
            .iter()
            .filter(|(_, room)| room.idle_for(now).map(|idle| idle >= max_idle).unwrap_or(false))
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        reaped.sort();
        for id in &reaped {
            self.rooms.remove(id);
            debug!("💬️ Idle room {id} reaped");
        }
        reaped
    }
}
