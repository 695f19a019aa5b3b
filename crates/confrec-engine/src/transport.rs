//! Messaging transport boundary
//!
//! The engine does not implement a transport. The host process supplies
//! these traits, backed by whatever connection and wire encoding it owns,
//! and the engine drives them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use confrec_proto::{
    RecorderId, RecorderPresence, RecordingReply, RecordingRequest, RecordingStatusPresence,
    RoomId,
};

use crate::error::TransportError;

/// Occupant change in the shared coordination room, routed to one handler
/// by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A member entered the room
    MemberJoined {
        occupant: RecorderId,
        presence: Option<RecorderPresence>,
    },

    /// A member left the room
    MemberLeft { occupant: RecorderId },

    /// A member's presence payload changed
    PropertyChanged {
        occupant: RecorderId,
        presence: Option<RecorderPresence>,
    },
}

/// Request/reply and one-way messaging towards recorders.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    /// Send `request` to `to` and wait for its reply. Callers bound the
    /// wait; an unbounded transport is acceptable here.
    async fn request(
        &self,
        to: &RecorderId,
        request: RecordingRequest,
    ) -> Result<RecordingReply, TransportError>;

    /// One-way send with no reply expected.
    async fn send(&self, to: &RecorderId, request: RecordingRequest)
        -> Result<(), TransportError>;
}

/// Join/leave handle for the shared coordination room.
#[async_trait]
pub trait CoordinationRoom: Send + Sync {
    /// Join `room`. The receiver yields member events until the room is
    /// left or the connection drops.
    async fn join(&self, room: &RoomId) -> Result<mpsc::Receiver<RoomEvent>, TransportError>;

    /// Leave `room`.
    async fn leave(&self, room: &RoomId) -> Result<(), TransportError>;
}

/// Publishes a session's recording status into its conference room
/// presence.
#[async_trait]
pub trait PresencePublisher: Send + Sync {
    async fn publish_status(
        &self,
        room: &RoomId,
        status: RecordingStatusPresence,
    ) -> Result<(), TransportError>;
}
