//! # Confrec Protocol Types
//!
//! Data model shared between the recording coordination engine and the
//! messaging transport that carries it. This crate defines what the
//! protocol *says* — actions, states, error conditions, request/reply
//! shapes, presence extensions and participant roles — while the wire
//! encoding (XML stanzas, attributes) stays with the transport owner.
//!
//! No I/O happens here; everything is plain data with `serde` derives so
//! the host process can map it onto its own encoding.

pub mod ids;
pub mod message;
pub mod presence;
pub mod role;
pub mod status;

// Re-exports for convenience
pub use ids::{MemberAddress, RecorderId, RoomId};
pub use message::{ErrorCondition, RecordingAction, RecordingReply, RecordingRequest, ReplyError};
pub use presence::{RecorderPresence, RecordingStatusPresence};
pub use role::MemberRole;
pub use status::{AvailabilityStatus, RecordingState};
