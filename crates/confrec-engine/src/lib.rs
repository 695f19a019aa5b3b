//! # Confrec Recording Engine
//!
//! Coordination core for an external recording/streaming worker fleet
//! ("recorders") serving live conference rooms. A focus process runs one
//! [`RecordingSession`] per conference against a single shared
//! [`RecorderDirectory`] that tracks the fleet's availability from
//! coordination-room presence.
//!
//! ## Architecture
//!
//! - [`directory`]: recorder discovery and availability tracking
//! - [`session`]: per-conference recording state machine
//! - [`transport`]: traits the host's messaging layer implements
//! - [`conference`]: view of the owning conference (identity, members,
//!   roles)
//! - [`config`]: engine configuration
//! - [`error`]: engine and transport error types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confrec_engine::prelude::*;
//! use std::time::Duration;
//!
//! let mut config = RecorderConfig::default();
//! config.directory.coordination_room = RoomId::new("recorders@conference.example.com");
//! config.session.request_timeout = Duration::from_secs(10);
//! assert!(config.validate().is_ok());
//! ```
//!
//! With a validated configuration, construct a [`RecordingEngine`] from
//! the host's [`CoordinationRoom`], [`ControlChannel`] and
//! [`PresencePublisher`] handles, `start()` it, and call
//! `create_session` for each conference as it is created.

use std::sync::Arc;

// Core modules
pub mod config;
pub mod error;

// Coordination functionality modules
pub mod directory;
pub mod session;

// External interfaces
pub mod conference;
pub mod transport;

// Re-exports for convenience
pub use config::RecorderConfig;
pub use directory::RecorderDirectory;
pub use error::{RecorderError, Result, TransportError};
pub use session::RecordingSession;

use conference::ConferenceHandle;
use directory::DirectoryStats;
use transport::{ControlChannel, CoordinationRoom, PresencePublisher};

/// Main recording engine
///
/// Owns the shared recorder directory and the transport handles, and
/// wires new sessions to them. One engine per focus process.
pub struct RecordingEngine {
    /// Engine configuration
    config: RecorderConfig,

    /// Shared recorder directory
    directory: Arc<RecorderDirectory>,

    /// Request/reply channel towards recorders
    channel: Arc<dyn ControlChannel>,

    /// Conference-room presence publisher
    presence: Arc<dyn PresencePublisher>,
}

impl RecordingEngine {
    /// Create a new recording engine
    pub fn new(
        config: RecorderConfig,
        room: Arc<dyn CoordinationRoom>,
        channel: Arc<dyn ControlChannel>,
        presence: Arc<dyn PresencePublisher>,
    ) -> Result<Self> {
        config.validate().map_err(RecorderError::config)?;

        let directory = Arc::new(RecorderDirectory::new(config.directory.clone(), room));

        Ok(Self {
            config,
            directory,
            channel,
            presence,
        })
    }

    /// Join the coordination room and begin tracking the fleet
    pub async fn start(&self) -> Result<()> {
        Arc::clone(&self.directory).start().await
    }

    /// Leave the coordination room and drop all availability state
    pub async fn stop(&self) -> Result<()> {
        self.directory.stop().await
    }

    /// The shared recorder directory
    pub fn directory(&self) -> Arc<RecorderDirectory> {
        Arc::clone(&self.directory)
    }

    /// Create the recording session for a newly created conference
    pub async fn create_session(
        &self,
        conference: Arc<dyn ConferenceHandle>,
    ) -> Arc<RecordingSession> {
        RecordingSession::new(
            conference,
            Arc::clone(&self.directory),
            Arc::clone(&self.channel),
            Arc::clone(&self.presence),
            self.config.session.clone(),
        )
        .await
    }

    /// Fleet availability counters
    pub fn stats(&self) -> DirectoryStats {
        self.directory.stats()
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    // Core types
    pub use crate::{RecorderConfig, RecorderError, RecordingEngine, Result};

    // Configuration types
    pub use crate::config::{DirectoryConfig, SessionConfig};

    // Directory types
    pub use crate::directory::{
        Availability, DirectoryListener, DirectoryStats, ListenerId, RecorderDirectory,
    };

    // Session types
    pub use crate::session::RecordingSession;

    // External interface types
    pub use crate::conference::{ConferenceHandle, ConferenceMember};
    pub use crate::error::TransportError;
    pub use crate::transport::{ControlChannel, CoordinationRoom, PresencePublisher, RoomEvent};

    // Protocol re-exports
    pub use confrec_proto::{
        AvailabilityStatus, ErrorCondition, MemberAddress, MemberRole, RecorderId,
        RecorderPresence, RecordingAction, RecordingReply, RecordingRequest, RecordingState,
        RecordingStatusPresence, ReplyError, RoomId,
    };
}
