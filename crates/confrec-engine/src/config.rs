use std::time::Duration;

use serde::{Deserialize, Serialize};

use confrec_proto::RoomId;

/// Recording engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Recorder directory settings
    pub directory: DirectoryConfig,

    /// Per-session settings
    pub session: SessionConfig,
}

/// Recorder directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Shared coordination room where recorders advertise availability
    pub coordination_room: RoomId,
}

/// Recording session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bound on a start/stop request/reply round trip to a recorder
    pub request_timeout: Duration,
}

impl RecorderConfig {
    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<(), String> {
        if self.directory.coordination_room.as_str().is_empty() {
            return Err("coordination_room cannot be empty".to_string());
        }

        if self.session.request_timeout.is_zero() {
            return Err("request_timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            coordination_room: RoomId::new("recorders@conference.local"),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
        }
    }
}
