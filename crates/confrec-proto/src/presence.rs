use serde::{Deserialize, Serialize};

use crate::status::{AvailabilityStatus, RecordingState};

/// Presence extension a recorder publishes about itself in the shared
/// coordination room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderPresence {
    pub status: AvailabilityStatus,
}

impl RecorderPresence {
    pub fn new(status: AvailabilityStatus) -> Self {
        Self { status }
    }

    pub fn idle() -> Self {
        Self::new(AvailabilityStatus::Idle)
    }

    pub fn busy() -> Self {
        Self::new(AvailabilityStatus::Busy)
    }

    pub fn is_idle(&self) -> bool {
        self.status.is_idle()
    }
}

/// Presence extension a session publishes into its conference room so
/// participants can observe the recording status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingStatusPresence {
    pub status: RecordingState,
}

impl RecordingStatusPresence {
    pub fn new(status: RecordingState) -> Self {
        Self { status }
    }
}
