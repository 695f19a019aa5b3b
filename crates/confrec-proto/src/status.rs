use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Recording status of a conference session.
///
/// Also carried by recorder-originated status messages and by the
/// presence extension published into the conference room. `Undefined`
/// doubles as the "no status" sentinel in status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingState {
    /// No availability information at all
    Undefined,

    /// A recorder could be engaged but none is
    Off,

    /// Start acknowledged, waiting for the recorder to go active
    Pending,

    /// The recorder confirmed it is recording
    On,
}

impl RecordingState {
    /// True while a recorder is engaged (`Pending` or `On`).
    pub fn is_active(&self) -> bool {
        matches!(self, RecordingState::Pending | RecordingState::On)
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        RecordingState::Undefined
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Undefined => write!(f, "undefined"),
            RecordingState::Off => write!(f, "off"),
            RecordingState::Pending => write!(f, "pending"),
            RecordingState::On => write!(f, "on"),
        }
    }
}

impl FromStr for RecordingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undefined" => Ok(RecordingState::Undefined),
            "off" => Ok(RecordingState::Off),
            "pending" => Ok(RecordingState::Pending),
            "on" => Ok(RecordingState::On),
            _ => Err(format!("Unknown recording state: {}", s)),
        }
    }
}

/// Availability a recorder advertises about itself in coordination-room
/// presence. Only `Idle` makes a recorder selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    /// Free to take a recording
    Idle,

    /// Currently engaged
    Busy,

    /// Present, but no usable status advertised
    Undefined,
}

impl AvailabilityStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, AvailabilityStatus::Idle)
    }
}

impl Default for AvailabilityStatus {
    fn default() -> Self {
        AvailabilityStatus::Undefined
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityStatus::Idle => write!(f, "idle"),
            AvailabilityStatus::Busy => write!(f, "busy"),
            AvailabilityStatus::Undefined => write!(f, "undefined"),
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(AvailabilityStatus::Idle),
            "busy" => Ok(AvailabilityStatus::Busy),
            "undefined" => Ok(AvailabilityStatus::Undefined),
            _ => Err(format!("Unknown availability status: {}", s)),
        }
    }
}
