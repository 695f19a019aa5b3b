use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Participant role within a conference room, ordered from least to most
/// privileged. Starting or stopping a recording requires at least
/// `Moderator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemberRole {
    Visitor,
    Participant,
    Moderator,
    Owner,
}

impl MemberRole {
    /// Whether this role may control recording
    pub fn can_control_recording(&self) -> bool {
        *self >= MemberRole::Moderator
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Visitor => write!(f, "visitor"),
            MemberRole::Participant => write!(f, "participant"),
            MemberRole::Moderator => write!(f, "moderator"),
            MemberRole::Owner => write!(f, "owner"),
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visitor" => Ok(MemberRole::Visitor),
            "participant" => Ok(MemberRole::Participant),
            "moderator" => Ok(MemberRole::Moderator),
            "owner" => Ok(MemberRole::Owner),
            _ => Err(format!("Unknown member role: {}", s)),
        }
    }
}
