use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::RoomId;

/// What a recording request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingAction {
    Start,
    Stop,
    /// Request without a recognizable action
    Undefined,
}

impl Default for RecordingAction {
    fn default() -> Self {
        RecordingAction::Undefined
    }
}

impl fmt::Display for RecordingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingAction::Start => write!(f, "start"),
            RecordingAction::Stop => write!(f, "stop"),
            RecordingAction::Undefined => write!(f, "undefined"),
        }
    }
}

impl FromStr for RecordingAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(RecordingAction::Start),
            "stop" => Ok(RecordingAction::Stop),
            "undefined" => Ok(RecordingAction::Undefined),
            _ => Err(format!("Unknown recording action: {}", s)),
        }
    }
}

/// Error conditions a reply can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCondition {
    /// Sender is not a member of the room
    Forbidden,

    /// Sender is a member but below moderator
    NotAllowed,

    /// No idle recorder to select
    ServiceUnavailable,

    /// Action not valid for the current session status
    BadRequest,

    /// No reply from the recorder within the wait bound
    RequestTimeout,

    /// The recorder failed without a usable condition
    InternalServerError,
}

impl fmt::Display for ErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCondition::Forbidden => write!(f, "forbidden"),
            ErrorCondition::NotAllowed => write!(f, "not-allowed"),
            ErrorCondition::ServiceUnavailable => write!(f, "service-unavailable"),
            ErrorCondition::BadRequest => write!(f, "bad-request"),
            ErrorCondition::RequestTimeout => write!(f, "request-timeout"),
            ErrorCondition::InternalServerError => write!(f, "internal-server-error"),
        }
    }
}

/// A start/stop request, client-to-session or session-to-recorder.
///
/// The parameters are opaque to the coordination core and forwarded to
/// the recorder exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingRequest {
    pub action: RecordingAction,

    /// Stream identifier for the recorder's output
    pub stream_id: Option<String>,

    /// Room the recorder should join
    pub room: Option<RoomId>,

    /// Entity the recorder should follow while recording
    pub follow_entity: Option<String>,
}

impl RecordingRequest {
    /// Create a start request with no parameters set
    pub fn start() -> Self {
        Self {
            action: RecordingAction::Start,
            stream_id: None,
            room: None,
            follow_entity: None,
        }
    }

    /// Create a stop request
    pub fn stop() -> Self {
        Self {
            action: RecordingAction::Stop,
            stream_id: None,
            room: None,
            follow_entity: None,
        }
    }

    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = Some(stream_id.into());
        self
    }

    pub fn with_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    pub fn with_follow_entity(mut self, entity: impl Into<String>) -> Self {
        self.follow_entity = Some(entity.into());
        self
    }
}

/// Error payload of a failed reply.
///
/// `condition` is `None` when the peer answered with a failure the
/// protocol layer could not classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyError {
    pub condition: Option<ErrorCondition>,
    pub text: Option<String>,
}

impl ReplyError {
    pub fn new(condition: ErrorCondition) -> Self {
        Self {
            condition: Some(condition),
            text: None,
        }
    }

    pub fn with_text(condition: ErrorCondition, text: impl Into<String>) -> Self {
        Self {
            condition: Some(condition),
            text: Some(text.into()),
        }
    }

    /// A failure with no recognizable condition
    pub fn unspecified() -> Self {
        Self {
            condition: None,
            text: None,
        }
    }
}

/// Reply to a recording request. Every request gets exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordingReply {
    /// Positive acknowledgement
    Result,

    /// Failure with an optional typed condition
    Error(ReplyError),
}

impl RecordingReply {
    /// Shorthand for an error reply carrying `condition`
    pub fn error(condition: ErrorCondition) -> Self {
        RecordingReply::Error(ReplyError::new(condition))
    }

    pub fn is_result(&self) -> bool {
        matches!(self, RecordingReply::Result)
    }

    /// Condition of an error reply, if one was given
    pub fn error_condition(&self) -> Option<ErrorCondition> {
        match self {
            RecordingReply::Result => None,
            RecordingReply::Error(error) => error.condition,
        }
    }
}
