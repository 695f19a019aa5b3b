//! Recording session
//!
//! One per conference: owns the recording status state machine, the
//! recorder assignment and the presence publication of the current
//! status. All operations on a session are serialized through one
//! exclusion region, including the bounded request/reply round trip to a
//! recorder.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use confrec_proto::{
    ErrorCondition, MemberAddress, MemberRole, RecorderId, RecordingAction, RecordingReply,
    RecordingRequest, RecordingState, RecordingStatusPresence,
};

use crate::conference::ConferenceHandle;
use crate::config::SessionConfig;
use crate::directory::{DirectoryListener, ListenerId, RecorderDirectory};
use crate::transport::{ControlChannel, PresencePublisher};

/// Mutable session state, guarded as one unit.
struct SessionState {
    status: RecordingState,

    /// Engaged recorder; `Some` exactly while `status` is `Pending` or
    /// `On`
    assigned: Option<RecorderId>,
}

/// Per-conference recording coordinator.
pub struct RecordingSession {
    conference: Arc<dyn ConferenceHandle>,
    directory: Arc<RecorderDirectory>,
    channel: Arc<dyn ControlChannel>,
    presence: Arc<dyn PresencePublisher>,
    config: SessionConfig,
    state: Mutex<SessionState>,
    listener: OnceLock<ListenerId>,
}

impl RecordingSession {
    /// Create a session for `conference`, subscribe it to the directory
    /// and publish the initial status.
    pub async fn new(
        conference: Arc<dyn ConferenceHandle>,
        directory: Arc<RecorderDirectory>,
        channel: Arc<dyn ControlChannel>,
        presence: Arc<dyn PresencePublisher>,
        config: SessionConfig,
    ) -> Arc<Self> {
        let status = if directory.select_recorder().is_some() {
            RecordingState::Off
        } else {
            RecordingState::Undefined
        };

        let session = Arc::new(Self {
            conference,
            directory: Arc::clone(&directory),
            channel,
            presence,
            config,
            state: Mutex::new(SessionState {
                status,
                assigned: None,
            }),
            listener: OnceLock::new(),
        });

        let listener = directory.add_listener(Arc::clone(&session) as Arc<dyn DirectoryListener>);
        let _ = session.listener.set(listener);

        session.publish_status(status).await;
        session
    }

    /// Current recording status
    pub async fn status(&self) -> RecordingState {
        self.state.lock().await.status
    }

    /// Identity of the engaged recorder, while one is assigned
    pub async fn assigned_recorder(&self) -> Option<RecorderId> {
        self.state.lock().await.assigned.clone()
    }

    /// Whether the recorder has confirmed it is recording
    pub async fn is_recording(&self) -> bool {
        self.state.lock().await.status == RecordingState::On
    }

    /// Handle a client start/stop request.
    ///
    /// Returns the single reply owed to the requester. The round trip to
    /// the recorder runs while the session's exclusion region is held, so
    /// other operations on this session wait until the reply arrives or
    /// the bound expires.
    pub async fn handle_request(
        &self,
        from: &MemberAddress,
        request: &RecordingRequest,
    ) -> RecordingReply {
        let mut state = self.state.lock().await;

        if let Some(member) = self.conference.find_member(from) {
            info!(
                "Recording request {} from {} (room {})",
                request.action,
                member.contact_address,
                self.conference.room()
            );
        }

        match request.action {
            RecordingAction::Start
                if state.status == RecordingState::Off && state.assigned.is_none() =>
            {
                self.start_recording(&mut state, from, request).await
            }
            RecordingAction::Stop if state.assigned.is_some() && state.status.is_active() => {
                self.stop_recording(&mut state, from).await
            }
            _ => {
                debug!(
                    "Request {} not valid in status {}",
                    request.action, state.status
                );
                RecordingReply::error(ErrorCondition::BadRequest)
            }
        }
    }

    async fn start_recording(
        &self,
        state: &mut SessionState,
        from: &MemberAddress,
        request: &RecordingRequest,
    ) -> RecordingReply {
        if let Some(denied) = self.check_moderator(from) {
            return denied;
        }

        let Some(recorder) = self.directory.select_recorder() else {
            info!("No idle recorder for room {}", self.conference.room());
            return RecordingReply::error(ErrorCondition::ServiceUnavailable);
        };

        // Forward the client's parameters as-is.
        let start = RecordingRequest {
            action: RecordingAction::Start,
            stream_id: request.stream_id.clone(),
            room: request.room.clone(),
            follow_entity: request.follow_entity.clone(),
        };

        info!(
            "Starting recorder {} for room {}",
            recorder,
            self.conference.room()
        );

        match timeout(
            self.config.request_timeout,
            self.channel.request(&recorder, start),
        )
        .await
        {
            Err(_) => {
                warn!(
                    "Recorder {} did not reply within {:?}",
                    recorder, self.config.request_timeout
                );
                RecordingReply::error(ErrorCondition::RequestTimeout)
            }
            Ok(Err(e)) => {
                warn!("Start request to {} failed: {}", recorder, e);
                RecordingReply::error(ErrorCondition::InternalServerError)
            }
            Ok(Ok(RecordingReply::Result)) => {
                state.assigned = Some(recorder);
                self.set_status(state, RecordingState::Pending).await;
                RecordingReply::Result
            }
            Ok(Ok(RecordingReply::Error(error))) => {
                let condition = error
                    .condition
                    .unwrap_or(ErrorCondition::InternalServerError);
                warn!("Recorder {} rejected start: {}", recorder, condition);
                RecordingReply::error(condition)
            }
        }
    }

    async fn stop_recording(&self, state: &mut SessionState, from: &MemberAddress) -> RecordingReply {
        if let Some(denied) = self.check_moderator(from) {
            return denied;
        }

        let Some(recorder) = state.assigned.clone() else {
            return RecordingReply::error(ErrorCondition::BadRequest);
        };

        info!(
            "Stopping recorder {} for room {}",
            recorder,
            self.conference.room()
        );

        match timeout(
            self.config.request_timeout,
            self.channel.request(&recorder, RecordingRequest::stop()),
        )
        .await
        {
            Err(_) => {
                // The assignment is not cleared speculatively.
                warn!(
                    "Recorder {} did not reply to stop within {:?}",
                    recorder, self.config.request_timeout
                );
                RecordingReply::error(ErrorCondition::RequestTimeout)
            }
            Ok(Err(e)) => {
                warn!("Stop request to {} failed: {}", recorder, e);
                RecordingReply::error(ErrorCondition::InternalServerError)
            }
            Ok(Ok(RecordingReply::Result)) => {
                state.assigned = None;
                self.set_status(state, RecordingState::Off).await;
                RecordingReply::Result
            }
            Ok(Ok(RecordingReply::Error(error))) => {
                let condition = error
                    .condition
                    .unwrap_or(ErrorCondition::InternalServerError);
                warn!("Recorder {} rejected stop: {}", recorder, condition);
                RecordingReply::error(condition)
            }
        }
    }

    /// `None` when `from` may control recording; otherwise the reply owed
    /// to the requester.
    fn check_moderator(&self, from: &MemberAddress) -> Option<RecordingReply> {
        let Some(role) = self.conference.role_for(from) else {
            // Only room members may send requests.
            return Some(RecordingReply::error(ErrorCondition::Forbidden));
        };

        if role < MemberRole::Moderator {
            // Moderator permission is required.
            return Some(RecordingReply::error(ErrorCondition::NotAllowed));
        }

        None
    }

    /// Adopt a status reported by the assigned recorder.
    ///
    /// Reports from any other sender are ignored, as is the `Undefined`
    /// no-status sentinel.
    pub async fn handle_recorder_status(&self, from: &RecorderId, reported: RecordingState) {
        let mut state = self.state.lock().await;

        if state.assigned.as_ref() != Some(from) {
            debug!("Ignoring status {} from recorder {}", reported, from);
            return;
        }

        if reported == RecordingState::Undefined {
            return;
        }

        if !reported.is_active() {
            // The recorder ended the recording on its own.
            state.assigned = None;
        }

        self.set_status(&mut state, reported).await;
    }

    /// Best-effort stop of any engaged recorder, then unsubscribe from
    /// the directory. Nothing awaits the stop outcome.
    pub async fn dispose(&self) {
        let mut state = self.state.lock().await;

        if let Some(recorder) = state.assigned.take() {
            info!(
                "Disposing session for room {}, stopping recorder {}",
                self.conference.room(),
                recorder
            );
            if let Err(e) = self.channel.send(&recorder, RecordingRequest::stop()).await {
                warn!("Best-effort stop of {} failed: {}", recorder, e);
            }
        }
        drop(state);

        if let Some(listener) = self.listener.get() {
            self.directory.remove_listener(listener);
        }
    }

    async fn set_status(&self, state: &mut SessionState, status: RecordingState) {
        state.status = status;
        self.publish_status(status).await;
    }

    /// Publish `status` into the conference room presence. Repeated
    /// identical values are republished without suppression.
    async fn publish_status(&self, status: RecordingState) {
        let room = self.conference.room();
        info!("Publishing recording status {} for room {}", status, room);

        if let Err(e) = self
            .presence
            .publish_status(&room, RecordingStatusPresence::new(status))
            .await
        {
            warn!("Failed to publish recording status for {}: {}", room, e);
        }
    }

    /// Recompute `Undefined`/`Off` from directory availability. Only
    /// meaningful while no recorder is assigned.
    async fn refresh_availability(&self, state: &mut SessionState) {
        if self.directory.select_recorder().is_some() {
            if state.status == RecordingState::Undefined {
                info!("Recording enabled for room {}", self.conference.room());
                self.set_status(state, RecordingState::Off).await;
            }
        } else if state.status != RecordingState::Undefined {
            info!("Recording disabled for room {}", self.conference.room());
            self.set_status(state, RecordingState::Undefined).await;
        }
    }
}

#[async_trait]
impl DirectoryListener for RecordingSession {
    async fn on_recorder_available(&self, _recorder: &RecorderId) {
        let mut state = self.state.lock().await;
        if state.assigned.is_some() {
            return;
        }
        self.refresh_availability(&mut state).await;
    }

    async fn on_recorder_unavailable(&self, _recorder: &RecorderId) {
        let mut state = self.state.lock().await;
        if state.assigned.is_some() {
            return;
        }
        self.refresh_availability(&mut state).await;
    }

    async fn on_recorder_offline(&self, recorder: &RecorderId) {
        let mut state = self.state.lock().await;

        if state.assigned.as_ref() == Some(recorder) {
            warn!(
                "Assigned recorder {} went offline (room {})",
                recorder,
                self.conference.room()
            );
            state.assigned = None;
            let next = if self.directory.select_recorder().is_some() {
                RecordingState::Off
            } else {
                RecordingState::Undefined
            };
            self.set_status(&mut state, next).await;
        } else if state.assigned.is_none() {
            self.refresh_availability(&mut state).await;
        }
        // A departure of some other recorder while one is engaged is not
        // ours to act on.
    }
}
