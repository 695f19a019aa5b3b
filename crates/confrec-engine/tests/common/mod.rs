//! Common Test Helpers for Recording Engine Testing
//!
//! In-memory stand-ins for the messaging transport, the coordination
//! room and the owning conference, plus a fixture that wires a real
//! directory to them. The room event pump runs asynchronously, so the
//! helpers wait on observable state rather than on event delivery.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use confrec_engine::prelude::*;

/// Initialize test logging once; respects RUST_LOG.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Session config with a short reply bound so timeout paths are fast.
pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        request_timeout: Duration::from_millis(100),
    }
}

/// Scripted behavior for the next recorder request.
pub enum ReplyScript {
    Reply(RecordingReply),
    /// Never reply; forces the caller's wait bound to expire
    Hang,
    /// Fail at the transport level
    Fail,
}

/// Control channel that records requests and replies from a script
/// queue. An empty queue acknowledges every request.
pub struct MockChannel {
    scripts: Mutex<VecDeque<ReplyScript>>,
    requests: Mutex<Vec<(RecorderId, RecordingRequest)>>,
    sent: Mutex<Vec<(RecorderId, RecordingRequest)>>,
    fail_sends: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        })
    }

    pub fn script_reply(&self, reply: RecordingReply) {
        self.scripts.lock().push_back(ReplyScript::Reply(reply));
    }

    pub fn script_hang(&self) {
        self.scripts.lock().push_back(ReplyScript::Hang);
    }

    pub fn script_failure(&self) {
        self.scripts.lock().push_back(ReplyScript::Fail);
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Request/reply exchanges seen so far
    pub fn requests(&self) -> Vec<(RecorderId, RecordingRequest)> {
        self.requests.lock().clone()
    }

    /// One-way sends seen so far
    pub fn sent(&self) -> Vec<(RecorderId, RecordingRequest)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ControlChannel for MockChannel {
    async fn request(
        &self,
        to: &RecorderId,
        request: RecordingRequest,
    ) -> std::result::Result<RecordingReply, TransportError> {
        self.requests.lock().push((to.clone(), request));

        let script = self.scripts.lock().pop_front();
        match script {
            Some(ReplyScript::Reply(reply)) => Ok(reply),
            Some(ReplyScript::Hang) => std::future::pending().await,
            Some(ReplyScript::Fail) => Err(TransportError::Closed),
            None => Ok(RecordingReply::Result),
        }
    }

    async fn send(
        &self,
        to: &RecorderId,
        request: RecordingRequest,
    ) -> std::result::Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send("send refused".to_string()));
        }
        self.sent.lock().push((to.clone(), request));
        Ok(())
    }
}

/// Coordination room whose member events are emitted by the test.
pub struct MockRoom {
    sender: Mutex<Option<mpsc::Sender<RoomEvent>>>,
    refuse_join: AtomicBool,
    left: AtomicBool,
}

impl MockRoom {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sender: Mutex::new(None),
            refuse_join: AtomicBool::new(false),
            left: AtomicBool::new(false),
        })
    }

    /// Make the next join attempt fail
    pub fn refuse_join(&self) {
        self.refuse_join.store(true, Ordering::SeqCst);
    }

    pub fn has_left(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }

    /// Emit a member event into the joined room
    pub async fn emit(&self, event: RoomEvent) {
        let sender = self.sender.lock().clone();
        let sender = sender.expect("room has not been joined");
        sender.send(event).await.expect("event pump is gone");
    }
}

#[async_trait]
impl CoordinationRoom for MockRoom {
    async fn join(&self, _room: &RoomId) -> std::result::Result<mpsc::Receiver<RoomEvent>, TransportError> {
        if self.refuse_join.load(Ordering::SeqCst) {
            return Err(TransportError::Room("room unavailable".to_string()));
        }

        let (tx, rx) = mpsc::channel(64);
        *self.sender.lock() = Some(tx);
        Ok(rx)
    }

    async fn leave(&self, _room: &RoomId) -> std::result::Result<(), TransportError> {
        self.left.store(true, Ordering::SeqCst);
        *self.sender.lock() = None;
        Ok(())
    }
}

/// Presence publisher that records every published status.
pub struct MockPresence {
    published: Mutex<Vec<(RoomId, RecordingState)>>,
}

impl MockPresence {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            published: Mutex::new(Vec::new()),
        })
    }

    /// Statuses published so far, in order
    pub fn published(&self) -> Vec<RecordingState> {
        self.published.lock().iter().map(|(_, s)| *s).collect()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }
}

#[async_trait]
impl PresencePublisher for MockPresence {
    async fn publish_status(
        &self,
        room: &RoomId,
        status: RecordingStatusPresence,
    ) -> std::result::Result<(), TransportError> {
        self.published.lock().push((room.clone(), status.status));
        Ok(())
    }
}

/// Conference with a fixed room and a mutable member list.
pub struct MockConference {
    room: RoomId,
    members: Mutex<HashMap<MemberAddress, ConferenceMember>>,
}

impl MockConference {
    pub fn new(room: &str) -> Arc<Self> {
        Arc::new(Self {
            room: RoomId::new(room),
            members: Mutex::new(HashMap::new()),
        })
    }

    /// Add a member and return the room address it acts under
    pub fn add_member(&self, nick: &str, role: MemberRole) -> MemberAddress {
        let address = MemberAddress::new(format!("{}/{}", self.room, nick));
        let member = ConferenceMember {
            address: address.clone(),
            contact_address: format!("{}@example.com", nick),
            role,
        };
        self.members.lock().insert(address.clone(), member);
        address
    }
}

impl ConferenceHandle for MockConference {
    fn room(&self) -> RoomId {
        self.room.clone()
    }

    fn find_member(&self, address: &MemberAddress) -> Option<ConferenceMember> {
        self.members.lock().get(address).cloned()
    }

    fn role_for(&self, address: &MemberAddress) -> Option<MemberRole> {
        self.members.lock().get(address).map(|m| m.role)
    }
}

/// A started directory wired to mock collaborators.
pub struct EngineFixture {
    pub room: Arc<MockRoom>,
    pub channel: Arc<MockChannel>,
    pub presence: Arc<MockPresence>,
    pub directory: Arc<RecorderDirectory>,
    sync_counter: AtomicU64,
}

impl EngineFixture {
    pub async fn start() -> Self {
        init_logging();

        let room = MockRoom::new();
        let directory = Arc::new(RecorderDirectory::new(
            DirectoryConfig::default(),
            Arc::clone(&room) as Arc<dyn CoordinationRoom>,
        ));
        Arc::clone(&directory).start().await.unwrap();

        Self {
            room,
            channel: MockChannel::new(),
            presence: MockPresence::new(),
            directory,
            sync_counter: AtomicU64::new(0),
        }
    }

    /// Fixture whose directory failed to join the coordination room.
    pub async fn start_with_unjoinable_room() -> Self {
        init_logging();

        let room = MockRoom::new();
        room.refuse_join();
        let directory = Arc::new(RecorderDirectory::new(
            DirectoryConfig::default(),
            Arc::clone(&room) as Arc<dyn CoordinationRoom>,
        ));
        Arc::clone(&directory).start().await.unwrap();

        Self {
            room,
            channel: MockChannel::new(),
            presence: MockPresence::new(),
            directory,
            sync_counter: AtomicU64::new(0),
        }
    }

    pub async fn create_session(&self, conference: Arc<MockConference>) -> Arc<RecordingSession> {
        RecordingSession::new(
            conference as Arc<dyn ConferenceHandle>,
            Arc::clone(&self.directory),
            Arc::clone(&self.channel) as Arc<dyn ControlChannel>,
            Arc::clone(&self.presence) as Arc<dyn PresencePublisher>,
            test_session_config(),
        )
        .await
    }

    /// Bring a recorder into the coordination room advertising idle
    pub async fn add_idle_recorder(&self, name: &str) -> RecorderId {
        let id = RecorderId::new(format!("{}@recorders.example.com", name));
        self.room
            .emit(RoomEvent::MemberJoined {
                occupant: id.clone(),
                presence: Some(RecorderPresence::idle()),
            })
            .await;
        self.wait_for_availability(&id, Availability::Idle).await;
        id
    }

    /// Flip a recorder's advertised status to busy
    pub async fn set_recorder_busy(&self, id: &RecorderId) {
        self.room
            .emit(RoomEvent::PropertyChanged {
                occupant: id.clone(),
                presence: Some(RecorderPresence::busy()),
            })
            .await;
        self.wait_for_availability(id, Availability::Busy).await;
    }

    /// Take a recorder out of the coordination room
    pub async fn remove_recorder(&self, id: &RecorderId) {
        self.room
            .emit(RoomEvent::MemberLeft {
                occupant: id.clone(),
            })
            .await;
        self.wait_for_availability(id, Availability::Offline).await;
    }

    /// Wait until the directory reflects `expected` for `id`
    pub async fn wait_for_availability(&self, id: &RecorderId, expected: Availability) {
        for _ in 0..400 {
            if self.directory.availability(id) == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("recorder {} never became {:?}", id, expected);
    }

    /// Wait until every previously emitted event has been fully
    /// dispatched. Works by pushing a busy marker through the serialized
    /// pump and waiting for it to land.
    pub async fn sync(&self) {
        let n = self.sync_counter.fetch_add(1, Ordering::SeqCst);
        let marker = RecorderId::new(format!("sync-{}@recorders.example.com", n));
        self.room
            .emit(RoomEvent::MemberJoined {
                occupant: marker.clone(),
                presence: Some(RecorderPresence::busy()),
            })
            .await;
        self.wait_for_availability(&marker, Availability::Busy).await;
    }
}

/// Wait until the session reports `expected`
pub async fn wait_for_status(session: &Arc<RecordingSession>, expected: RecordingState) {
    for _ in 0..400 {
        if session.status().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session never reached status {}", expected);
}
