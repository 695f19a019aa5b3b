//! Recorder directory
//!
//! Tracks recorder availability from coordination-room presence and hands
//! out selections to recording sessions. One directory serves every
//! session of the focus process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use confrec_proto::{RecorderId, RecorderPresence};

use crate::config::DirectoryConfig;
use crate::error::Result;
use crate::transport::{CoordinationRoom, RoomEvent};

/// Directory-side knowledge about a recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Advertised idle and selectable
    Idle,

    /// Present but busy, or with an unknown status
    Busy,

    /// Not present in the coordination room
    Offline,
}

/// Handle for a registered directory listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

/// Availability change callbacks.
///
/// Callbacks run one at a time inside the directory's dispatch region; a
/// callback that blocks stalls availability delivery for every
/// subscriber. Callbacks may call [`RecorderDirectory::select_recorder`]
/// and [`RecorderDirectory::availability`].
#[async_trait]
pub trait DirectoryListener: Send + Sync {
    /// `recorder` advertised itself idle.
    async fn on_recorder_available(&self, recorder: &RecorderId);

    /// `recorder` is present but not selectable.
    async fn on_recorder_unavailable(&self, recorder: &RecorderId);

    /// `recorder` left the room. Subscribers must drop any assignment to
    /// it, not merely avoid selecting it.
    async fn on_recorder_offline(&self, recorder: &RecorderId);
}

/// Aggregate directory counters.
#[derive(Debug, Clone)]
pub struct DirectoryStats {
    pub total: usize,
    pub idle: usize,
    pub busy: usize,
}

enum Change {
    Available,
    Unavailable,
    Offline,
}

/// Shared directory of recorder availability.
pub struct RecorderDirectory {
    config: DirectoryConfig,

    /// Coordination room handle supplied by the host process
    room: Arc<dyn CoordinationRoom>,

    /// Known recorders; an absent identity is equivalent to `Offline`
    table: RwLock<HashMap<RecorderId, Availability>>,

    /// Subscribed sessions, notified inside the dispatch region
    listeners: RwLock<Vec<(ListenerId, Arc<dyn DirectoryListener>)>>,

    /// Serializes table mutation together with listener dispatch
    dispatch: Mutex<()>,

    /// Room event pump, running between `start` and `stop`
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl RecorderDirectory {
    /// Create a new directory over `room`
    pub fn new(config: DirectoryConfig, room: Arc<dyn CoordinationRoom>) -> Self {
        Self {
            config,
            room,
            table: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            dispatch: Mutex::new(()),
            pump: Mutex::new(None),
        }
    }

    /// Join the coordination room and start consuming member events.
    ///
    /// A failed join is logged and leaves the directory empty; there is
    /// no automatic retry.
    pub async fn start(self: Arc<Self>) -> Result<()> {
        let mut events = match self.room.join(&self.config.coordination_room).await {
            Ok(events) => events,
            Err(e) => {
                error!(
                    "Failed to join coordination room {}: {}",
                    self.config.coordination_room, e
                );
                return Ok(());
            }
        };

        info!("Joined coordination room {}", self.config.coordination_room);

        let directory = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                directory.process_event(event).await;
            }
            debug!("Coordination room event stream ended");
        });

        *self.pump.lock().await = Some(handle);
        Ok(())
    }

    /// Leave the coordination room and forget all recorders.
    pub async fn stop(&self) -> Result<()> {
        if let Some(handle) = self.pump.lock().await.take() {
            handle.abort();
        }

        if let Err(e) = self.room.leave(&self.config.coordination_room).await {
            warn!(
                "Failed to leave coordination room {}: {}",
                self.config.coordination_room, e
            );
        }

        self.table.write().clear();
        Ok(())
    }

    async fn process_event(&self, event: RoomEvent) {
        let _dispatch = self.dispatch.lock().await;

        match event {
            RoomEvent::MemberJoined { occupant, presence }
            | RoomEvent::PropertyChanged { occupant, presence } => {
                self.apply_presence(occupant, presence).await;
            }
            RoomEvent::MemberLeft { occupant } => {
                self.table.write().remove(&occupant);
                info!("Recorder offline: {}", occupant);
                self.notify(&occupant, Change::Offline).await;
            }
        }
    }

    async fn apply_presence(&self, occupant: RecorderId, presence: Option<RecorderPresence>) {
        // Occupants without a recorder status payload are not recorders.
        let Some(presence) = presence else {
            debug!("No recorder status in presence of {}", occupant);
            return;
        };

        if presence.is_idle() {
            self.table.write().insert(occupant.clone(), Availability::Idle);
            info!("Recorder available: {}", occupant);
            self.notify(&occupant, Change::Available).await;
        } else {
            self.table.write().insert(occupant.clone(), Availability::Busy);
            info!("Recorder unavailable: {}", occupant);
            self.notify(&occupant, Change::Unavailable).await;
        }
    }

    async fn notify(&self, recorder: &RecorderId, change: Change) {
        let listeners: Vec<Arc<dyn DirectoryListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            match change {
                Change::Available => listener.on_recorder_available(recorder).await,
                Change::Unavailable => listener.on_recorder_unavailable(recorder).await,
                Change::Offline => listener.on_recorder_offline(recorder).await,
            }
        }
    }

    /// Pick any idle recorder.
    ///
    /// Selection is arbitrary and performs no reservation: two sessions
    /// racing to start may pick the same recorder, which then rejects the
    /// second start itself.
    pub fn select_recorder(&self) -> Option<RecorderId> {
        self.table
            .read()
            .iter()
            .find(|(_, availability)| **availability == Availability::Idle)
            .map(|(id, _)| id.clone())
    }

    /// Availability of `recorder`; unknown identities are `Offline`.
    pub fn availability(&self, recorder: &RecorderId) -> Availability {
        self.table
            .read()
            .get(recorder)
            .copied()
            .unwrap_or(Availability::Offline)
    }

    /// Aggregate counters over the known recorders
    pub fn stats(&self) -> DirectoryStats {
        let table = self.table.read();
        let idle = table
            .values()
            .filter(|a| matches!(a, Availability::Idle))
            .count();
        let busy = table
            .values()
            .filter(|a| matches!(a, Availability::Busy))
            .count();

        DirectoryStats {
            total: table.len(),
            idle,
            busy,
        }
    }

    /// Register `listener` for availability changes
    pub fn add_listener(&self, listener: Arc<dyn DirectoryListener>) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.listeners.write().push((id.clone(), listener));
        id
    }

    /// Remove a previously registered listener
    pub fn remove_listener(&self, id: &ListenerId) {
        self.listeners.write().retain(|(listener_id, _)| listener_id != id);
    }
}
