//! In-memory stand-ins for the store and the platform, used by tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::errors::{StorageError, SyncError};
use crate::domain::entities::{BotState, CommandSpec};
use crate::domain::traits::{CommandSync, StateStore};

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<BotState>,
    saves: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: BotState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> BotState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<BotState, StorageError> {
        Ok(self.persisted())
    }

    async fn save(&self, state: &BotState) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Persistence {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        // Yield so concurrent writers get a chance to interleave
        tokio::task::yield_now().await;
        *self.state.lock().unwrap() = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSync {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sync = Self::default();
        sync.fail.store(true, Ordering::SeqCst);
        sync
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandSync for FakeSync {
    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<usize, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::Rejected {
                status: 403,
                body: "Missing Access".to_string(),
            });
        }
        Ok(commands.len())
    }
}
