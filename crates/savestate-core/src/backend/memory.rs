//! In-process backend.
//!
//! Holds at most one aggregate in memory. Clones share the same slot, so a
//! caller can keep a handle for inspection after giving the backend to a
//! manager.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::BackendError;
use crate::traits::StorageBackend;

struct Slot<D> {
    stored: Option<D>,
    loads: usize,
    saves: usize,
    failure: Option<String>,
}

/// Keeps the aggregate in memory.
pub struct MemoryBackend<D> {
    slot: Arc<Mutex<Slot<D>>>,
}

impl<D: Clone> MemoryBackend<D> {
    /// An empty backend; the first load reports absence.
    pub fn new() -> Self {
        Self::from_slot(None)
    }

    /// A backend that already holds `data`.
    pub fn with_data(data: D) -> Self {
        Self::from_slot(Some(data))
    }

    fn from_slot(stored: Option<D>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                stored,
                loads: 0,
                saves: 0,
                failure: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<D>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the stored aggregate.
    pub fn stored(&self) -> Option<D> {
        self.lock().stored.clone()
    }

    /// Replace the stored aggregate.
    pub fn set_stored(&self, data: Option<D>) {
        self.lock().stored = data;
    }

    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Make every following load and save fail with `message`, or stop
    /// failing with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        self.lock().failure = message.map(str::to_string);
    }
}

impl<D> Clone for MemoryBackend<D> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<D: Clone> Default for MemoryBackend<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Clone> StorageBackend<D> for MemoryBackend<D> {
    fn load(&mut self) -> Result<Option<D>, BackendError> {
        let mut slot = self.lock();
        if let Some(message) = &slot.failure {
            return Err(BackendError::Other(message.clone()));
        }
        slot.loads += 1;
        Ok(slot.stored.clone())
    }

    fn save(&mut self, data: &D) -> Result<(), BackendError> {
        let mut slot = self.lock();
        if let Some(message) = &slot.failure {
            return Err(BackendError::Other(message.clone()));
        }
        slot.saves += 1;
        slot.stored = Some(data.clone());
        Ok(())
    }
}
