use crate::LoadError;
use crate::assets::RawImage;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Outcome of a key the loader is done with.
pub type Claimed = Result<RawImage, LoadError>;

/// Failures nobody asked for are kept up to this count, oldest dropped first.
pub const MAX_FAILURES: usize = 64;

/// Bounded handoff of decoded images from the loader to the owning context.
///
/// Only decoded images count against the capacity. Failures are kept beside
/// them until somebody asks for the key, so a failed key doesn't stay
/// "loading" forever. At most [`MAX_FAILURES`] of them are kept.
#[derive(Debug)]
pub struct ResultBuffer {
    capacity: usize,
    state: Mutex<BufferState>,
    room: Condvar,
}

#[derive(Debug, Default)]
struct BufferState {
    ready: HashMap<String, RawImage>,
    failed: HashMap<String, Failure>,
    next_failure: u64,
    closed: bool,
}

#[derive(Debug)]
struct Failure {
    error: LoadError,
    seq: u64,
}

impl BufferState {
    fn evict_oldest_failure(&mut self) {
        let oldest = self
            .failed
            .iter()
            .min_by_key(|(_, failure)| failure.seq)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.failed.remove(&key);
        }
    }
}

impl ResultBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::default(),
            room: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks while the buffer is full. Returns `false` once it was closed.
    pub fn wait_for_room(&self) -> bool {
        let mut state = self.lock();
        while !state.closed && state.ready.len() >= self.capacity {
            state = self
                .room
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !state.closed
    }

    /// Stores a decoded image. Callers wait for room first; the buffer only has
    /// one producer, so the room can't be taken in between.
    pub fn push(&self, key: String, image: RawImage) {
        let mut state = self.lock();
        debug_assert!(state.ready.len() < self.capacity || state.ready.contains_key(&key));
        state.failed.remove(&key);
        state.ready.insert(key, image);
    }

    pub fn fail(&self, key: String, error: LoadError) {
        let mut state = self.lock();
        state.ready.remove(&key);

        let seq = state.next_failure;
        state.next_failure += 1;
        state.failed.insert(key, Failure { error, seq });

        while state.failed.len() > MAX_FAILURES {
            state.evict_oldest_failure();
        }
        self.room.notify_one();
    }

    /// Takes whatever the loader left for `key`. Never blocks on the loader.
    pub fn try_pop(&self, key: &str) -> Option<Claimed> {
        let mut state = self.lock();
        if let Some(image) = state.ready.remove(key) {
            self.room.notify_one();
            return Some(Ok(image));
        }
        state.failed.remove(key).map(|failure| Err(failure.error))
    }

    /// Drops both the image and a recorded failure of `key`.
    pub fn discard(&self, key: &str) -> bool {
        let mut state = self.lock();
        let image = state.ready.remove(key).is_some();
        let failure = state.failed.remove(key).is_some();
        if image {
            self.room.notify_one();
        }
        image || failure
    }

    /// Drops every entry whose key matches. Returns how many were dropped.
    pub fn discard_where(&self, mut stale: impl FnMut(&str) -> bool) -> usize {
        let mut state = self.lock();
        let before = state.ready.len() + state.failed.len();
        state.ready.retain(|key, _| !stale(key.as_str()));
        state.failed.retain(|key, _| !stale(key.as_str()));
        let dropped = before - state.ready.len() - state.failed.len();
        if dropped > 0 {
            self.room.notify_all();
        }
        dropped
    }

    pub fn contains(&self, key: &str) -> bool {
        let state = self.lock();
        state.ready.contains_key(key) || state.failed.contains_key(key)
    }

    /// Decoded images waiting to be claimed.
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failed_len(&self) -> usize {
        self.lock().failed.len()
    }

    pub fn is_full(&self) -> bool {
        self.lock().ready.len() >= self.capacity
    }

    /// Wakes the loader if it waits for room and makes every later wait return `false`.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.ready.clear();
        state.failed.clear();
        self.room.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
