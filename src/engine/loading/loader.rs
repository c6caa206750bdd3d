use crate::assets::{Decoder, SourceChain};
use crate::error::{DecodeErr, ShutdownInProgressErr, SpawnLoaderErr};
use crate::loading::{Claimed, HandoffQueue, PendingSet, ResultBuffer};
use crate::{LoadError, StoreConfig};
use log::{debug, error, info, trace, warn};
use snafu::{ResultExt, ensure};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

struct LoaderShared {
    queue: HandoffQueue,
    pending: PendingSet,
    buffer: ResultBuffer,
    sources: Arc<SourceChain>,
    decoder: Arc<dyn Decoder>,
}

/// The single thread that resolves and decodes fetched keys.
///
/// The loader only ever writes decoded images (or failures) into its
/// [`ResultBuffer`]. Turning them into textures is left to whoever owns the
/// graphics context, see [`TextureStore`](crate::TextureStore).
pub struct BackgroundLoader {
    shared: Arc<LoaderShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
    shutting_down: AtomicBool,
}

impl BackgroundLoader {
    pub fn spawn(
        config: &StoreConfig,
        sources: Arc<SourceChain>,
        decoder: Arc<dyn Decoder>,
    ) -> Result<Self, LoadError> {
        let shared = Arc::new(LoaderShared {
            queue: HandoffQueue::new(),
            pending: PendingSet::new(),
            buffer: ResultBuffer::new(config.effective_capacity()),
            sources,
            decoder,
        });

        let worker = shared.clone();
        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || worker.run())
            .context(SpawnLoaderErr)?;

        Ok(BackgroundLoader {
            shared,
            thread: Mutex::new(Some(thread)),
            shutting_down: AtomicBool::new(false),
        })
    }

    pub fn ensure_running(&self) -> Result<(), LoadError> {
        ensure!(!self.is_shutting_down(), ShutdownInProgressErr);
        Ok(())
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Hands `key` to the loader thread unless it is already pending.
    ///
    /// Returns `true` if the key was queued by this call.
    pub fn request(&self, key: &str) -> Result<bool, LoadError> {
        self.request_unless(key, || false)
    }

    /// Like [`request`](Self::request), but leaves the key alone if `done`
    /// reports it as taken care of once it is marked pending.
    ///
    /// `settle` clears the pending mark only after the key was taken care of,
    /// so `done` sees every key settled before this call.
    pub fn request_unless(
        &self,
        key: &str,
        done: impl FnOnce() -> bool,
    ) -> Result<bool, LoadError> {
        self.ensure_running()?;

        if !self.shared.pending.insert(key) {
            return Ok(false);
        }

        if done() {
            self.shared.pending.remove(key);
            return Ok(false);
        }

        if !self.shared.queue.push(key.to_string()) {
            self.shared.pending.remove(key);
            return ShutdownInProgressErr.fail();
        }

        trace!("Queued \"{key}\" for loading");
        Ok(true)
    }

    /// Whatever the loader finished for `key`, without waiting for it.
    pub fn claim(&self, key: &str) -> Option<Claimed> {
        self.shared.buffer.try_pop(key)
    }

    /// Marks `key` as taken care of by the owning context.
    ///
    /// If the loader is still working on it, its result gets thrown away.
    pub fn settle(&self, key: &str) {
        self.shared.pending.remove(key);
        self.shared.buffer.discard(key);
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.shared.pending.contains(key)
    }

    pub fn pending_len(&self) -> usize {
        self.shared.pending.len()
    }

    pub fn buffered_len(&self) -> usize {
        self.shared.buffer.len()
    }

    pub fn queued_len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.buffer.capacity()
    }

    /// Drops buffered results whose key matches `stale`.
    pub fn discard_where(&self, stale: impl FnMut(&str) -> bool) -> usize {
        self.shared.buffer.discard_where(stale)
    }

    /// Stops the loader thread and waits for it to exit.
    ///
    /// Wakes the thread from both of its waits, so this returns as soon as a
    /// decode that is already running has finished. Calling it again is a no-op.
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.queue.close();
        self.shared.buffer.close();
        self.shared.pending.clear();

        let thread = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(thread) = thread {
            if thread.join().is_err() {
                error!("Texture loader thread panicked");
            }
        }
    }
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl LoaderShared {
    fn run(&self) {
        info!("Texture loader thread started");

        loop {
            if !self.buffer.wait_for_room() {
                break;
            }

            let Some(key) = self.queue.wait_pop() else {
                break;
            };

            if self.queue.is_closed() {
                break;
            }

            self.process(key);
        }

        info!("Texture loader thread stopped");
    }

    fn process(&self, key: String) {
        if !self.pending.contains(&key) {
            trace!("Skipping \"{key}\", it was settled while queued");
            return;
        }

        let result = self
            .sources
            .open(&key)
            .and_then(|opened| {
                trace!("Decoding \"{key}\" from {}", opened.origin);
                self.decoder
                    .decode(&opened.bytes)
                    .context(DecodeErr { key: key.as_str() })
            });

        // a synchronous load may have realized the key in the meantime
        if !self.pending.contains(&key) {
            debug!("Discarding result for \"{key}\", it isn't pending anymore");
            return;
        }

        match result {
            Ok(image) => {
                trace!(
                    "Decoded \"{key}\" ({}x{})",
                    image.width(),
                    image.height()
                );
                self.buffer.push(key, image);
            }
            Err(e) => {
                warn!("Failed to load \"{key}\": {e}");
                // must be claimable before the key stops pending
                self.buffer.fail(key.clone(), e);
                self.pending.remove(&key);
            }
        }
    }
}
