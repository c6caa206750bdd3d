//! The store that owns every realized texture.
//!
//! Textures live in one of two maps: collectable ones, which the garbage
//! collector drops once the store holds the last handle, and pinned ones,
//! which stay until the store itself goes away.

use crate::assets::directory::{file_key, image_files, resolve_directory};
use crate::assets::{BundledSource, Decoder, ImageDecoder, RawImage, SourceChain};
use crate::error::{DecodeErr, RealizeErr};
use crate::loading::BackgroundLoader;
use crate::rendering::cache::{Realizer, TextureRef};
use crate::{LoadError, StoreConfig};
use dashmap::{DashMap, DashSet};
use log::{debug, error, info, trace, warn};
use snafu::ResultExt;
use std::path::Path;
use std::sync::Arc;

/// Per-call switches of [`TextureStore::load_with`] and [`TextureStore::fetch_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFlags {
    /// `false` pins the texture, the garbage collector will never drop it.
    pub collectable: bool,
    /// Run the garbage collector after a texture was added.
    pub run_gc: bool,
}

impl LoadFlags {
    pub const fn pinned() -> Self {
        Self {
            collectable: false,
            run_gc: true,
        }
    }

    pub const fn without_gc(self) -> Self {
        Self {
            run_gc: false,
            ..self
        }
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        Self {
            collectable: true,
            run_gc: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Collectable textures.
    pub loaded: usize,
    pub pinned: usize,
    /// Keys handed to the loader and not claimed yet.
    pub pending: usize,
    /// Decoded images waiting to be realized.
    pub buffered: usize,
}

/// Caches textures by key and loads missing ones either right away or in the background.
///
/// `load` resolves a key on the calling thread and blocks until the texture
/// exists. `fetch` never blocks: it hands the key to the loader thread and
/// returns `Ok(None)` until a later call finds the decoded image and realizes it.
///
/// Textures are realized only from `load` and `fetch`, so as long as those are
/// called from the context owning the graphics device, the loader thread never
/// touches it.
///
/// ```rust,no_run
/// # use texture_store::{StoreConfig, TextureOptions, TextureStore, WgpuRealizer};
/// # fn frame(device: std::sync::Arc<wgpu::Device>, queue: std::sync::Arc<wgpu::Queue>) -> texture_store::Result<()> {
/// let store = TextureStore::new(StoreConfig::default(), WgpuRealizer::new(device, queue))?;
/// let options = TextureOptions::default();
///
/// // blocks until the texture exists
/// let logo = store.load("assets/logo.png", &options)?;
///
/// // returns right away, call it again next frame
/// if let Some(background) = store.fetch("https://example.com/background.jpg", &options)? {
///     println!("background is {}x{}", background.width, background.height);
/// }
/// # drop(logo);
/// # Ok(())
/// # }
/// ```
pub struct TextureStore<R: Realizer> {
    textures: DashMap<String, TextureRef<R::Resource>>,
    pinned: DashMap<String, TextureRef<R::Resource>>,
    /// Directory entries the loader failed on. `fetch_directory` skips them
    /// until a `load` or `fetch` of the key succeeds.
    failed_entries: DashSet<String>,

    realizer: R,
    sources: Arc<SourceChain>,
    decoder: Arc<dyn Decoder>,
    loader: BackgroundLoader,
    config: StoreConfig,
}

impl<R: Realizer> TextureStore<R> {
    /// A store reading from the standard source chain with nothing bundled.
    pub fn new(config: StoreConfig, realizer: R) -> Result<Self, LoadError> {
        let sources = SourceChain::standard(&config, BundledSource::new());
        let decoder = ImageDecoder::from_config(&config);
        Self::with_parts(config, sources, Arc::new(decoder), realizer)
    }

    pub fn with_parts(
        config: StoreConfig,
        sources: SourceChain,
        decoder: Arc<dyn Decoder>,
        realizer: R,
    ) -> Result<Self, LoadError> {
        let sources = Arc::new(sources);
        let loader = BackgroundLoader::spawn(&config, sources.clone(), decoder.clone())?;

        Ok(TextureStore {
            textures: DashMap::new(),
            pinned: DashMap::new(),
            failed_entries: DashSet::new(),
            realizer,
            sources,
            decoder,
            loader,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn realizer(&self) -> &R {
        &self.realizer
    }

    pub fn load(&self, key: &str, options: &R::Options) -> Result<TextureRef<R::Resource>, LoadError> {
        self.load_with(key, options, LoadFlags::default())
    }

    /// Returns the texture for `key`, loading it on the calling thread if needed.
    ///
    /// An image the loader already decoded for `key` is used instead of
    /// loading it again. If no source can provide the key, the garbage
    /// collector runs anyway before the error is returned.
    pub fn load_with(
        &self,
        key: &str,
        options: &R::Options,
        flags: LoadFlags,
    ) -> Result<TextureRef<R::Resource>, LoadError> {
        self.loader.ensure_running()?;

        if let Some(texture) = self.cached(key, flags) {
            return Ok(texture);
        }

        match self.loader.claim(key) {
            Some(Ok(image)) => return self.realize(key, image, options, flags),
            Some(Err(e)) => debug!("Retrying \"{key}\" after a failed background load: {e}"),
            None => {}
        }

        let image = self.sources.open(key).and_then(|opened| {
            trace!("Decoding \"{key}\" from {}", opened.origin);
            self.decoder
                .decode(&opened.bytes)
                .context(DecodeErr { key })
        });

        match image {
            Ok(image) => self.realize(key, image, options, flags),
            Err(e) => {
                self.garbage_collect();
                error!("Error loading texture \"{key}\": {e}");
                Err(e)
            }
        }
    }

    pub fn fetch(
        &self,
        key: &str,
        options: &R::Options,
    ) -> Result<Option<TextureRef<R::Resource>>, LoadError> {
        self.fetch_with(key, options, LoadFlags::default())
    }

    /// Returns the texture for `key` if it is ready, otherwise queues it for
    /// the loader thread and returns `Ok(None)`.
    ///
    /// Never reads or decodes anything on the calling thread. A key the loader
    /// failed on is reported once as an error; fetching it again queues it anew.
    pub fn fetch_with(
        &self,
        key: &str,
        options: &R::Options,
        flags: LoadFlags,
    ) -> Result<Option<TextureRef<R::Resource>>, LoadError> {
        self.loader.ensure_running()?;

        if let Some(texture) = self.cached(key, flags) {
            return Ok(Some(texture));
        }

        match self.loader.claim(key) {
            Some(Ok(image)) => return self.realize(key, image, options, flags).map(Some),
            Some(Err(e)) => return Err(e),
            None => {}
        }

        if !self.loader.request_unless(key, || self.is_loaded(key))? {
            // another caller may have realized the key since our lookup
            if let Some(texture) = self.cached(key, flags) {
                return Ok(Some(texture));
            }
        }
        Ok(None)
    }

    /// `true` while `key` waits for the loader or sits decoded in its buffer.
    pub fn is_loading(&self, key: &str) -> bool {
        self.loader.is_pending(key) && !self.is_loaded(key)
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.textures.contains_key(key) || self.pinned.contains_key(key)
    }

    pub fn is_pinned(&self, key: &str) -> bool {
        self.pinned.contains_key(key)
    }

    /// Drops every collectable texture nobody outside the store holds anymore.
    ///
    /// Returns how many textures were dropped. Pinned textures are left alone.
    pub fn garbage_collect(&self) -> usize {
        let before = self.textures.len();

        self.textures.retain(|key, texture| {
            if texture.is_unique() {
                debug!("Removing texture \"{key}\" because it is no longer in use");
                false
            } else {
                true
            }
        });

        let removed = before.saturating_sub(self.textures.len());

        let stale = self.loader.discard_where(|key| self.is_loaded(key));
        if stale > 0 {
            debug!("Dropped {stale} loader results for textures that were already loaded");
        }

        removed
    }

    /// Loads every image file in `path` on the calling thread.
    ///
    /// Files that can't be loaded are skipped. The garbage collector runs once
    /// at the end instead of after every file.
    pub fn load_directory(
        &self,
        path: impl AsRef<Path>,
        options: &R::Options,
        collectable: bool,
    ) -> Result<Vec<TextureRef<R::Resource>>, LoadError> {
        self.loader.ensure_running()?;

        let dir = resolve_directory(path.as_ref(), self.config.resource_root.as_deref())?;
        let flags = LoadFlags {
            collectable,
            run_gc: false,
        };

        let mut textures = Vec::new();
        for file in image_files(&dir)? {
            let key = file_key(&file);
            match self.load_with(&key, options, flags) {
                Ok(texture) => textures.push(texture),
                Err(LoadError::ShutdownInProgress) => return Err(LoadError::ShutdownInProgress),
                Err(e) => warn!("Skipping \"{key}\": {e}"),
            }
        }

        self.garbage_collect();
        Ok(textures)
    }

    /// Fetches every image file in `path`.
    ///
    /// All files are queued by the first call. Until each of them is ready the
    /// result is empty, so callers keep polling until it isn't. Files that fail
    /// to load are skipped, in this and every later call, until a `load` or
    /// `fetch` of that file succeeds.
    pub fn fetch_directory(
        &self,
        path: impl AsRef<Path>,
        options: &R::Options,
        collectable: bool,
    ) -> Result<Vec<TextureRef<R::Resource>>, LoadError> {
        self.loader.ensure_running()?;

        let dir = resolve_directory(path.as_ref(), self.config.resource_root.as_deref())?;
        let flags = LoadFlags {
            collectable,
            run_gc: false,
        };

        let mut textures = Vec::new();
        let mut incomplete = false;
        for file in image_files(&dir)? {
            let key = file_key(&file);
            if self.failed_entries.contains(&key) {
                trace!("Skipping \"{key}\", it failed to load before");
                continue;
            }

            match self.fetch_with(&key, options, flags) {
                Ok(Some(texture)) => textures.push(texture),
                Ok(None) => incomplete = true,
                Err(LoadError::ShutdownInProgress) => return Err(LoadError::ShutdownInProgress),
                Err(e) => {
                    warn!("Skipping \"{key}\": {e}");
                    self.failed_entries.insert(key);
                }
            }
        }

        if incomplete {
            return Ok(Vec::new());
        }

        self.garbage_collect();
        Ok(textures)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            loaded: self.textures.len(),
            pinned: self.pinned.len(),
            pending: self.loader.pending_len(),
            buffered: self.loader.buffered_len(),
        }
    }

    pub fn log_status(&self) {
        let stats = self.stats();
        info!(
            "[Texture Store] loaded: {}, pinned: {}, pending: {}, buffered: {}/{}",
            stats.loaded,
            stats.pinned,
            stats.pending,
            stats.buffered,
            self.loader.capacity()
        );
    }

    /// Every realized key, sorted.
    pub fn loaded_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .textures
            .iter()
            .chain(self.pinned.iter())
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Stops the loader thread. Every later call returns
    /// [`LoadError::ShutdownInProgress`]. Also happens on drop.
    pub fn shutdown(&self) {
        self.loader.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.loader.is_shutting_down()
    }

    fn cached(&self, key: &str, flags: LoadFlags) -> Option<TextureRef<R::Resource>> {
        if let Some(texture) = self.pinned.get(key) {
            return Some(texture.value().clone());
        }

        let texture = self.textures.get(key).map(|t| t.value().clone())?;
        if !flags.collectable {
            self.pin(key);
        }
        Some(texture)
    }

    fn pin(&self, key: &str) {
        if let Some((key, texture)) = self.textures.remove(key) {
            trace!("Pinned texture \"{key}\"");
            self.pinned.insert(key, texture);
        }
    }

    fn realize(
        &self,
        key: &str,
        image: RawImage,
        options: &R::Options,
        flags: LoadFlags,
    ) -> Result<TextureRef<R::Resource>, LoadError> {
        let realized = self.realizer.realize(image, options).context(RealizeErr { key });

        let texture = match realized {
            Ok(resource) => TextureRef::new(resource),
            Err(e) => {
                self.loader.settle(key);
                return Err(e);
            }
        };

        if flags.collectable {
            self.textures.insert(key.to_string(), texture.clone());
        } else {
            self.pinned.insert(key.to_string(), texture.clone());
        }
        self.loader.settle(key);
        self.failed_entries.remove(key);

        trace!("Created texture for \"{key}\"");

        if flags.run_gc {
            self.garbage_collect();
        }

        Ok(texture)
    }
}
