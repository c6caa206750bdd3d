#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};
use texture_store::assets::{ImageDecoder, RawImage, Source, SourceChain, SourceError};
use texture_store::{
    LoadError, RealizeError, Realizer, StoreConfig, TextureRef, TextureStore,
};

pub const TIMEOUT: Duration = Duration::from_secs(10);

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeTexture {
    pub width: u32,
    pub height: u32,
    pub first_pixel: [u8; 4],
}

/// Stands in for a GPU device. Counts how often it was asked to create something.
#[derive(Debug, Default)]
pub struct FakeRealizer {
    pub realized: AtomicUsize,
    pub reject: bool,
}

impl FakeRealizer {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.realized.load(Ordering::SeqCst)
    }
}

impl Realizer for FakeRealizer {
    type Resource = FakeTexture;
    type Options = ();

    fn realize(&self, image: RawImage, _options: &()) -> Result<FakeTexture, RealizeError> {
        if self.reject {
            return Err(RealizeError::Rejected {
                reason: "device lost".to_string(),
            });
        }

        self.realized.fetch_add(1, Ordering::SeqCst);

        let pixels = image.pixels();
        Ok(FakeTexture {
            width: image.width(),
            height: image.height(),
            first_pixel: [pixels[0], pixels[1], pixels[2], pixels[3]],
        })
    }
}

#[derive(Default)]
struct Gate {
    closed: Mutex<bool>,
    changed: Condvar,
}

#[derive(Default)]
struct CountingInner {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    gate: Gate,
}

/// In-memory source that remembers how often each key was asked for.
///
/// While the gate is closed, every lookup blocks.
#[derive(Clone)]
pub struct CountingSource {
    name: &'static str,
    inner: Arc<CountingInner>,
}

impl CountingSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::default(),
        }
    }

    pub fn with_image(self, key: &str) -> Self {
        self.insert(key, png_bytes(2, 2, [10, 20, 30, 255]));
        self
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.inner
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes);
    }

    pub fn calls(&self, key: &str) -> usize {
        self.inner
            .calls
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.inner.total.load(Ordering::SeqCst)
    }

    pub fn close_gate(&self) {
        *self.inner.gate.closed.lock().unwrap() = true;
    }

    pub fn open_gate(&self) {
        *self.inner.gate.closed.lock().unwrap() = false;
        self.inner.gate.changed.notify_all();
    }
}

impl Source for CountingSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_open(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        {
            let mut closed = self.inner.gate.closed.lock().unwrap();
            while *closed {
                closed = self.inner.gate.changed.wait(closed).unwrap();
            }
        }

        self.inner.total.fetch_add(1, Ordering::SeqCst);
        *self
            .inner
            .calls
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default() += 1;

        self.inner
            .entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(SourceError::Unregistered {
                name: key.to_string(),
            })
    }
}

pub fn store_with(chain: SourceChain, config: StoreConfig) -> TextureStore<FakeRealizer> {
    init_logger();
    TextureStore::with_parts(
        config,
        chain,
        Arc::new(ImageDecoder::new()),
        FakeRealizer::default(),
    )
    .unwrap()
}

pub fn store_from(source: &CountingSource) -> TextureStore<FakeRealizer> {
    store_with(
        SourceChain::empty().with(source.clone()),
        StoreConfig::default(),
    )
}

pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < TIMEOUT {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Keeps fetching until the loader delivered `key` one way or the other.
pub fn fetch_until_done(
    store: &TextureStore<FakeRealizer>,
    key: &str,
) -> Result<TextureRef<FakeTexture>, LoadError> {
    let start = Instant::now();
    loop {
        if let Some(texture) = store.fetch(key, &())? {
            return Ok(texture);
        }
        assert!(
            start.elapsed() < TIMEOUT,
            "\"{key}\" was never delivered by the loader"
        );
        std::thread::sleep(Duration::from_millis(2));
    }
}
