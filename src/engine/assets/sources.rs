//! Byte sources a key can be resolved against.
//!
//! A [`SourceChain`] asks every [`Source`] in order and stops at the first one
//! that can open the key. Every source may fail on its own; a failure never
//! aborts the chain. Only when every source refused the key does the chain
//! report [`LoadError::NotFound`], listing each attempt.

use crate::{LoadError, StoreConfig};
use dashmap::DashMap;
use log::trace;
use snafu::{ResultExt, Snafu};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
#[cfg(feature = "remote")]
use std::time::Duration;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum SourceError {
    #[snafu(display("{reason}"))]
    Unsupported { reason: &'static str },

    #[snafu(display("{}: {source}", path.display()))]
    Io { path: PathBuf, source: io::Error },

    #[snafu(display("No resource named \"{name}\" is bundled"))]
    Unregistered { name: String },

    #[snafu(display("Request to {url} failed: {message}"))]
    Remote { url: String, message: String },

    #[snafu(display("Failed to read the response of {url}: {source}"))]
    RemoteRead { url: String, source: io::Error },
}

/// One failed attempt of a [`SourceChain`].
#[derive(Debug)]
pub struct SourceFailure {
    pub origin: &'static str,
    pub error: SourceError,
}

impl Display for SourceFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.origin, self.error)
    }
}

pub trait Source: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_open(&self, key: &str) -> Result<Vec<u8>, SourceError>;
}

/// Bytes returned by the first source that could open a key.
#[derive(Debug)]
pub struct Opened {
    pub bytes: Vec<u8>,
    pub origin: &'static str,
}

pub struct SourceChain {
    sources: Vec<Box<dyn Source>>,
}

impl SourceChain {
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Local file, bundled resource, packaged asset and, with the `remote`
    /// feature, remote URL, in that order.
    pub fn standard(config: &StoreConfig, bundled: BundledSource) -> Self {
        let chain = Self::empty()
            .with(FileSource)
            .with(bundled)
            .with(AssetDirSource::new(config.asset_root.clone()));

        #[cfg(feature = "remote")]
        let chain = chain.with(UrlSource::new(config.remote_timeout));

        chain
    }

    pub fn with(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn open(&self, key: &str) -> Result<Opened, LoadError> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.try_open(key) {
                Ok(bytes) => {
                    trace!("[{}] Opened \"{key}\" ({} bytes)", source.name(), bytes.len());
                    return Ok(Opened {
                        bytes,
                        origin: source.name(),
                    });
                }
                Err(error) => {
                    trace!("[{}] Couldn't open \"{key}\": {error}", source.name());
                    attempts.push(SourceFailure {
                        origin: source.name(),
                        error,
                    });
                }
            }
        }

        Err(LoadError::NotFound {
            key: key.to_string(),
            attempts,
        })
    }
}

impl Default for SourceChain {
    fn default() -> Self {
        Self::standard(&StoreConfig::default(), BundledSource::new())
    }
}

/// Reads the key as a path on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl Source for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn try_open(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        fs::read(key).context(IoErr { path: key })
    }
}

/// Resources compiled into the application, looked up by name.
///
/// Clones share the same registry, so resources can still be added after the
/// source was handed to a chain.
#[derive(Debug, Clone, Default)]
pub struct BundledSource {
    resources: Arc<DashMap<String, Cow<'static, [u8]>>>,
}

impl BundledSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) {
        self.resources.insert(name.into(), bytes.into());
    }

    pub fn remove(&self, name: &str) -> bool {
        self.resources.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }
}

impl Source for BundledSource {
    fn name(&self) -> &'static str {
        "bundled"
    }

    fn try_open(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        self.resources
            .get(key)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| SourceError::Unregistered {
                name: key.to_string(),
            })
    }
}

/// Reads keys relative to the packaged asset directory.
#[derive(Debug, Clone)]
pub struct AssetDirSource {
    root: PathBuf,
}

impl AssetDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Source for AssetDirSource {
    fn name(&self) -> &'static str {
        "asset"
    }

    fn try_open(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        let relative = Path::new(key);
        if relative.is_absolute() {
            return UnsupportedErr {
                reason: "absolute paths are not asset names",
            }
            .fail();
        }

        let path = self.root.join(relative);
        fs::read(&path).context(IoErr { path })
    }
}

#[cfg(feature = "remote")]
const MAX_REMOTE_BYTES: u64 = 256 * 1024 * 1024;

/// Downloads `http://` and `https://` keys.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct UrlSource {
    agent: ureq::Agent,
}

#[cfg(feature = "remote")]
impl UrlSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn is_url(key: &str) -> bool {
        let lower = key.get(..8).unwrap_or(key).to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

#[cfg(feature = "remote")]
impl Source for UrlSource {
    fn name(&self) -> &'static str {
        "url"
    }

    fn try_open(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        use std::io::Read;

        if !Self::is_url(key) {
            return UnsupportedErr {
                reason: "not an http(s) url",
            }
            .fail();
        }

        let response = self
            .agent
            .get(key)
            .call()
            .map_err(|e| SourceError::Remote {
                url: key.to_string(),
                message: e.to_string(),
            })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_REMOTE_BYTES)
            .read_to_end(&mut bytes)
            .context(RemoteReadErr { url: key })?;

        Ok(bytes)
    }
}
