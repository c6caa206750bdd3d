use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

/// How many decoded images may wait for the owning context before the loader stalls.
pub const DEFAULT_BUFFER_CAPACITY: usize = 5;

/// Runtime configuration of a [`TextureStore`](crate::TextureStore).
///
/// ```rust
/// use texture_store::StoreConfig;
///
/// let config = StoreConfig::builder()
///     .buffer_capacity(8)
///     .max_dimension(4096)
///     .build();
///
/// assert_eq!(config.buffer_capacity, 8);
/// assert_eq!(config.max_dimension, Some(4096));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct StoreConfig {
    /// Bound of the result buffer. Values below 1 are raised to 1.
    #[builder(default = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    /// Directory searched by the packaged asset source.
    #[builder(into, default = PathBuf::from("assets"))]
    pub asset_root: PathBuf,

    /// Fallback root for directory operations when a path doesn't exist as given.
    #[builder(into)]
    pub resource_root: Option<PathBuf>,

    /// Decoded images wider or taller than this get scaled down to fit.
    pub max_dimension: Option<u32>,

    #[builder(into, default = "texture-store-loader".to_string())]
    pub thread_name: String,

    /// Timeout of a single request made by the URL source.
    #[builder(default = Duration::from_secs(30))]
    pub remote_timeout: Duration,
}

impl StoreConfig {
    pub(crate) fn effective_capacity(&self) -> usize {
        self.buffer_capacity.max(1)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
