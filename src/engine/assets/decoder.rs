use crate::StoreConfig;
use crate::assets::RawImage;
use image::imageops::FilterType;
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum DecodeError {
    #[snafu(display("Unreadable image data: {source}"))]
    Image { source: image::ImageError },

    #[snafu(display("Cannot use an empty image: {width}x{height}"))]
    InvalidDimensions { width: u32, height: u32 },

    #[snafu(display("Expected {expected} bytes of pixel data, got {actual}"))]
    PixelCount { expected: usize, actual: usize },
}

/// Turns the bytes handed out by a [`Source`](crate::assets::Source) into a [`RawImage`].
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<RawImage, DecodeError>;
}

/// Decodes every format the `image` crate understands into RGBA8.
#[derive(Debug, Clone, Default)]
pub struct ImageDecoder {
    max_dimension: Option<u32>,
}

impl ImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
        }
    }

    /// Scale images down so neither side exceeds `max`, keeping the aspect ratio.
    pub fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = Some(max.max(1));
        self
    }
}

impl Decoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawImage, DecodeError> {
        let mut image = image::load_from_memory(bytes).context(ImageErr)?;

        if let Some(max) = self.max_dimension {
            if image.width() > max || image.height() > max {
                image = image.resize(max, max, FilterType::Triangle);
            }
        }

        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();

        RawImage::new(width, height, rgba.into_raw())
    }
}
