use crate::assets::decoder::{DecodeError, InvalidDimensionsErr, PixelCountErr};
use snafu::ensure;

const BYTES_PER_PIXEL: usize = 4;

/// Decoded pixel data that doesn't depend on any graphics API.
///
/// Pixels are tightly packed RGBA8, row-major, top row first. A `RawImage` is
/// moved from the loader thread into the result buffer and from there into
/// exactly one [`Realizer`](crate::Realizer); it is never shared.
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RawImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        ensure!(width > 0 && height > 0, InvalidDimensionsErr { width, height });

        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        ensure!(
            pixels.len() == expected,
            PixelCountErr {
                expected,
                actual: pixels.len()
            }
        );

        Ok(RawImage {
            width,
            height,
            pixels,
        })
    }

    /// A single colored image, handy as a placeholder.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, DecodeError> {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * BYTES_PER_PIXEL).collect();
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_PIXEL as u32
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
