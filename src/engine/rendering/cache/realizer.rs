use crate::assets::RawImage;
use snafu::Snafu;
use wgpu::TextureFormat;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum RealizeError {
    #[snafu(display("Unsupported texture format {format:?}"))]
    UnsupportedFormat { format: TextureFormat },

    #[snafu(display("A {width}x{height} texture exceeds the device limit of {max}"))]
    TooLarge { width: u32, height: u32, max: u32 },

    #[snafu(display("{reason}"))]
    Rejected { reason: String },
}

/// Turns decoded images into textures of some graphics API.
///
/// Realizing may only happen on the context that owns the graphics device. The
/// store therefore calls this exclusively from `load` and `fetch`, never from
/// its loader thread.
pub trait Realizer {
    type Resource;
    type Options;

    fn realize(
        &self,
        image: RawImage,
        options: &Self::Options,
    ) -> Result<Self::Resource, RealizeError>;
}
