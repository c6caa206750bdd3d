use crate::assets::RawImage;
use crate::rendering::cache::realizer::{RealizeError, Realizer, TooLargeErr, UnsupportedFormatErr};
use bon::Builder;
use snafu::ensure;
use std::sync::Arc;
use wgpu::util::{DeviceExt, TextureDataOrder};
use wgpu::{
    Device, Extent3d, Queue, Texture as WgpuTexture, TextureDescriptor, TextureDimension,
    TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
};

#[derive(Debug)]
pub struct GpuTexture {
    pub texture: WgpuTexture,
    pub view: TextureView,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// How a decoded image is uploaded.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct TextureOptions {
    #[builder(default = TextureFormat::Rgba8UnormSrgb)]
    pub format: TextureFormat,
    /// `COPY_DST` is always added for the upload.
    #[builder(default = TextureUsages::TEXTURE_BINDING)]
    pub usage: TextureUsages,
    #[builder(into)]
    pub label: Option<String>,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub fn is_supported(format: TextureFormat) -> bool {
    matches!(
        format,
        TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
    )
}

/// Pixel data of `image` laid out for `format`.
pub fn texel_data(image: RawImage, format: TextureFormat) -> Result<Vec<u8>, RealizeError> {
    ensure!(is_supported(format), UnsupportedFormatErr { format });

    let mut data = image.into_pixels();
    if matches!(
        format,
        TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb
    ) {
        for pixel in data.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }

    Ok(data)
}

/// Uploads images as 2D textures on a wgpu device.
pub struct WgpuRealizer {
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl WgpuRealizer {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl Realizer for WgpuRealizer {
    type Resource = GpuTexture;
    type Options = TextureOptions;

    fn realize(&self, image: RawImage, options: &TextureOptions) -> Result<GpuTexture, RealizeError> {
        let (width, height) = image.dimensions();
        let max = self.device.limits().max_texture_dimension_2d;
        ensure!(
            width <= max && height <= max,
            TooLargeErr { width, height, max }
        );

        let data = texel_data(image, options.format)?;

        let desc = TextureDescriptor {
            label: options.label.as_deref(),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: options.format,
            usage: options.usage | TextureUsages::COPY_DST,
            view_formats: &[],
        };

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &desc,
            TextureDataOrder::LayerMajor,
            &data,
        );
        let view = texture.create_view(&TextureViewDescriptor::default());

        Ok(GpuTexture {
            texture,
            view,
            width,
            height,
            format: options.format,
        })
    }
}
