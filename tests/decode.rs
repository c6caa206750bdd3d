use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use texture_store::assets::{DecodeError, Decoder, ImageDecoder, RawImage};
use texture_store::rendering::cache::{is_supported, texel_data};
use texture_store::wgpu::{TextureFormat, TextureUsages};
use texture_store::{DEFAULT_BUFFER_CAPACITY, RealizeError, StoreConfig, TextureOptions};

fn encode(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

#[test]
fn decodes_to_rgba8() {
    let mut image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
    image.put_pixel(0, 0, Rgba([200, 100, 50, 255]));
    let bytes = encode(image, ImageFormat::Png);

    let decoded = ImageDecoder::new().decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (3, 2));
    assert_eq!(decoded.bytes_per_row(), 12);
    assert_eq!(decoded.byte_size(), 24);
    assert_eq!(&decoded.pixels()[..4], &[200, 100, 50, 255]);
}

#[test]
fn large_images_are_scaled_down_proportionally() {
    let bytes = encode(
        RgbaImage::from_pixel(64, 32, Rgba([9, 9, 9, 255])),
        ImageFormat::Png,
    );

    let decoded = ImageDecoder::new()
        .with_max_dimension(16)
        .decode(&bytes)
        .unwrap();
    assert_eq!(decoded.dimensions(), (16, 8));

    let untouched = ImageDecoder::new()
        .with_max_dimension(64)
        .decode(&bytes)
        .unwrap();
    assert_eq!(untouched.dimensions(), (64, 32));
}

#[test]
fn decoder_follows_the_config() {
    let bytes = encode(
        RgbaImage::from_pixel(40, 40, Rgba([1, 1, 1, 255])),
        ImageFormat::Png,
    );
    let config = StoreConfig::builder().max_dimension(10).build();

    let decoded = ImageDecoder::from_config(&config).decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (10, 10));
}

#[test]
fn garbage_is_an_image_error() {
    let result = ImageDecoder::new().decode(b"not an image at all");
    assert!(matches!(result, Err(DecodeError::Image { .. })));
}

#[test]
fn raw_images_are_validated() {
    assert!(matches!(
        RawImage::new(0, 4, Vec::new()),
        Err(DecodeError::InvalidDimensions {
            width: 0,
            height: 4
        })
    ));
    assert!(matches!(
        RawImage::new(2, 2, vec![0; 15]),
        Err(DecodeError::PixelCount {
            expected: 16,
            actual: 15
        })
    ));

    let solid = RawImage::solid(2, 1, [1, 2, 3, 4]).unwrap();
    assert_eq!(solid.pixels(), &[1, 2, 3, 4, 1, 2, 3, 4]);
}

#[test]
fn bgra_targets_get_swizzled() {
    let image = RawImage::solid(1, 2, [10, 20, 30, 40]).unwrap();

    let rgba = texel_data(image.clone(), TextureFormat::Rgba8UnormSrgb).unwrap();
    assert_eq!(rgba, [10, 20, 30, 40, 10, 20, 30, 40]);

    let bgra = texel_data(image, TextureFormat::Bgra8Unorm).unwrap();
    assert_eq!(bgra, [30, 20, 10, 40, 30, 20, 10, 40]);
}

#[test]
fn unsupported_formats_are_rejected() {
    assert!(is_supported(TextureFormat::Rgba8Unorm));
    assert!(is_supported(TextureFormat::Bgra8UnormSrgb));
    assert!(!is_supported(TextureFormat::R8Unorm));

    let image = RawImage::solid(1, 1, [0; 4]).unwrap();
    assert!(matches!(
        texel_data(image, TextureFormat::Rgba16Float),
        Err(RealizeError::UnsupportedFormat {
            format: TextureFormat::Rgba16Float
        })
    ));
}

#[test]
fn texture_option_defaults() {
    let options = TextureOptions::default();
    assert_eq!(options.format, TextureFormat::Rgba8UnormSrgb);
    assert_eq!(options.usage, TextureUsages::TEXTURE_BINDING);
    assert_eq!(options.label, None);

    let labeled = TextureOptions::builder().label("sky").build();
    assert_eq!(labeled.label.as_deref(), Some("sky"));
}

#[test]
fn store_config_defaults() {
    let config = StoreConfig::default();
    assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    assert_eq!(config.asset_root, PathBuf::from("assets"));
    assert_eq!(config.resource_root, None);
    assert_eq!(config.max_dimension, None);
    assert_eq!(config.thread_name, "texture-store-loader");
    assert_eq!(config.remote_timeout, Duration::from_secs(30));
}
