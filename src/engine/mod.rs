pub mod assets;
pub mod config;
pub mod error;
pub mod loading;
pub mod rendering;

pub use self::config::*;
pub use self::error::*;
pub use self::rendering::cache::{
    GpuTexture, LoadFlags, RealizeError, Realizer, StoreStats, TextureOptions, TextureRef,
    TextureStore, WgpuRealizer,
};
