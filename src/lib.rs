#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
pub mod engine;

pub use engine::*;

pub use ::log;
pub use ::wgpu;
