mod handle;
mod realizer;
mod texture;
mod texture_store;

pub use self::handle::*;
pub use self::realizer::*;
pub use self::texture::*;
pub use self::texture_store::*;
