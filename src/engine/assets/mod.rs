//! The CPU side of the store: where bytes come from and how they become images.
//!
//! Keys are resolved through a [`SourceChain`], the bytes are turned into a
//! [`RawImage`] by a [`Decoder`], and only then handed to the rendering side,
//! which owns everything GPU related. None of the types in here touch a
//! graphics API, so all of them may be used from the loader thread.
//!
//! ```rust
//! use texture_store::assets::{BundledSource, FileSource, SourceChain};
//!
//! static LOGO: &[u8] = &[0x89, b'P', b'N', b'G'];
//!
//! let chain = SourceChain::empty()
//!     .with(FileSource)
//!     .with(BundledSource::new().with("logo", LOGO));
//!
//! let opened = chain.open("logo").unwrap();
//! assert_eq!(opened.origin, "bundled");
//! ```

pub mod directory;

mod decoder;
mod raw_image;
mod sources;

pub use self::decoder::*;
pub use self::raw_image::*;
pub use self::sources::*;
