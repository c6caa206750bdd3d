//! The GPU side of the store.
//!
//! Decoded images only become textures here, through a [`Realizer`](cache::Realizer).
//! The [`TextureStore`](cache::TextureStore) keeps them by key and hands out
//! [`TextureRef`](cache::TextureRef)s. A texture stays cached for as long as
//! someone outside the store holds one of those handles, or forever if it was
//! pinned.

pub mod cache;
