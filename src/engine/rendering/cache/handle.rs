use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Shared handle to a realized texture.
///
/// The [`TextureStore`](crate::TextureStore) keeps one clone of every handle it
/// hands out. Once that clone is the only one left, the texture is no longer in
/// use and the garbage collector may drop it.
pub struct TextureRef<T> {
    inner: Arc<T>,
}

impl<T> TextureRef<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Number of live handles, including the one held by the store.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// `true` if no handle besides this one exists.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.ref_count() <= 1
    }

    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn as_arc(&self) -> &Arc<T> {
        &self.inner
    }
}

impl<T> Clone for TextureRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Deref for TextureRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> AsRef<T> for TextureRef<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl<T: Debug> Debug for TextureRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureRef")
            .field("refs", &self.ref_count())
            .field("texture", &*self.inner)
            .finish()
    }
}
