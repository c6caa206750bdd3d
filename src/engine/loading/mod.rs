//! The producer side of the store.
//!
//! Keys travel from a fetching caller through the [`HandoffQueue`] to the
//! [`BackgroundLoader`], which decodes them into the bounded [`ResultBuffer`].
//! The [`PendingSet`] remembers every key on its way, so the same key is never
//! decoded twice at once.

mod handoff;
mod loader;
mod pending;
mod result_buffer;

pub use self::handoff::*;
pub use self::loader::*;
pub use self::pending::*;
pub use self::result_buffer::*;
