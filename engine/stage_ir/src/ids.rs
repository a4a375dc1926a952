//! Typed indices for sprites and store cells.
//!
//! All three are plain `u32` newtypes. A `SpriteId` indexes the runtime's
//! sprite arena (clones included); `VariableId`/`ListId` index the two cell
//! arenas of the scoped store. Ids are never reused, so a stale id simply
//! dereferences to nothing.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Index into the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of a sprite (original or clone) in the runtime.
    SpriteId
);
define_id!(
    /// Index of a variable cell in the scoped store.
    VariableId
);
define_id!(
    /// Index of a list cell in the scoped store.
    ListId
);
