//! Strong, zero-cost handles for arena entities.
//!
//! Every vertex, triangle and mesh set in the [`MeshStore`](crate::mesh::MeshStore)
//! is addressed by an opaque identifier wrapping a `NonZeroU64`, so 0 stays
//! free as the "none" sentinel used by the sense tag of unshared surfaces.
//!
//! - [`VertexId`] and [`TriangleId`] address geometric entities.
//! - [`EntityId`] addresses mesh sets: band file sets, surface patches,
//!   curves and volumes. Hierarchy arrows and tag tables are keyed by it.

use std::{fmt, num::NonZeroU64};

use crate::mesh_error::IsoGeomError;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a handle from a raw `u64`.
            ///
            /// # Errors
            /// Returns [`IsoGeomError::InvalidEntityId`] if `raw == 0`.
            #[inline]
            pub fn new(raw: u64) -> Result<Self, IsoGeomError> {
                NonZeroU64::new(raw)
                    .map($name)
                    .ok_or(IsoGeomError::InvalidEntityId)
            }

            /// Returns the raw `u64` value.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.get()).finish()
            }
        }

        /// Prints only the raw integer.
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }
    };
}

handle_type!(
    /// Handle of a vertex in the mesh store.
    VertexId
);
handle_type!(
    /// Handle of a triangle in the mesh store.
    TriangleId
);
handle_type!(
    /// Handle of a mesh set: file set, surface patch, curve or volume.
    EntityId
);

/// Monotonic allocator for one handle space. Handles are never reused, so a
/// removed entity can always be told apart from a live one.
#[derive(Clone, Debug)]
pub(crate) struct HandleAllocator {
    next: NonZeroU64,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self {
            next: NonZeroU64::MIN,
        }
    }
}

impl HandleAllocator {
    pub(crate) fn next_raw(&mut self) -> NonZeroU64 {
        let id = self.next;
        self.next = id.saturating_add(1);
        id
    }

    pub(crate) fn vertex(&mut self) -> VertexId {
        VertexId(self.next_raw())
    }

    pub(crate) fn triangle(&mut self) -> TriangleId {
        TriangleId(self.next_raw())
    }

    pub(crate) fn entity(&mut self) -> EntityId {
        EntityId(self.next_raw())
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(EntityId, u64);
    assert_eq_size!(Option<VertexId>, u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_zero_is_rejected() {
        assert!(matches!(
            EntityId::new(0),
            Err(IsoGeomError::InvalidEntityId)
        ));
        assert!(VertexId::new(0).is_err());
    }

    #[test]
    fn debug_and_display() {
        let v = VertexId::new(7).unwrap();
        assert_eq!(format!("{v:?}"), "VertexId(7)");
        assert_eq!(format!("{v}"), "7");
        let t = TriangleId::new(3).unwrap();
        assert_eq!(format!("{t:?}"), "TriangleId(3)");
    }

    #[test]
    fn allocator_is_dense_and_never_reuses() {
        let mut alloc = HandleAllocator::default();
        let a = alloc.entity();
        let b = alloc.entity();
        let c = alloc.entity();
        assert_eq!((a.get(), b.get(), c.get()), (1, 2, 3));
        assert!(a < b && b < c);
    }

    #[test]
    fn json_is_the_raw_integer() {
        let e = EntityId::new(123).unwrap();
        let s = serde_json::to_string(&e).unwrap();
        assert_eq!(s, "123");
    }
}
