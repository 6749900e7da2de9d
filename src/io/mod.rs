//! Output adapters for a finished geometry hierarchy.
//!
//! A writer receives the [`Hierarchy`] together with the [`MeshStore`] that
//! holds its vertices, triangles and curve edges.

pub mod vtk;

use std::io::Write;

use crate::hierarchy::Hierarchy;
use crate::mesh::MeshStore;
use crate::mesh_error::IsoGeomError;

/// Trait for writers that serialize a geometry hierarchy.
pub trait HierarchyWriter {
    /// File extension (without the dot) this writer produces.
    fn extension(&self) -> &'static str;

    /// Write `hierarchy` to `writer`.
    fn write<W: Write>(
        &self,
        writer: W,
        store: &MeshStore,
        hierarchy: &Hierarchy,
    ) -> Result<(), IsoGeomError>;
}
