//! # isogeom
//!
//! isogeom turns per-band isovolume surface meshes into a watertight
//! volume/surface/curve geometry hierarchy.
//!
//! An upstream contouring stage writes one triangle mesh per isovalue band.
//! Adjacent bands meet along coincident surfaces that each band carries its
//! own copy of. This crate:
//! - separates every band mesh into connected surface patches,
//! - matches coincident vertices of adjacent bands within a tolerance,
//! - replaces each coincident pair of patches with one shared surface and
//!   stitches the neighbouring triangles onto it,
//! - extracts the open boundary of shared surfaces as curves,
//! - tags every entity with dimension, category, global id, value and sense.
//!
//! ## Determinism
//!
//! Handles are allocated monotonically and all entity collections iterate in
//! handle order, so the same input always yields the same hierarchy.
//!
//! ## Logging
//!
//! Progress is reported through the [`log`] facade. The library never
//! installs a logger.

pub mod algs;
pub mod config;
pub mod hierarchy;
pub mod io;
pub mod levels;
pub mod mesh;
pub mod mesh_error;
pub mod pipeline;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::imprint::{ImprintOpts, ImprintOutcome, imprint_merge};
    pub use crate::algs::matching::{CoordIndex, match_vertices};
    pub use crate::algs::separate::separate_components;
    pub use crate::algs::skin::find_skin;
    pub use crate::config::GeometryOpts;
    pub use crate::hierarchy::{Hierarchy, build_hierarchy};
    pub use crate::io::HierarchyWriter;
    pub use crate::io::vtk::VtkWriter;
    pub use crate::levels::{LevelMode, Levels};
    pub use crate::mesh::{MeshStore, TriangleSoup};
    pub use crate::mesh_error::{IsoGeomError, Warning};
    pub use crate::pipeline::IsoGeometry;
    pub use crate::topology::point::{EntityId, TriangleId, VertexId};
    pub use crate::topology::sieve::{InMemorySieve, Sieve};
    pub use crate::topology::tags::{Category, GeomDimension, Sense, TagTables};
    pub use crate::topology::volume::{Band, Volume};
}
