//! Top-level module for geometry topology abstractions.
//!
//! It includes:
//! - Entity handles for vertices, triangles and mesh sets
//! - The Sieve trait and in-memory implementation used for parent→child links
//! - Typed tag tables
//! - Bands and the volumes realising them

pub mod point;
pub mod sieve;
pub mod tags;
pub mod volume;

pub use point::{EntityId, TriangleId, VertexId};
pub use sieve::{InMemorySieve, Sieve};
pub use tags::{Category, GeomDimension, Sense, TagTables};
pub use volume::{Band, Volume};
