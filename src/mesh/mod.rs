//! Mesh Store and band-file input.
//!
//! - [`store`]: the single arena owning every vertex, triangle and mesh set
//!   for one run.
//! - [`soup`]: indexed triangle soups and the STL band-file reader.

pub mod soup;
pub mod store;

pub use soup::TriangleSoup;
pub use store::{Edge, MeshSet, MeshStore};
