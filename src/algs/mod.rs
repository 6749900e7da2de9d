//! Re-export public algorithms.

pub mod imprint;
pub mod matching;
pub mod separate;
pub mod skin;

pub use imprint::{ImprintOpts, ImprintOutcome, imprint_merge};
pub use matching::{CoordIndex, VertexMatches, match_vertices};
pub use separate::separate_components;
pub use skin::{Skin, find_skin};
