//! Skin (open boundary) of a triangle patch.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::mesh::store::{Edge, edge};
use crate::mesh::MeshStore;
use crate::mesh_error::IsoGeomError;
use crate::topology::point::{TriangleId, VertexId};

/// Edges used by exactly one triangle of a patch, and their vertices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Skin {
    pub vertices: BTreeSet<VertexId>,
    pub edges: BTreeSet<Edge>,
}

impl Skin {
    /// True when the patch is closed.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Computes the skin of `tris`.
///
/// Non-manifold edges (three or more incident triangles) are interior.
pub fn find_skin<'a, I>(store: &MeshStore, tris: I) -> Result<Skin, IsoGeomError>
where
    I: IntoIterator<Item = &'a TriangleId>,
{
    let mut all_edges = Vec::new();
    for &t in tris {
        let [a, b, c] = store.connectivity(t)?;
        all_edges.extend([edge(a, b), edge(b, c), edge(c, a)]);
    }
    let edges: BTreeSet<Edge> = all_edges
        .into_iter()
        .counts()
        .into_iter()
        .filter(|&(_, n)| n == 1)
        .map(|(e, _)| e)
        .collect();
    let vertices = edges.iter().flatten().copied().collect();
    Ok(Skin { vertices, edges })
}
