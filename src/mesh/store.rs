//! In-memory indexed mesh: the arena behind every patch, curve and volume.
//!
//! Vertices and triangles are shared by handle among all mesh sets that use
//! them, so rewriting a triangle's connectivity is visible to every set that
//! holds the triangle. Reads of a removed entity fail with
//! [`IsoGeomError::StaleReference`] instead of returning empty data.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::mesh::soup::TriangleSoup;
use crate::mesh_error::{EntityKind, IsoGeomError};
use crate::topology::point::{EntityId, HandleAllocator, TriangleId, VertexId};

/// Undirected edge stored with its smaller vertex first.
pub type Edge = [VertexId; 2];

/// Builds the canonical (sorted) form of the edge `a`-`b`.
#[inline]
pub fn edge(a: VertexId, b: VertexId) -> Edge {
    if a <= b { [a, b] } else { [b, a] }
}

/// Entity membership of one mesh set. Sets never own geometry; they only
/// reference store entities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshSet {
    vertices: BTreeSet<VertexId>,
    triangles: BTreeSet<TriangleId>,
    edges: BTreeSet<Edge>,
}

impl MeshSet {
    pub fn vertices(&self) -> &BTreeSet<VertexId> {
        &self.vertices
    }

    pub fn triangles(&self) -> &BTreeSet<TriangleId> {
        &self.triangles
    }

    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty() && self.edges.is_empty()
    }
}

/// Arena of vertices, triangles and mesh sets for one run.
#[derive(Clone, Debug, Default)]
pub struct MeshStore {
    vertex_ids: HandleAllocator,
    triangle_ids: HandleAllocator,
    set_ids: HandleAllocator,
    vertices: BTreeMap<VertexId, [f64; 3]>,
    triangles: BTreeMap<TriangleId, [VertexId; 3]>,
    /// Upward adjacency: vertex -> triangles referencing it.
    vertex_triangles: BTreeMap<VertexId, BTreeSet<TriangleId>>,
    sets: BTreeMap<EntityId, MeshSet>,
}

fn stale_vertex(v: VertexId) -> IsoGeomError {
    IsoGeomError::StaleReference {
        kind: EntityKind::Vertex,
        id: v.get(),
    }
}

fn stale_triangle(t: TriangleId) -> IsoGeomError {
    IsoGeomError::StaleReference {
        kind: EntityKind::Triangle,
        id: t.get(),
    }
}

fn stale_set(s: EntityId) -> IsoGeomError {
    IsoGeomError::StaleReference {
        kind: EntityKind::Set,
        id: s.get(),
    }
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads one band's triangle soup into a fresh file set.
    ///
    /// Only vertices referenced by a triangle enter the store. Triangles that
    /// repeat a vertex are dropped.
    ///
    /// # Errors
    /// - [`IsoGeomError::EmptyMesh`] if the soup has no usable triangle.
    /// - [`IsoGeomError::MalformedMesh`] for fewer than 3 vertices, an index
    ///   out of range or a non-finite coordinate.
    pub fn load_soup(
        &mut self,
        band: usize,
        soup: &TriangleSoup,
    ) -> Result<EntityId, IsoGeomError> {
        if soup.faces.is_empty() {
            return Err(IsoGeomError::EmptyMesh { band });
        }
        if soup.vertices.len() < 3 {
            return Err(IsoGeomError::MalformedMesh {
                band,
                details: format!("{} vertices, need at least 3", soup.vertices.len()),
            });
        }
        for (i, p) in soup.vertices.iter().enumerate() {
            if !p.iter().all(|c| c.is_finite()) {
                return Err(IsoGeomError::MalformedMesh {
                    band,
                    details: format!("vertex {i} has non-finite coordinate {p:?}"),
                });
            }
        }
        for (i, face) in soup.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&idx| idx >= soup.vertices.len()) {
                return Err(IsoGeomError::MalformedMesh {
                    band,
                    details: format!(
                        "face {i} references vertex {bad} of {}",
                        soup.vertices.len()
                    ),
                });
            }
        }

        let mut handles: Vec<Option<VertexId>> = vec![None; soup.vertices.len()];
        let mut set = MeshSet::default();
        let mut skipped = 0usize;
        for &face in &soup.faces {
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                skipped += 1;
                continue;
            }
            let conn = face.map(|idx| {
                *handles[idx].get_or_insert_with(|| {
                    let v = self.vertex_ids.vertex();
                    self.vertices.insert(v, soup.vertices[idx]);
                    set.vertices.insert(v);
                    v
                })
            });
            let t = self.insert_triangle(conn);
            set.triangles.insert(t);
        }
        if skipped > 0 {
            debug!("band {band}: dropped {skipped} degenerate triangle(s)");
        }
        if set.triangles.is_empty() {
            return Err(IsoGeomError::EmptyMesh { band });
        }

        let id = self.set_ids.entity();
        self.sets.insert(id, set);
        Ok(id)
    }

    fn insert_triangle(&mut self, conn: [VertexId; 3]) -> TriangleId {
        let t = self.triangle_ids.triangle();
        self.triangles.insert(t, conn);
        for v in conn {
            self.vertex_triangles.entry(v).or_default().insert(t);
        }
        t
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains_key(&v)
    }

    /// All live vertices in handle order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, [f64; 3])> + '_ {
        self.vertices.iter().map(|(&v, &p)| (v, p))
    }

    pub fn coords(&self, v: VertexId) -> Result<[f64; 3], IsoGeomError> {
        self.vertices.get(&v).copied().ok_or_else(|| stale_vertex(v))
    }

    pub fn connectivity(&self, t: TriangleId) -> Result<[VertexId; 3], IsoGeomError> {
        self.triangles.get(&t).copied().ok_or_else(|| stale_triangle(t))
    }

    /// Reassigns the three vertices of `t`, keeping upward adjacency in sync.
    pub fn set_connectivity(
        &mut self,
        t: TriangleId,
        conn: [VertexId; 3],
    ) -> Result<(), IsoGeomError> {
        for v in conn {
            if !self.vertices.contains_key(&v) {
                return Err(stale_vertex(v));
            }
        }
        let old = self.triangles.get_mut(&t).ok_or_else(|| stale_triangle(t))?;
        let previous = std::mem::replace(old, conn);
        for v in previous {
            if !conn.contains(&v) {
                if let Some(tris) = self.vertex_triangles.get_mut(&v) {
                    tris.remove(&t);
                }
            }
        }
        for v in conn {
            self.vertex_triangles.entry(v).or_default().insert(t);
        }
        Ok(())
    }

    /// Triangles referencing `v`.
    pub fn triangles_of_vertex(&self, v: VertexId) -> Result<BTreeSet<TriangleId>, IsoGeomError> {
        if !self.vertices.contains_key(&v) {
            return Err(stale_vertex(v));
        }
        Ok(self.vertex_triangles.get(&v).cloned().unwrap_or_default())
    }

    /// Union of the triangles referencing any of `verts`.
    pub fn adjacent_triangles<'a, I>(&self, verts: I) -> Result<BTreeSet<TriangleId>, IsoGeomError>
    where
        I: IntoIterator<Item = &'a VertexId>,
    {
        let mut out = BTreeSet::new();
        for &v in verts {
            if !self.vertices.contains_key(&v) {
                return Err(stale_vertex(v));
            }
            if let Some(tris) = self.vertex_triangles.get(&v) {
                out.extend(tris.iter().copied());
            }
        }
        Ok(out)
    }

    /// Union of the vertices of `tris`.
    pub fn triangle_vertices<'a, I>(&self, tris: I) -> Result<BTreeSet<VertexId>, IsoGeomError>
    where
        I: IntoIterator<Item = &'a TriangleId>,
    {
        let mut out = BTreeSet::new();
        for &t in tris {
            out.extend(self.connectivity(t)?);
        }
        Ok(out)
    }

    /// Removes triangles from the store and from every set holding them.
    pub fn delete_triangles<'a, I>(&mut self, tris: I) -> Result<(), IsoGeomError>
    where
        I: IntoIterator<Item = &'a TriangleId>,
    {
        let doomed: BTreeSet<TriangleId> = tris.into_iter().copied().collect();
        for &t in &doomed {
            let conn = self.triangles.remove(&t).ok_or_else(|| stale_triangle(t))?;
            for v in conn {
                if let Some(adj) = self.vertex_triangles.get_mut(&v) {
                    adj.remove(&t);
                }
            }
        }
        if !doomed.is_empty() {
            for set in self.sets.values_mut() {
                set.triangles.retain(|t| !doomed.contains(t));
            }
        }
        Ok(())
    }

    /// Removes every vertex of `verts` that no triangle references, then
    /// strips the removed vertices from all sets in a single pass.
    /// Returns how many were removed.
    pub fn delete_orphan_vertices<'a, I>(&mut self, verts: I) -> Result<usize, IsoGeomError>
    where
        I: IntoIterator<Item = &'a VertexId>,
    {
        let mut removed = BTreeSet::new();
        for &v in verts {
            if !self.vertices.contains_key(&v) {
                if removed.contains(&v) {
                    continue;
                }
                return Err(stale_vertex(v));
            }
            if self.vertex_triangles.get(&v).is_some_and(|t| !t.is_empty()) {
                continue;
            }
            self.vertices.remove(&v);
            self.vertex_triangles.remove(&v);
            removed.insert(v);
        }
        if !removed.is_empty() {
            for set in self.sets.values_mut() {
                set.vertices.retain(|v| !removed.contains(v));
                set.edges.retain(|e| !e.iter().any(|v| removed.contains(v)));
            }
        }
        Ok(removed.len())
    }

    /// Creates an empty mesh set.
    pub fn create_set(&mut self) -> EntityId {
        let id = self.set_ids.entity();
        self.sets.insert(id, MeshSet::default());
        id
    }

    pub fn contains_set(&self, id: EntityId) -> bool {
        self.sets.contains_key(&id)
    }

    pub fn set(&self, id: EntityId) -> Result<&MeshSet, IsoGeomError> {
        self.sets.get(&id).ok_or_else(|| stale_set(id))
    }

    fn set_mut(&mut self, id: EntityId) -> Result<&mut MeshSet, IsoGeomError> {
        self.sets.get_mut(&id).ok_or_else(|| stale_set(id))
    }

    /// Discards a mesh set. Its entities stay in the store.
    pub fn delete_set(&mut self, id: EntityId) -> Result<MeshSet, IsoGeomError> {
        self.sets.remove(&id).ok_or_else(|| stale_set(id))
    }

    /// Adds live triangles and vertices to set `id`.
    pub fn add_to_set<'a, T, V>(
        &mut self,
        id: EntityId,
        tris: T,
        verts: V,
    ) -> Result<(), IsoGeomError>
    where
        T: IntoIterator<Item = &'a TriangleId>,
        V: IntoIterator<Item = &'a VertexId>,
    {
        let tris: Vec<TriangleId> = tris.into_iter().copied().collect();
        let verts: Vec<VertexId> = verts.into_iter().copied().collect();
        if let Some(&t) = tris.iter().find(|t| !self.triangles.contains_key(t)) {
            return Err(stale_triangle(t));
        }
        if let Some(&v) = verts.iter().find(|v| !self.vertices.contains_key(v)) {
            return Err(stale_vertex(v));
        }
        let set = self.set_mut(id)?;
        set.triangles.extend(tris);
        set.vertices.extend(verts);
        Ok(())
    }

    /// Adds edges between live vertices to set `id`.
    pub fn add_edges_to_set<'a, E>(&mut self, id: EntityId, edges: E) -> Result<(), IsoGeomError>
    where
        E: IntoIterator<Item = &'a Edge>,
    {
        let edges: Vec<Edge> = edges.into_iter().map(|&[a, b]| edge(a, b)).collect();
        for e in &edges {
            for v in e {
                if !self.vertices.contains_key(v) {
                    return Err(stale_vertex(*v));
                }
            }
        }
        self.set_mut(id)?.edges.extend(edges);
        Ok(())
    }

    /// Removes triangles and vertices from set `id` only; the store keeps them.
    pub fn remove_from_set<'a, T, V>(
        &mut self,
        id: EntityId,
        tris: T,
        verts: V,
    ) -> Result<(), IsoGeomError>
    where
        T: IntoIterator<Item = &'a TriangleId>,
        V: IntoIterator<Item = &'a VertexId>,
    {
        let set = self.set_mut(id)?;
        for t in tris {
            set.triangles.remove(t);
        }
        for v in verts {
            set.vertices.remove(v);
        }
        Ok(())
    }

    /// Coordinates of every vertex of set `id`, in handle order.
    pub fn set_coords(&self, id: EntityId) -> Result<Vec<(VertexId, [f64; 3])>, IsoGeomError> {
        self.set(id)?
            .vertices
            .iter()
            .map(|&v| self.coords(v).map(|p| (v, p)))
            .collect()
    }
}
