//! Connected-component separation of a band's triangle soup.
//!
//! Two vertices are connected when some triangle contains both. Each maximal
//! connected vertex set, together with the triangles whose three vertices lie
//! in it, becomes one surface patch.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::mesh::MeshStore;
use crate::mesh_error::IsoGeomError;
use crate::topology::point::{EntityId, TriangleId, VertexId};

/// Triangles adjacent to `verts` whose three vertices all lie in `verts`.
pub fn surface_triangles(
    store: &MeshStore,
    verts: &BTreeSet<VertexId>,
) -> Result<BTreeSet<TriangleId>, IsoGeomError> {
    let mut good = BTreeSet::new();
    for t in store.adjacent_triangles(verts)? {
        if store.connectivity(t)?.iter().all(|v| verts.contains(v)) {
            good.insert(t);
        }
    }
    Ok(good)
}

/// Triangles of `candidates` whose three vertices all lie in `verts`.
pub fn triangles_within(
    store: &MeshStore,
    candidates: &BTreeSet<TriangleId>,
    verts: &BTreeSet<VertexId>,
) -> Result<BTreeSet<TriangleId>, IsoGeomError> {
    let mut good = BTreeSet::new();
    for &t in candidates {
        if store.connectivity(t)?.iter().all(|v| verts.contains(v)) {
            good.insert(t);
        }
    }
    Ok(good)
}

/// Flood-fills the vertices connected to `seed`.
///
/// Each round only expands the vertices discovered in the previous round, so
/// a patch is walked once instead of re-querying the whole visited set.
pub fn connected_vertices(
    store: &MeshStore,
    seed: VertexId,
) -> Result<BTreeSet<VertexId>, IsoGeomError> {
    let mut visited = BTreeSet::from([seed]);
    let mut frontier = vec![seed];
    while !frontier.is_empty() {
        let tris = store.adjacent_triangles(&frontier)?;
        let reached = store.triangle_vertices(&tris)?;
        frontier = reached
            .into_iter()
            .filter(|&v| visited.insert(v))
            .collect();
    }
    Ok(visited)
}

/// Splits the file set of band `band` into disjoint surface patches.
///
/// Patches are created in seed order (lowest remaining vertex handle first).
/// On return the file set is empty; it stays alive as the band's volume set.
pub fn separate_components(
    store: &mut MeshStore,
    file_set: EntityId,
    band: usize,
) -> Result<Vec<EntityId>, IsoGeomError> {
    let wrap = |e: IsoGeomError| e.in_patch(band, file_set);
    let mut patches = Vec::new();

    info!("separating band {band}");
    loop {
        let seed = match store.set(file_set).map_err(wrap)?.vertices().first() {
            Some(&v) => v,
            None => break,
        };
        let verts = connected_vertices(store, seed).map_err(wrap)?;
        let tris = surface_triangles(store, &verts).map_err(wrap)?;

        let patch = store.create_set();
        store.add_to_set(patch, &tris, &verts).map_err(wrap)?;
        store
            .remove_from_set(file_set, &tris, &verts)
            .map_err(wrap)?;
        debug!(
            "band {band}: patch {patch} has {} vertices, {} triangles",
            verts.len(),
            tris.len()
        );
        patches.push(patch);
    }

    let leftover = store.set(file_set).map_err(wrap)?.triangles().len();
    if leftover > 0 {
        debug!("band {band}: {leftover} triangle(s) left outside every patch");
    }
    info!("band {band}: {} surface patch(es)", patches.len());
    Ok(patches)
}
