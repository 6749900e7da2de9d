//! Surface imprint and merge across adjacent bands.
//!
//! Band pairs `(V0,V1), (V1,V2), ...` are processed strictly in order. For
//! every patch of the lower band and every patch of the upper band the
//! coincident vertices are matched; the triangles covered by the match become
//! one shared surface owned by both volumes, with the lower band on its
//! forward side. Its open boundary, if any, becomes a curve.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::algs::matching::{CoordIndex, VertexMatches, match_vertices};
use crate::algs::separate::triangles_within;
use crate::algs::skin::find_skin;
use crate::mesh::MeshStore;
use crate::mesh_error::{IsoGeomError, Warning};
use crate::topology::point::{EntityId, TriangleId};
use crate::topology::tags::{Sense, TagTables};
use crate::topology::volume::Volume;

/// Options for [`imprint_merge`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImprintOpts {
    /// Absolute per-axis merge tolerance.
    pub merge_tol: f64,
    /// Factor applied to every surface value.
    pub norm: f64,
}

impl Default for ImprintOpts {
    fn default() -> Self {
        Self {
            merge_tol: 1e-5,
            norm: 1.0,
        }
    }
}

/// Everything the merge produced besides the store mutations.
#[derive(Clone, Debug, Default)]
pub struct ImprintOutcome {
    /// Value and sense of every surface.
    pub tags: TagTables,
    /// Shared surfaces in creation order.
    pub shared: Vec<EntityId>,
    /// Curves registered under each surface, in creation order.
    pub surface_curves: BTreeMap<EntityId, Vec<EntityId>>,
    pub warnings: Vec<Warning>,
}

impl ImprintOutcome {
    pub fn curves_of(&self, surface: EntityId) -> &[EntityId] {
        self.surface_curves
            .get(&surface)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn register_curve(&mut self, curve: EntityId, parents: [EntityId; 3]) {
        for p in parents {
            self.surface_curves.entry(p).or_default().push(curve);
        }
    }
}

/// Imprints every adjacent band pair of `volumes` (ordered by rank), then
/// tags the surfaces no pair claimed.
pub fn imprint_merge(
    store: &mut MeshStore,
    volumes: &mut [Volume],
    opts: &ImprintOpts,
) -> Result<ImprintOutcome, IsoGeomError> {
    let mut outcome = ImprintOutcome::default();
    for i in 1..volumes.len() {
        let (lower, upper) = volumes.split_at_mut(i);
        merge_adjacent(store, &mut lower[i - 1], &mut upper[0], opts, &mut outcome)?;
    }
    tag_unmatched(store, volumes, &mut outcome.tags);
    Ok(outcome)
}

/// Compares every patch of `v1` with every patch of `v2`.
pub fn merge_adjacent(
    store: &mut MeshStore,
    v1: &mut Volume,
    v2: &mut Volume,
    opts: &ImprintOpts,
    outcome: &mut ImprintOutcome,
) -> Result<(), IsoGeomError> {
    info!(
        "imprinting band {} ({} patches) against band {} ({} patches)",
        v1.rank(),
        v1.surfaces.len(),
        v2.rank(),
        v2.surfaces.len()
    );
    let tol = opts.merge_tol;
    let (r1, r2) = (v1.rank(), v2.rank());
    let mut created = Vec::new();

    for s1 in v1.surfaces.clone() {
        let wrap1 = |e: IsoGeomError| e.in_patch(r1, s1);
        let mut a = store.set_coords(s1).map_err(wrap1)?;

        for s2 in v2.surfaces.clone() {
            let wrap2 = |e: IsoGeomError| e.in_patch(r2, s2);
            let b = CoordIndex::new(store.set_coords(s2).map_err(wrap2)?, tol);
            let matches = match_vertices(&a, &b, tol);
            if matches.is_empty() {
                continue;
            }
            debug!(
                "patch {s1} (band {r1}) and patch {s2} (band {r2}) share {} vertices",
                matches.len()
            );

            let surf = merge_pair(store, s1, s2, &matches, outcome).map_err(wrap1)?;
            tag_shared(v1, v2, surf, opts, outcome);
            created.push(surf);

            if store.set(s2).map_err(wrap2)?.vertices().is_empty() {
                v2.surfaces.retain(|&s| s != s2);
                store.delete_set(s2).map_err(wrap2)?;
                debug!("patch {s2} of band {r2} fully consumed");
            }
            if store.set(s1).map_err(wrap1)?.vertices().is_empty() {
                v1.surfaces.retain(|&s| s != s1);
                store.delete_set(s1).map_err(wrap1)?;
                debug!("patch {s1} of band {r1} fully consumed");
                break;
            }
            a = store.set_coords(s1).map_err(wrap1)?;
        }
    }

    info!(
        "bands {r1} and {r2}: {} shared surface(s)",
        created.len()
    );
    v1.surfaces.extend(created.iter().copied());
    v2.surfaces.extend(created.iter().copied());
    outcome.shared.extend(created);
    Ok(())
}

/// Builds the shared surface of `s1` and `s2`, extracts its curve and
/// stitches the upper band onto the retained vertices.
fn merge_pair(
    store: &mut MeshStore,
    s1: EntityId,
    s2: EntityId,
    matches: &VertexMatches,
    outcome: &mut ImprintOutcome,
) -> Result<EntityId, IsoGeomError> {
    let tris1 = triangles_within(store, store.set(s1)?.triangles(), &matches.a)?;
    let tris2 = triangles_within(store, store.set(s2)?.triangles(), &matches.b)?;

    let surf = store.create_set();
    store.add_to_set(surf, &tris1, &matches.a)?;

    let skin = find_skin(store, &tris1)?;
    if !skin.is_empty() {
        let curve = store.create_set();
        store.add_to_set(curve, &Vec::<TriangleId>::new(), &skin.vertices)?;
        store.add_edges_to_set(curve, &skin.edges)?;
        outcome.register_curve(curve, [s1, s2, surf]);
        debug!("surface {surf}: curve {curve} with {} edges", skin.edges.len());
    }

    for (&b, &a) in &matches.replacement {
        for t in store.triangles_of_vertex(b)? {
            if tris2.contains(&t) {
                continue;
            }
            let conn = store.connectivity(t)?.map(|v| if v == b { a } else { v });
            store.set_connectivity(t, conn)?;
        }
    }

    store.remove_from_set(s1, &tris1, &matches.a)?;
    store.remove_from_set(s2, &tris2, &matches.b)?;
    store.delete_triangles(&tris2)?;
    let orphans = store.delete_orphan_vertices(matches.b.difference(&matches.a))?;
    debug!(
        "surface {surf}: {} triangles kept, {} duplicates deleted, {orphans} vertices removed",
        tris1.len(),
        tris2.len()
    );
    Ok(surf)
}

fn tag_shared(
    v1: &Volume,
    v2: &Volume,
    surf: EntityId,
    opts: &ImprintOpts,
    outcome: &mut ImprintOutcome,
) {
    let value = match v1.band.shared_bound(&v2.band) {
        Some(bound) => bound * opts.norm,
        None => {
            let w = Warning::UnmatchedBounds {
                lower_band: v1.rank(),
                upper_band: v2.rank(),
                surface: surf,
            };
            warn!("{w}");
            outcome.warnings.push(w);
            0.0
        }
    };
    outcome.tags.set_value(surf, value);
    outcome.tags.set_sense(surf, Sense::shared(v1.id, v2.id));
}

/// Gives every live surface without tags value 0 and its own volume as the
/// forward side.
pub fn tag_unmatched(store: &MeshStore, volumes: &[Volume], tags: &mut TagTables) {
    let mut seen = BTreeSet::new();
    for vol in volumes {
        for &s in &vol.surfaces {
            if !store.contains_set(s) || !seen.insert(s) {
                continue;
            }
            if !tags.has_value(s) {
                tags.set_value(s, 0.0);
            }
            if !tags.has_sense(s) {
                tags.set_sense(s, Sense::unshared(vol.id));
            }
        }
    }
}
