//! Volume → surface → curve hierarchy with its tag tables.
//!
//! The hierarchy is the hand-off to output adapters: three entity lists in
//! global-id order, the parent→child arrows between them and the tags of
//! every entity. It does not own mesh data; triangles, edges and vertices are
//! read from the [`MeshStore`] the run built.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::info;

use crate::algs::imprint::ImprintOutcome;
use crate::config::GeometryOpts;
use crate::mesh::MeshStore;
use crate::mesh_error::IsoGeomError;
use crate::topology::point::EntityId;
use crate::topology::sieve::{InMemorySieve, Sieve};
use crate::topology::tags::{GeomDimension, Sense, TagTables};
use crate::topology::volume::{Band, Volume};

#[derive(Clone, Debug, serde::Serialize)]
pub struct Hierarchy {
    /// Volumes in global-id order, one per band.
    pub volumes: Vec<EntityId>,
    pub surfaces: Vec<EntityId>,
    pub curves: Vec<EntityId>,
    /// Band realised by each entry of `volumes`.
    pub bands: Vec<Band>,
    /// Volume → surface and surface → curve arrows.
    pub children: InMemorySieve<EntityId>,
    pub tags: TagTables,
    pub root_tags: BTreeMap<String, f64>,
}

impl Hierarchy {
    pub fn entities(&self, dim: GeomDimension) -> &[EntityId] {
        match dim {
            GeomDimension::Volume => &self.volumes,
            GeomDimension::Surface => &self.surfaces,
            GeomDimension::Curve => &self.curves,
        }
    }

    /// Direct children: surfaces of a volume or curves of a surface.
    pub fn children_of(&self, e: EntityId) -> Vec<EntityId> {
        self.children.cone(e).collect()
    }

    /// Direct parents: volumes of a surface or surfaces of a curve.
    pub fn parents_of(&self, e: EntityId) -> Vec<EntityId> {
        self.children.support(e).collect()
    }

    pub fn global_id(&self, e: EntityId) -> Option<u32> {
        self.tags.global_id(e)
    }

    pub fn value(&self, surface: EntityId) -> Option<f64> {
        self.tags.value(surface)
    }

    pub fn sense(&self, surface: EntityId) -> Option<Sense> {
        self.tags.sense(surface)
    }

    /// Surfaces owned by both `lower` and `upper`.
    pub fn shared_surfaces(&self, lower: EntityId, upper: EntityId) -> Vec<EntityId> {
        self.children
            .cone(lower)
            .filter(|&s| self.children.has_arrow(upper, s))
            .collect()
    }
}

/// Assigns dense per-dimension global ids and links the hierarchy.
///
/// Volumes are numbered in band order, surfaces in the order volumes list
/// them, curves in the order their surfaces list them. Surfaces and curves
/// that were discarded during merging are skipped.
pub fn build_hierarchy(
    store: &MeshStore,
    volumes: &[Volume],
    outcome: &ImprintOutcome,
    opts: &GeometryOpts,
) -> Result<Hierarchy, IsoGeomError> {
    if volumes.is_empty() {
        return Err(IsoGeomError::EmptyHierarchy);
    }
    let mut tags = TagTables::new();
    let mut children = InMemorySieve::new();

    for (gid, vol) in (1u32..).zip(volumes) {
        store.set(vol.id)?;
        tags.set_geometry(vol.id, GeomDimension::Volume, gid);
    }

    let surfaces: Vec<EntityId> = volumes
        .iter()
        .flat_map(|v| v.surfaces.iter().copied())
        .filter(|&s| store.contains_set(s))
        .unique()
        .collect();
    for (gid, &s) in (1u32..).zip(&surfaces) {
        tags.set_geometry(s, GeomDimension::Surface, gid);
        if let Some(v) = outcome.tags.value(s) {
            tags.set_value(s, v);
        }
        if let Some(sense) = outcome.tags.sense(s) {
            tags.set_sense(s, sense);
        }
    }
    for vol in volumes {
        for &s in vol.surfaces.iter().filter(|&&s| store.contains_set(s)) {
            children.add_arrow(vol.id, s);
        }
    }

    let curves: Vec<EntityId> = surfaces
        .iter()
        .flat_map(|&s| outcome.curves_of(s).iter().copied())
        .filter(|&c| store.contains_set(c))
        .unique()
        .collect();
    for (gid, &c) in (1u32..).zip(&curves) {
        tags.set_geometry(c, GeomDimension::Curve, gid);
    }
    for &s in &surfaces {
        for &c in outcome.curves_of(s) {
            if store.contains_set(c) {
                children.add_arrow(s, c);
            }
        }
    }

    if opts.tag_triangles {
        for &s in &surfaces {
            if let Some(v) = tags.value(s) {
                for &t in store.set(s)?.triangles() {
                    tags.set_triangle_value(t, v);
                }
            }
        }
    }

    info!(
        "hierarchy: {} volumes, {} surfaces, {} curves, {} links",
        volumes.len(),
        surfaces.len(),
        curves.len(),
        children.arrow_count()
    );
    Ok(Hierarchy {
        volumes: volumes.iter().map(|v| v.id).collect(),
        surfaces,
        curves,
        bands: volumes.iter().map(|v| v.band).collect(),
        children,
        tags,
        root_tags: opts.root_tags.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::point::TriangleId;

    fn tri_store() -> (MeshStore, Vec<EntityId>) {
        let mut store = MeshStore::new();
        let soup = crate::mesh::TriangleSoup::from_triangles([[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ]]);
        let fs = store.load_soup(0, &soup).unwrap();
        let tris: Vec<TriangleId> = store.set(fs).unwrap().triangles().iter().copied().collect();
        let verts = store.set(fs).unwrap().vertices().clone();
        let s = store.create_set();
        store.add_to_set(s, &tris, &verts).unwrap();
        let c = store.create_set();
        (store, vec![fs, s, c])
    }

    #[test]
    fn empty_is_rejected() {
        let store = MeshStore::new();
        let err = build_hierarchy(
            &store,
            &[],
            &ImprintOutcome::default(),
            &GeometryOpts::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IsoGeomError::EmptyHierarchy));
    }

    #[test]
    fn links_and_numbers_entities() {
        let (store, ids) = tri_store();
        let (fs, s, c) = (ids[0], ids[1], ids[2]);
        let mut vol = Volume::new(fs, Band::new(0, None, Some(1.0)));
        vol.surfaces.push(s);
        let mut outcome = ImprintOutcome::default();
        outcome.surface_curves.insert(s, vec![c]);
        outcome.tags.set_value(s, 0.0);
        outcome.tags.set_sense(s, Sense::unshared(fs));
        let opts = GeometryOpts {
            tag_triangles: true,
            ..Default::default()
        };

        let h = build_hierarchy(&store, &[vol], &outcome, &opts).unwrap();
        assert_eq!(h.volumes, vec![fs]);
        assert_eq!(h.surfaces, vec![s]);
        assert_eq!(h.curves, vec![c]);
        assert_eq!(h.children_of(fs), vec![s]);
        assert_eq!(h.children_of(s), vec![c]);
        assert_eq!(h.parents_of(c), vec![s]);
        assert_eq!(h.global_id(c), Some(1));
        assert_eq!(h.tags.dimension(c), Some(GeomDimension::Curve));
        let t = *store.set(s).unwrap().triangles().first().unwrap();
        assert_eq!(h.tags.triangle_value(t), Some(0.0));
    }

    #[test]
    fn discarded_sets_are_skipped() {
        let (mut store, ids) = tri_store();
        let (fs, s, c) = (ids[0], ids[1], ids[2]);
        let gone = store.create_set();
        store.delete_set(gone).unwrap();
        let mut vol = Volume::new(fs, Band::new(0, None, None));
        vol.surfaces = vec![gone, s, s];
        let mut outcome = ImprintOutcome::default();
        outcome.surface_curves.insert(gone, vec![c]);

        let h = build_hierarchy(&store, &[vol], &outcome, &GeometryOpts::default()).unwrap();
        assert_eq!(h.surfaces, vec![s]);
        assert!(h.curves.is_empty());
        assert_eq!(h.global_id(s), Some(1));
    }
}
