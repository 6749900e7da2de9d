//! Typed tag tables for geometry entities.
//!
//! One table per tag kind, keyed by [`EntityId`]. Presence is an explicit
//! `Option`/membership check; a missing tag is never an error.

use std::collections::BTreeMap;
use std::fmt;

use crate::topology::point::{EntityId, TriangleId};

/// Topological dimension of a geometric entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum GeomDimension {
    Curve = 1,
    Surface = 2,
    Volume = 3,
}

impl GeomDimension {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Category name stored alongside the dimension.
    pub const fn category(self) -> Category {
        match self {
            GeomDimension::Curve => Category::Curve,
            GeomDimension::Surface => Category::Surface,
            GeomDimension::Volume => Category::Volume,
        }
    }
}

/// Category of a geometric entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Category {
    Curve,
    Surface,
    Volume,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Curve => "Curve",
            Category::Surface => "Surface",
            Category::Volume => "Volume",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surface sense: which volume lies on the forward (inner, lower band) side
/// and which on the backward (outer, higher band) side. Unshared surfaces have
/// no backward volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Sense {
    pub forward: EntityId,
    pub backward: Option<EntityId>,
}

impl Sense {
    pub fn shared(forward: EntityId, backward: EntityId) -> Self {
        Self {
            forward,
            backward: Some(backward),
        }
    }

    pub fn unshared(forward: EntityId) -> Self {
        Self {
            forward,
            backward: None,
        }
    }

    /// Raw handle pair with 0 as the "none" sentinel.
    pub fn raw(self) -> [u64; 2] {
        [self.forward.get(), self.backward.map_or(0, EntityId::get)]
    }
}

/// Tag tables for one geometry hierarchy.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct TagTables {
    dimension: BTreeMap<EntityId, GeomDimension>,
    category: BTreeMap<EntityId, Category>,
    global_id: BTreeMap<EntityId, u32>,
    value: BTreeMap<EntityId, f64>,
    sense: BTreeMap<EntityId, Sense>,
    triangle_value: BTreeMap<TriangleId, f64>,
}

impl TagTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags `entity` with its dimension, category and global id.
    pub fn set_geometry(&mut self, entity: EntityId, dim: GeomDimension, global_id: u32) {
        self.dimension.insert(entity, dim);
        self.category.insert(entity, dim.category());
        self.global_id.insert(entity, global_id);
    }

    pub fn dimension(&self, entity: EntityId) -> Option<GeomDimension> {
        self.dimension.get(&entity).copied()
    }

    pub fn category(&self, entity: EntityId) -> Option<Category> {
        self.category.get(&entity).copied()
    }

    pub fn global_id(&self, entity: EntityId) -> Option<u32> {
        self.global_id.get(&entity).copied()
    }

    /// Assigns the scalar value of a surface. Returns the previous value.
    pub fn set_value(&mut self, surface: EntityId, value: f64) -> Option<f64> {
        self.value.insert(surface, value)
    }

    pub fn value(&self, surface: EntityId) -> Option<f64> {
        self.value.get(&surface).copied()
    }

    pub fn has_value(&self, surface: EntityId) -> bool {
        self.value.contains_key(&surface)
    }

    /// Assigns the sense of a surface. Returns the previous sense.
    pub fn set_sense(&mut self, surface: EntityId, sense: Sense) -> Option<Sense> {
        self.sense.insert(surface, sense)
    }

    pub fn sense(&self, surface: EntityId) -> Option<Sense> {
        self.sense.get(&surface).copied()
    }

    pub fn has_sense(&self, surface: EntityId) -> bool {
        self.sense.contains_key(&surface)
    }

    pub fn set_triangle_value(&mut self, tri: TriangleId, value: f64) {
        self.triangle_value.insert(tri, value);
    }

    pub fn triangle_value(&self, tri: TriangleId) -> Option<f64> {
        self.triangle_value.get(&tri).copied()
    }

    /// All entities of dimension `dim`, ordered by global id.
    pub fn entities_of(&self, dim: GeomDimension) -> Vec<EntityId> {
        let mut out: Vec<(u32, EntityId)> = self
            .dimension
            .iter()
            .filter(|&(_, &d)| d == dim)
            .map(|(&e, _)| (self.global_id.get(&e).copied().unwrap_or(0), e))
            .collect();
        out.sort_unstable();
        out.into_iter().map(|(_, e)| e).collect()
    }
}
