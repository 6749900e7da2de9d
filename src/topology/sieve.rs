//! # Sieve: directed incidence between geometric entities
//!
//! The geometry hierarchy is a DAG of mesh sets: every volume points at the
//! surfaces that bound it, and every surface points at the curves that bound
//! it. This module models that relation as a bidirectional multimap
//! (`cone` = children, `support` = parents).

use std::collections::BTreeMap;

/// Directed incidence relation (arrows) over entities.
///
/// - **Forward** incidence (`cone`): the children of a point.
/// - **Backward** incidence (`support`): the parents of a point.
pub trait Sieve {
    /// Entity handle type.
    type Point: Copy + Eq + std::hash::Hash + Ord;
    /// Iterator over the points at the other end of a point's arrows.
    type ConeIter<'a>: Iterator<Item = Self::Point>
    where
        Self: 'a;

    /// Children of `p`, in insertion order.
    fn cone<'a>(&'a self, p: Self::Point) -> Self::ConeIter<'a>;

    /// Parents of `p`, in insertion order.
    fn support<'a>(&'a self, p: Self::Point) -> Self::ConeIter<'a>;

    /// Insert the arrow `src -> dst`. Inserting an existing arrow is a no-op.
    fn add_arrow(&mut self, src: Self::Point, dst: Self::Point);
}

/// In-memory sieve with ordered maps so iteration is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct InMemorySieve<P: Ord> {
    /// Outgoing adjacency: point -> children.
    adjacency_out: BTreeMap<P, Vec<P>>,
    /// Incoming adjacency: point -> parents.
    #[serde(skip)]
    adjacency_in: BTreeMap<P, Vec<P>>,
}

impl<P: Ord> Default for InMemorySieve<P> {
    fn default() -> Self {
        Self {
            adjacency_out: BTreeMap::new(),
            adjacency_in: BTreeMap::new(),
        }
    }
}

impl<P: Copy + Eq + std::hash::Hash + Ord + std::fmt::Debug> InMemorySieve<P> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_arrow(&self, src: P, dst: P) -> bool {
        self.adjacency_out
            .get(&src)
            .is_some_and(|v| v.contains(&dst))
    }

    /// Number of arrows.
    pub fn arrow_count(&self) -> usize {
        self.adjacency_out.values().map(Vec::len).sum()
    }

    #[cfg(debug_assertions)]
    fn debug_assert_consistent(&self) {
        for (src, outs) in &self.adjacency_out {
            for dst in outs {
                debug_assert!(
                    self.adjacency_in
                        .get(dst)
                        .is_some_and(|ins| ins.contains(src)),
                    "missing mirror in[{dst:?}] for out edge ({src:?} -> {dst:?})"
                );
            }
        }
    }
}

impl<P: Copy + Eq + std::hash::Hash + Ord + std::fmt::Debug> Sieve for InMemorySieve<P> {
    type Point = P;
    type ConeIter<'a>
        = std::iter::Copied<std::slice::Iter<'a, P>>
    where
        Self: 'a;

    fn cone<'a>(&'a self, p: P) -> Self::ConeIter<'a> {
        self.adjacency_out
            .get(&p)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .copied()
    }

    fn support<'a>(&'a self, p: P) -> Self::ConeIter<'a> {
        self.adjacency_in
            .get(&p)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .copied()
    }

    fn add_arrow(&mut self, src: P, dst: P) {
        if self.has_arrow(src, dst) {
            return;
        }
        self.adjacency_out.entry(src).or_default().push(dst);
        self.adjacency_in.entry(dst).or_default().push(src);

        #[cfg(debug_assertions)]
        self.debug_assert_consistent();
    }
}
