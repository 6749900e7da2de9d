//! Coincident-vertex matching under an absolute per-axis tolerance.
//!
//! Two vertices coincide when `|ax-bx| <= tol`, `|ay-by| <= tol` and
//! `|az-bz| <= tol`. Exact coordinate equality is tried first; remaining
//! vertices go through a uniform grid over B so only neighbouring cells are
//! scanned. When several B vertices qualify, the one earliest in B's order wins.
//! Near-duplicate vertices inside B are not resolved here.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::mesh::soup::coord_key;
use crate::topology::point::VertexId;

/// Per-axis tolerance test.
#[inline]
pub fn within_tolerance(a: [f64; 3], b: [f64; 3], tol: f64) -> bool {
    (0..3).all(|i| (a[i] - b[i]).abs() <= tol)
}

type Cell = [i64; 3];

/// Lookup structure over the B side of a match.
#[derive(Clone, Debug)]
pub struct CoordIndex {
    points: Vec<(VertexId, [f64; 3])>,
    exact: HashMap<[u64; 3], usize>,
    cell_size: Option<f64>,
    grid: HashMap<Cell, Vec<usize>>,
}

impl CoordIndex {
    /// Indexes `points` in the given order; that order decides ties.
    pub fn new(points: Vec<(VertexId, [f64; 3])>, tol: f64) -> Self {
        let mut exact = HashMap::with_capacity(points.len());
        for (rank, (_, p)) in points.iter().enumerate() {
            exact.entry(coord_key(*p)).or_insert(rank);
        }
        let cell_size = (tol > 0.0 && tol.is_finite()).then_some(2.0 * tol);
        let mut grid: HashMap<Cell, Vec<usize>> = HashMap::new();
        if let Some(size) = cell_size {
            for (rank, (_, p)) in points.iter().enumerate() {
                grid.entry(cell_of(*p, size)).or_default().push(rank);
            }
        }
        Self {
            points,
            exact,
            cell_size,
            grid,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// B vertex with bit-identical coordinates, if any.
    pub fn exact(&self, p: [f64; 3]) -> Option<(VertexId, [f64; 3])> {
        self.exact.get(&coord_key(p)).map(|&rank| self.points[rank])
    }

    /// Earliest B vertex within `tol` of `p`.
    pub fn first_within(&self, p: [f64; 3], tol: f64) -> Option<(VertexId, [f64; 3])> {
        let size = self.cell_size?;
        let [cx, cy, cz] = cell_of(p, size);
        let mut best: Option<usize> = None;
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                for dz in -1..=1i64 {
                    let cell = [
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    ];
                    let Some(ranks) = self.grid.get(&cell) else {
                        continue;
                    };
                    for &rank in ranks {
                        if best.is_some_and(|b| b <= rank) {
                            // ranks are pushed in ascending order
                            break;
                        }
                        if within_tolerance(p, self.points[rank].1, tol) {
                            best = Some(rank);
                            break;
                        }
                    }
                }
            }
        }
        best.map(|rank| self.points[rank])
    }
}

fn cell_of(p: [f64; 3], size: f64) -> Cell {
    p.map(|c| (c / size).floor() as i64)
}

/// Result of matching an A vertex set against a B vertex set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexMatches {
    /// `(a, b)` pairs in A order.
    pub pairs: Vec<(VertexId, VertexId)>,
    pub a: BTreeSet<VertexId>,
    pub b: BTreeSet<VertexId>,
    /// Matched B vertex to the A vertex that replaces it. When several A
    /// vertices hit the same B vertex the last one is kept.
    pub replacement: BTreeMap<VertexId, VertexId>,
}

impl VertexMatches {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Matches every vertex of `a` against `b`.
pub fn match_vertices(a: &[(VertexId, [f64; 3])], b: &CoordIndex, tol: f64) -> VertexMatches {
    let mut out = VertexMatches::default();
    if b.is_empty() {
        return out;
    }
    for &(va, pa) in a {
        let hit = b.exact(pa).or_else(|| b.first_within(pa, tol));
        if let Some((vb, _)) = hit {
            out.pairs.push((va, vb));
            out.a.insert(va);
            out.b.insert(vb);
            out.replacement.insert(vb, va);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(i: u64) -> VertexId {
        VertexId::new(i).unwrap()
    }

    #[test]
    fn exact_and_tolerant_matches() {
        let b = CoordIndex::new(
            vec![
                (v(10), [0.0, 0.0, 0.0]),
                (v(11), [1.0, 0.0, 0.0]),
                (v(12), [5.0, 5.0, 5.0]),
            ],
            1e-5,
        );
        let a = [
            (v(1), [0.0, 0.0, 0.0]),
            (v(2), [1.0 + 5e-6, -5e-6, 0.0]),
            (v(3), [2.0, 0.0, 0.0]),
        ];
        let m = match_vertices(&a, &b, 1e-5);
        assert_eq!(m.pairs, vec![(v(1), v(10)), (v(2), v(11))]);
        assert_eq!(m.replacement.get(&v(11)), Some(&v(2)));
        assert!(!m.a.contains(&v(3)));
    }

    #[test]
    fn tolerance_is_per_axis() {
        let b = CoordIndex::new(vec![(v(9), [0.0, 0.0, 0.0])], 1.0);
        // Euclidean distance exceeds 1, every axis is within 1
        assert!(b.first_within([0.9, 0.9, 0.9], 1.0).is_some());
        assert!(b.first_within([1.1, 0.0, 0.0], 1.0).is_none());
    }

    #[test]
    fn earliest_candidate_wins() {
        let b = CoordIndex::new(
            vec![(v(5), [0.2, 0.0, 0.0]), (v(6), [0.0, 0.0, 0.0])],
            0.5,
        );
        // both candidates qualify; exact fast path is skipped for 0.1
        assert_eq!(b.first_within([0.1, 0.0, 0.0], 0.5).map(|x| x.0), Some(v(5)));
        // exact equality takes precedence
        assert_eq!(b.exact([0.0, 0.0, 0.0]).map(|x| x.0), Some(v(6)));
    }

    #[test]
    fn last_a_wins_the_replacement() {
        let b = CoordIndex::new(vec![(v(7), [0.0, 0.0, 0.0])], 0.1);
        let a = [(v(1), [0.05, 0.0, 0.0]), (v(2), [-0.05, 0.0, 0.0])];
        let m = match_vertices(&a, &b, 0.1);
        assert_eq!(m.len(), 2);
        assert_eq!(m.b.len(), 1);
        assert_eq!(m.replacement[&v(7)], v(2));
    }

    fn coord() -> impl Strategy<Value = f64> {
        (-40i32..40).prop_map(|i| f64::from(i) * 0.25)
    }

    fn point() -> impl Strategy<Value = [f64; 3]> {
        [coord(), coord(), coord()]
    }

    proptest! {
        #[test]
        fn grid_agrees_with_linear_scan(
            a in prop::collection::vec(point(), 0..30),
            b in prop::collection::vec(point(), 0..30),
            tol in prop_oneof![Just(0.1), Just(0.25), Just(0.3), Just(1.0)],
        ) {
            let a: Vec<_> = a
                .into_iter()
                .enumerate()
                .map(|(i, p)| (v(i as u64 + 1), p))
                .collect();
            let b: Vec<_> = b
                .into_iter()
                .enumerate()
                .map(|(i, p)| (v(i as u64 + 100), p))
                .collect();
            let index = CoordIndex::new(b.clone(), tol);
            let m = match_vertices(&a, &index, tol);

            for &(va, pa) in &a {
                let scan = b.iter().find(|(_, pb)| within_tolerance(pa, *pb, tol));
                prop_assert_eq!(m.a.contains(&va), scan.is_some());
            }
            for &(va, vb) in &m.pairs {
                let pa = a.iter().find(|x| x.0 == va).unwrap().1;
                let pb = b.iter().find(|x| x.0 == vb).unwrap().1;
                prop_assert!(within_tolerance(pa, pb, tol));
            }
        }
    }
}
