//! Bands and the volumes that realise them.

use crate::topology::point::EntityId;

/// One isovalue interval `[lower, upper)`. The lowest band has no lower
/// bound and the highest band has no upper bound.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Band {
    /// Position in level order, 0 = lowest.
    pub rank: usize,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Band {
    pub fn new(rank: usize, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { rank, lower, upper }
    }

    /// The bound value both bands have in common, if any. Unbounded ends
    /// never match.
    pub fn shared_bound(&self, other: &Band) -> Option<f64> {
        let theirs = [other.lower, other.upper];
        [self.lower, self.upper]
            .into_iter()
            .flatten()
            .find(|b| theirs.contains(&Some(*b)))
    }
}

/// A band realised as a geometric entity: its volume set handle and the
/// surface patches bounding it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Volume {
    pub id: EntityId,
    pub band: Band,
    /// Owned surface patches; shared patches appear in both neighbours' lists.
    pub surfaces: Vec<EntityId>,
}

impl Volume {
    pub fn new(id: EntityId, band: Band) -> Self {
        Self {
            id,
            band,
            surfaces: Vec::new(),
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.band.rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_bands_share_their_common_level() {
        let low = Band::new(0, None, Some(1.0));
        let mid = Band::new(1, Some(1.0), Some(2.0));
        let high = Band::new(2, Some(2.0), None);
        assert_eq!(low.shared_bound(&mid), Some(1.0));
        assert_eq!(mid.shared_bound(&high), Some(2.0));
        assert_eq!(low.shared_bound(&high), None);
    }

    #[test]
    fn open_ends_do_not_match() {
        let low = Band::new(0, None, Some(5.0));
        let high = Band::new(1, Some(5.0), None);
        assert_eq!(low.shared_bound(&high), Some(5.0));
        let a = Band::new(0, None, Some(1.0));
        let b = Band::new(1, None, Some(3.0));
        assert_eq!(a.shared_bound(&b), None);
    }
}
