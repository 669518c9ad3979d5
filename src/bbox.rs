//! Bounding box - rectangular lat/lon range for spatial queries

use serde::{Deserialize, Serialize};

/// A rectangular latitude/longitude range with inclusive edges.
///
/// Invariant: `south <= north`. East/west are treated as plain numeric
/// bounds; date-line wrapping is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Create a bounding box. Callers must pass `south <= north`.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        debug_assert!(south <= north, "bounding box has south > north");
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Whether a point lies within the box, edges inclusive
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south
            && latitude <= self.north
            && longitude >= self.west
            && longitude <= self.east
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}..{}] x [{}..{}]",
            self.south, self.north, self.west, self.east
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_inclusive_edges() {
        let bb = BoundingBox::new(10.0, 0.0, 10.0, 0.0);

        assert!(bb.contains(5.0, 5.0));
        assert!(bb.contains(10.0, 10.0)); // corner on the edge
        assert!(bb.contains(0.0, 0.0));
        assert!(!bb.contains(11.0, 5.0));
        assert!(!bb.contains(5.0, -0.1));
    }

    #[test]
    fn test_degenerate_box_is_a_point() {
        let bb = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        assert!(bb.contains(5.0, 5.0));
        assert!(!bb.contains(5.0, 5.1));
    }
}
