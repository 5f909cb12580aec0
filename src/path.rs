//! Route path geometry as decoded coordinate sequences.
//!
//! Points are stored as (lat, lng) tuples for internal processing and map
//! rendering. Conversion from the optimizer's GeoJSON (lon, lat) order
//! happens at the boundary, when the response is received.

use serde::{Deserialize, Serialize};

/// An ordered sequence of (lat, lng) points tracing a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    points: Vec<(f64, f64)>,
}

impl PathGeometry {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Builds a path from GeoJSON coordinate pairs, which arrive in
    /// (lon, lat) order.
    pub fn from_geojson(coordinates: &[[f64; 2]]) -> Self {
        Self {
            points: coordinates.iter().map(|c| (c[1], c[0])).collect(),
        }
    }

    /// Degraded fallback path: origin followed by every stop in the given
    /// order, joined by straight segments instead of roads.
    pub fn straight_line(origin: (f64, f64), stops: &[(f64, f64)]) -> Self {
        let mut points = Vec::with_capacity(stops.len() + 1);
        points.push(origin);
        points.extend_from_slice(stops);
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
