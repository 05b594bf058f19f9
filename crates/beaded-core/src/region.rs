//! Region of interest: a simple closed polygon in geographic coordinates.

use geo::{BoundingRect, Centroid, Contains, Coord, Intersects, Line, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Closed polygon of (longitude, latitude) vertices.
#[derive(Clone, Debug)]
pub struct Region {
    polygon: Polygon<f64>,
}

/// Serializable vertex list, as it appears in pipeline configs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// `[lon, lat]` pairs. The closing vertex may be omitted.
    pub vertices: Vec<[f64; 2]>,
}

impl Region {
    /// Build a region from an ordered vertex ring.
    ///
    /// The ring is closed automatically. Fails on fewer than three distinct
    /// vertices, non-finite coordinates, or a self-intersecting ring.
    pub fn new(vertices: &[(f64, f64)]) -> Result<Self> {
        if let Some(bad) = vertices
            .iter()
            .find(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(invalid(format!("non-finite vertex {bad:?}")));
        }

        let mut ring: Vec<Coord<f64>> = vertices.iter().map(|&(x, y)| Coord { x, y }).collect();
        ring.dedup();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(invalid(format!(
                "need at least 3 distinct vertices, got {}",
                ring.len()
            )));
        }
        if !is_simple(&ring) {
            return Err(invalid("ring self-intersects".into()));
        }

        ring.push(ring[0]);
        Ok(Self {
            polygon: Polygon::new(LineString::new(ring), vec![]),
        })
    }

    /// Build from a flat `lon, lat, lon, lat, ...` list.
    pub fn from_flat(coords: &[f64]) -> Result<Self> {
        if coords.len() % 2 != 0 {
            return Err(invalid(format!(
                "flat coordinate list has odd length {}",
                coords.len()
            )));
        }
        let pairs: Vec<(f64, f64)> = coords.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        Self::new(&pairs)
    }

    pub fn from_config(config: &RegionConfig) -> Result<Self> {
        let pairs: Vec<(f64, f64)> = config.vertices.iter().map(|v| (v[0], v[1])).collect();
        Self::new(&pairs)
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> Vec<(f64, f64)> {
        let coords = &self.polygon.exterior().0;
        coords[..coords.len() - 1]
            .iter()
            .map(|c| (c.x, c.y))
            .collect()
    }

    /// Strict interior test; points on the boundary are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.polygon.contains(&Point::new(x, y))
    }

    pub fn centroid(&self) -> (f64, f64) {
        // A validated ring always has non-zero extent.
        self.polygon
            .centroid()
            .map(|p| (p.x(), p.y()))
            .unwrap_or_else(|| {
                let c = self.polygon.exterior().0[0];
                (c.x, c.y)
            })
    }

    pub fn bounding_rect(&self) -> Rect<f64> {
        self.polygon
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }))
    }

    /// Whether the region's bounding box overlaps `rect`.
    pub fn overlaps(&self, rect: &Rect<f64>) -> bool {
        self.bounding_rect().intersects(rect)
    }
}

fn invalid(msg: String) -> crate::error::BeadedError {
    ConfigurationError::InvalidRegion(msg).into()
}

/// No two non-adjacent edges of the (open) ring may touch.
fn is_simple(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    let edges: Vec<Line<f64>> = (0..n).map(|i| Line::new(ring[i], ring[(i + 1) % n])).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if !adjacent && edges[i].intersects(&edges[j]) {
                return false;
            }
        }
    }
    true
}
