//! Polygon inputs and bounding regions.
//!
//! The pipeline core never parses files or touches coordinate reference
//! systems: a [`PolygonSet`] arrives already expressed in WGS84 lon/lat
//! degrees (the tiling scheme's native frame) and is treated as read-only.

use geo::BoundingRect;
use geo_types::{Geometry, Polygon, Rect, coord};
use serde::{Deserialize, Serialize};

use crate::error::{ProspectError, Result};

/// A tagged, read-only collection of planar polygons for one rock type.
#[derive(Clone, Debug)]
pub struct PolygonSet {
    tag: String,
    polygons: Vec<Polygon<f64>>,
}

impl PolygonSet {
    /// Wraps polygons under a short tag ("a", "b", "serpentinite", ...).
    ///
    /// The tag names the set in logs and keys its cache entries.
    pub fn new(tag: impl Into<String>, polygons: Vec<Polygon<f64>>) -> Self {
        Self {
            tag: tag.into(),
            polygons,
        }
    }

    /// Tag identifying this set.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The polygons themselves.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Number of polygons in the set.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Whether the set holds no polygons at all.
    ///
    /// An empty set is a valid input: every cell's intersection flag is
    /// false and its distance field stays undefined.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Axis-aligned extent of all member polygons, or `None` when empty.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.polygons
            .iter()
            .filter_map(|p| p.bounding_rect())
            .map(BoundingBox::from_rect)
            .reduce(BoundingBox::union)
    }
}

/// Geographic bounding box in WGS84 degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Builds a box from its four edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Converts a `geo` bounding rectangle.
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            west: rect.min().x,
            south: rect.min().y,
            east: rect.max().x,
            north: rect.max().y,
        }
    }

    /// Smallest box containing both inputs.
    pub fn union(self, other: Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// True when the box has no area (or non-finite edges).
    ///
    /// A degenerate bounding region fails the grid build with a
    /// configuration error rather than yielding a silent empty grid.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite();
        !finite || self.east <= self.west || self.north <= self.south
    }

    /// The box as a closed polygon ring, for cell-covering enumeration.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
        .to_polygon()
    }
}

/// Parses a WKT string into a `geo` geometry.
pub fn parse_wkt(input: &str) -> Result<Geometry<f64>> {
    use std::str::FromStr;
    wkt::Wkt::from_str(input)
        .map_err(|e| ProspectError::WktParse(format!("{e:?}")))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| ProspectError::WktParse(format!("{e:?}")))
        })
}
