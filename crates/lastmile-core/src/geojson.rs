//! # GeoJSON Interchange
//!
//! Polygon ring conversion for bulk zone import/export.
//!
//! ## The Coordinate-Order Swap
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GeoJSON (wire)             Internal (everywhere else)                  │
//! │                                                                         │
//! │  [lng, lat] pairs    ◄──►   Point { lat, lng }                          │
//! │                                                                         │
//! │  This module is the ONLY place the order flips. Import also            │
//! │  auto-closes open rings and discards rings that are still too          │
//! │  short; export re-closes and re-swaps.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::Point;
use crate::types::Zone;
use crate::MIN_RING_POINTS;

// =============================================================================
// Wire Types
// =============================================================================

/// A GeoJSON FeatureCollection of polygon zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

/// A single GeoJSON feature carrying one zone polygon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Always `"Feature"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub geometry: Geometry,
}

/// A GeoJSON geometry. Only single-ring polygons are meaningful here;
/// anything else is skipped at import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    /// `"Polygon"` for zone features.
    #[serde(rename = "type")]
    pub kind: String,
    /// Rings of [lng, lat] positions. Import reads only the outer ring
    /// (holes are out of scope).
    #[serde(default)]
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

impl FeatureCollection {
    /// Checks the wrapper type tag.
    pub fn is_valid(&self) -> bool {
        self.kind == "FeatureCollection"
    }
}

// =============================================================================
// Ring Conversion
// =============================================================================

/// Converts a wire ring of [lng, lat] positions into an internal closed
/// (lat, lng) ring.
///
/// - Each position must carry exactly 2 numbers (wrong arity is rejected)
/// - The order swap happens here
/// - An open ring is auto-closed by repeating the first vertex
/// - A ring with fewer than 4 points *after* closing is rejected
pub fn ring_from_lnglat(wire: &[Vec<f64>]) -> Result<Vec<Point>, ValidationError> {
    let mut ring = Vec::with_capacity(wire.len() + 1);
    for position in wire {
        if position.len() != 2 {
            return Err(ValidationError::InvalidFormat {
                field: "coordinates".to_string(),
                reason: format!("position must have 2 numbers, got {}", position.len()),
            });
        }
        ring.push(Point::new(position[1], position[0]));
    }

    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }

    if ring.len() < MIN_RING_POINTS {
        return Err(ValidationError::RingTooShort {
            got: ring.len(),
            min: MIN_RING_POINTS,
        });
    }

    Ok(ring)
}

/// Converts an internal (lat, lng) ring to wire [lng, lat] positions.
pub fn ring_to_lnglat(ring: &[Point]) -> Vec<Vec<f64>> {
    ring.iter().map(|p| vec![p.lng, p.lat]).collect()
}

/// Builds the export feature for a zone, mirroring the import properties.
pub fn feature_from_zone(zone: &Zone) -> Feature {
    let mut properties = serde_json::Map::new();
    properties.insert("zone_id".to_string(), zone.id.clone().into());
    properties.insert("warehouse_id".to_string(), zone.warehouse_id.clone().into());
    properties.insert("name".to_string(), zone.name.clone().into());
    properties.insert("color".to_string(), zone.color.clone().into());

    Feature {
        kind: "Feature".to_string(),
        properties,
        geometry: Geometry {
            kind: "Polygon".to_string(),
            coordinates: vec![ring_to_lnglat(&zone.ring)],
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_swaps_and_closes() {
        // Unclosed [lng, lat] rectangle; must come back as a closed
        // (lat, lng) ring of 5 points with the first repeated at the end.
        let wire = vec![
            vec![77.10, 28.70],
            vec![77.28, 28.70],
            vec![77.28, 28.52],
            vec![77.10, 28.52],
        ];

        let ring = ring_from_lnglat(&wire).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], Point::new(28.70, 77.10));
        assert_eq!(ring[1], Point::new(28.70, 77.28));
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn test_import_keeps_already_closed_ring() {
        let wire = vec![
            vec![77.10, 28.70],
            vec![77.28, 28.70],
            vec![77.28, 28.52],
            vec![77.10, 28.70],
        ];
        let ring = ring_from_lnglat(&wire).unwrap();
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_import_rejects_short_ring() {
        // Two points close to three - still under the minimum.
        let wire = vec![vec![77.10, 28.70], vec![77.28, 28.70]];
        let err = ring_from_lnglat(&wire).unwrap_err();
        assert!(matches!(err, ValidationError::RingTooShort { got: 3, .. }));
    }

    #[test]
    fn test_import_rejects_wrong_arity() {
        let wire = vec![
            vec![77.10, 28.70, 100.0],
            vec![77.28, 28.70],
            vec![77.28, 28.52],
            vec![77.10, 28.52],
        ];
        assert!(matches!(
            ring_from_lnglat(&wire),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_round_trip_preserves_ring() {
        let wire = vec![
            vec![77.10, 28.70],
            vec![77.28, 28.70],
            vec![77.28, 28.52],
            vec![77.10, 28.52],
        ];
        let ring = ring_from_lnglat(&wire).unwrap();
        let back = ring_to_lnglat(&ring);

        // Export of the closed ring: original 4 positions + closing point.
        assert_eq!(back.len(), 5);
        assert_eq!(back[0], vec![77.10, 28.70]);
        assert_eq!(back[4], vec![77.10, 28.70]);
    }
}
