//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Smallest box containing every finite point, or None if there are none.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points
            .into_iter()
            .filter(|(lon, lat)| lon.is_finite() && lat.is_finite())
            .fold(None, |acc: Option<BoundingBox>, (lon, lat)| {
                let point = BoundingBox::new(lon, lat, lon, lat);
                Some(match acc {
                    Some(bbox) => bbox.union(&point),
                    None => point,
                })
            })
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_skips_nan() {
        let bbox = BoundingBox::from_points(vec![
            (12.0, 44.0),
            (f64::NAN, 50.0),
            (14.5, 41.0),
            (13.0, f64::NAN),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(12.0, 41.0, 14.5, 44.0));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_contains_and_center() {
        let bbox = BoundingBox::new(-6.0, 30.0, 36.0, 46.0);
        assert!(bbox.contains(15.0, 38.0));
        assert!(!bbox.contains(40.0, 38.0));
        assert_eq!(bbox.center(), (15.0, 38.0));
        assert_eq!(bbox.width(), 42.0);
        assert_eq!(bbox.height(), 16.0);
    }
}
