//! Geographic points and the ordered tracks built from them.

use serde::{Deserialize, Serialize};

/// A position on the globe in degrees, altitude in metres.
///
/// Field order follows the renderer's convention: longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

impl GeoPoint {
    pub const fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
        }
    }

    /// Point on the ellipsoid surface (altitude 0).
    pub const fn surface(longitude: f64, latitude: f64) -> Self {
        Self::new(longitude, latitude, 0.0)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.1}m)",
            self.longitude, self.latitude, self.altitude
        )
    }
}

/// Ordered waypoints. Index order is traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    points: Vec<GeoPoint>,
}

impl Track {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GeoPoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    /// Number of point-to-point segments.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// A marker needs somewhere to go: at least two points.
    pub fn is_animatable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }
}

impl FromIterator<GeoPoint> for Track {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_count() {
        assert_eq!(Track::default().segment_count(), 0);
        assert_eq!(Track::new(vec![GeoPoint::surface(0.0, 0.0)]).segment_count(), 0);

        let track: Track = (0..4).map(|i| GeoPoint::surface(i as f64, 0.0)).collect();
        assert_eq!(track.segment_count(), 3);
        assert!(track.is_animatable());
    }

    #[test]
    fn test_singleton_not_animatable() {
        let track = Track::new(vec![GeoPoint::surface(-86.23, 39.79)]);
        assert!(!track.is_animatable());
        assert_eq!(track.first(), track.last());
    }

    #[test]
    fn test_track_serializes_as_list() {
        let track = Track::new(vec![GeoPoint::surface(1.0, 2.0)]);
        let json = serde_json::to_string(&track).unwrap();
        assert_eq!(json, r#"[{"longitude":1.0,"latitude":2.0,"altitude":0.0}]"#);
    }
}
