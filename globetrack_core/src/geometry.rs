//! Distance collaborators.
//!
//! The animator never does geodesy itself; it asks a `Geometry` for the
//! length of each segment. Two implementations ship here:
//! - `EllipsoidChord`: straight line between WGS84 Earth-centred Cartesian
//!   positions (what globe renderers measure between entity positions)
//! - `Haversine`: great-circle arc on a spherical Earth

use crate::track::GeoPoint;
use geo::{HaversineDistance, Point};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis (m)
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 first eccentricity squared
pub const WGS84_E2: f64 = 6.694_379_990_14e-3;

/// Measures the distance in metres between two points.
///
/// Implementations must return a finite, non-negative value for valid
/// input. Anything else fails the animation run.
pub trait Geometry: Send + Sync + 'static {
    fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64;
}

/// Chord length between Earth-centred, Earth-fixed positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EllipsoidChord;

impl EllipsoidChord {
    /// Converts geodetic coordinates to ECEF metres.
    pub fn to_ecef(point: &GeoPoint) -> Vector3<f64> {
        let lat = point.latitude.to_radians();
        let lon = point.longitude.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        // Prime vertical radius of curvature
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

        Vector3::new(
            (n + point.altitude) * cos_lat * cos_lon,
            (n + point.altitude) * cos_lat * sin_lon,
            (n * (1.0 - WGS84_E2) + point.altitude) * sin_lat,
        )
    }
}

impl Geometry for EllipsoidChord {
    fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        (Self::to_ecef(a) - Self::to_ecef(b)).norm()
    }
}

/// Great-circle distance, altitude ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl Geometry for Haversine {
    fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        let pa = Point::new(a.longitude, a.latitude);
        let pb = Point::new(b.longitude, b.latitude);
        pa.haversine_distance(&pb)
    }
}

/// Config-selectable geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    #[default]
    EllipsoidChord,
    Haversine,
}

impl GeometryKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EllipsoidChord => "ellipsoid_chord",
            Self::Haversine => "haversine",
        }
    }
}

impl std::str::FromStr for GeometryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chord" | "ellipsoid_chord" | "ecef" => Ok(Self::EllipsoidChord),
            "haversine" | "great_circle" => Ok(Self::Haversine),
            other => Err(format!("Unknown geometry: {}", other)),
        }
    }
}

impl Geometry for GeometryKind {
    fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        match self {
            Self::EllipsoidChord => EllipsoidChord.distance(a, b),
            Self::Haversine => Haversine.distance(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ecef_equator_prime_meridian() {
        let p = EllipsoidChord::to_ecef(&GeoPoint::surface(0.0, 0.0));
        assert_relative_eq!(p.x, WGS84_A, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_chord_altitude_only() {
        let ground = GeoPoint::new(-86.234842, 39.794542, 0.0);
        let above = GeoPoint::new(-86.234842, 39.794542, 3000.0);
        assert_relative_eq!(EllipsoidChord.distance(&ground, &above), 3000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_chord_and_haversine_agree_at_short_range() {
        // ~1.4 km apart near the speedway
        let a = GeoPoint::surface(-86.23, 39.79);
        let b = GeoPoint::surface(-86.24, 39.80);

        let chord = EllipsoidChord.distance(&a, &b);
        let arc = Haversine.distance(&a, &b);

        assert!(chord > 1000.0 && chord < 2000.0);
        // Sphere vs ellipsoid differ by well under one percent here
        assert_relative_eq!(chord, arc, max_relative = 0.01);
    }

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::surface(12.5, -45.0);
        assert_eq!(EllipsoidChord.distance(&p, &p), 0.0);
        assert_eq!(Haversine.distance(&p, &p), 0.0);
    }

    #[test]
    fn test_geometry_kind_parse() {
        assert_eq!("chord".parse::<GeometryKind>().unwrap(), GeometryKind::EllipsoidChord);
        assert_eq!("Haversine".parse::<GeometryKind>().unwrap(), GeometryKind::Haversine);
        assert!("flat".parse::<GeometryKind>().is_err());
    }
}
