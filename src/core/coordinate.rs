use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in degrees.
///
/// Latitude is within `-90..=90` and longitude within `-180..=180`;
/// the only ways to build one check that range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = DiscoveryError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate { lat: c.lat, lng: c.lng }
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        Self::try_new(lat, lng).ok_or(DiscoveryError::InvalidCoordinate { lat, lng })
    }

    /// Lenient constructor for upstream data: malformed values become `None`
    pub fn try_new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        valid.then_some(Self { lat, lng })
    }

    pub(crate) fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to `other` in kilometres
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Haversine distance between two coordinates in kilometres
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    // Rounding can push h just past 1 for antipodal points
    let h = ((d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chennai() -> Coordinate {
        Coordinate::new(13.0827, 80.2707).unwrap()
    }

    #[test]
    fn test_coordinate_range() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(200.0, 10.0).is_err());
        assert!(Coordinate::new(10.0, -181.0).is_err());
        assert!(Coordinate::try_new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::try_new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_zero_distance() {
        assert_eq!(chennai().distance_km(&chennai()), 0.0);
    }

    #[test]
    fn test_chennai_adyar() {
        let adyar = Coordinate::new(13.0067, 80.2570).unwrap();
        let d = chennai().distance_km(&adyar);
        assert!((d - 8.57).abs() < 0.2, "got {d}");
    }

    #[test]
    fn test_chennai_delhi() {
        let delhi = Coordinate::new(28.6139, 77.2090).unwrap();
        let d = haversine_km(&chennai(), &delhi);
        assert!((d - 1757.0).abs() < 10.0, "got {d}");
        assert_eq!(d, haversine_km(&delhi, &chennai()));
    }

    #[test]
    fn test_antipodal_is_finite() {
        let a = Coordinate::new(-70.877, 10.0).unwrap();
        let b = Coordinate::new(70.877, -170.0).unwrap();
        let d = a.distance_km(&b);
        assert!(d.is_finite(), "got {d}");
        assert!((d - 20015.0).abs() < 1.0, "got {d}");

        for n in 0..90 {
            let lat = n as f64 + 0.123;
            let p = Coordinate::new(-lat, 10.0).unwrap();
            let q = Coordinate::new(lat, -170.0).unwrap();
            assert!(p.distance_km(&q).is_finite(), "NaN at lat {lat}");
        }
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let ok: Coordinate = serde_json::from_str(r#"{"lat": 1.0, "lng": 2.0}"#).unwrap();
        assert_eq!(ok.lat(), 1.0);
        assert!(serde_json::from_str::<Coordinate>(r#"{"lat": 200.0, "lng": 2.0}"#).is_err());
    }
}
