use serde::{Deserialize, Serialize};

use crate::core::Listing;

/// Default distance (km) up to which a listing counts as near
pub const DEFAULT_NEAR_THRESHOLD_KM: f64 = 50.0;

/// Coarse distance classification used for display labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityBand {
    /// Within the threshold (boundary included)
    Near,
    /// Beyond the threshold
    Far,
    /// No distance available
    Unknown,
}

impl ProximityBand {
    pub fn from_distance(distance_km: Option<f64>, threshold_km: f64) -> Self {
        match distance_km {
            Some(d) if d <= threshold_km => ProximityBand::Near,
            Some(_) => ProximityBand::Far,
            None => ProximityBand::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProximityBand::Near => "near",
            ProximityBand::Far => "far",
            ProximityBand::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProximityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing annotated with its distance from the viewer.
///
/// The band is computed from the distance at construction and has no setter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedListing {
    listing: Listing,
    distance_km: Option<f64>,
    band: ProximityBand,
}

impl RankedListing {
    pub fn new(listing: Listing, distance_km: Option<f64>, threshold_km: f64) -> Self {
        Self {
            listing,
            distance_km,
            band: ProximityBand::from_distance(distance_km, threshold_km),
        }
    }

    pub fn id(&self) -> &str {
        &self.listing.id
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn into_listing(self) -> Listing {
        self.listing
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    pub fn band(&self) -> ProximityBand {
        self.band
    }

    /// Human-readable distance badge
    pub fn distance_label(&self) -> String {
        match self.distance_km {
            None => "Distance unknown".to_string(),
            Some(d) if d < 1.0 => "< 1 km away".to_string(),
            Some(d) if d < 100.0 => format!("{:.1} km away", d),
            Some(d) => format!("{:.0} km away", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundary() {
        let t = DEFAULT_NEAR_THRESHOLD_KM;
        assert_eq!(ProximityBand::from_distance(Some(50.0), t), ProximityBand::Near);
        assert_eq!(ProximityBand::from_distance(Some(50.0001), t), ProximityBand::Far);
        assert_eq!(ProximityBand::from_distance(Some(0.0), t), ProximityBand::Near);
        assert_eq!(ProximityBand::from_distance(None, t), ProximityBand::Unknown);
    }

    #[test]
    fn test_band_follows_distance() {
        let ranked = RankedListing::new(Listing::new("a"), Some(120.0), 50.0);
        assert_eq!(ranked.band(), ProximityBand::Far);

        let ranked = RankedListing::new(Listing::new("a"), None, 50.0);
        assert_eq!(ranked.band(), ProximityBand::Unknown);
    }

    #[test]
    fn test_distance_label() {
        let label = |d| RankedListing::new(Listing::new("a"), d, 50.0).distance_label();
        assert_eq!(label(None), "Distance unknown");
        assert_eq!(label(Some(0.4)), "< 1 km away");
        assert_eq!(label(Some(8.58)), "8.6 km away");
        assert_eq!(label(Some(1755.8)), "1756 km away");
    }

    #[test]
    fn test_band_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ProximityBand::Near).unwrap(), "\"near\"");
    }
}
