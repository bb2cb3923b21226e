use std::cmp::Ordering;

use crate::core::{Coordinate, Listing, RankedListing, DEFAULT_NEAR_THRESHOLD_KM};
use crate::error::{DiscoveryError, Result};
use crate::ranking::Ranker;

/// Proximity ranker: closest first, unknown distances last.
///
/// Ties keep their input order, so a fixed input always yields the same queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRanker {
    near_threshold_km: f64,
}

impl GeoRanker {
    pub fn new() -> Self {
        Self {
            near_threshold_km: DEFAULT_NEAR_THRESHOLD_KM,
        }
    }

    /// Ranker with a custom near/far boundary
    pub fn with_threshold(near_threshold_km: f64) -> Result<Self> {
        if !near_threshold_km.is_finite() || near_threshold_km < 0.0 {
            return Err(DiscoveryError::Config(format!(
                "near threshold must be a non-negative number of km, got {}",
                near_threshold_km
            )));
        }

        Ok(Self { near_threshold_km })
    }

    pub fn near_threshold_km(&self) -> f64 {
        self.near_threshold_km
    }
}

impl Default for GeoRanker {
    fn default() -> Self {
        Self::new()
    }
}

/// `None` sorts after every distance
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Ranker for GeoRanker {
    fn rank(&self, listings: &[Listing], viewer: Option<&Coordinate>) -> Vec<RankedListing> {
        let mut ranked: Vec<RankedListing> = listings
            .iter()
            .map(|listing| {
                let distance = match (viewer, listing.coordinate.as_ref()) {
                    (Some(viewer), Some(coord)) => Some(viewer.distance_km(coord)),
                    _ => None,
                };
                RankedListing::new(listing.clone(), distance, self.near_threshold_km)
            })
            .collect();

        // Vec::sort_by is stable
        ranked.sort_by(|a, b| compare_distance(a.distance_km(), b.distance_km()));

        tracing::debug!(
            "Ranked {} listings ({} with distance, viewer {})",
            ranked.len(),
            ranked.iter().filter(|r| r.distance_km().is_some()).count(),
            if viewer.is_some() { "known" } else { "unknown" }
        );

        ranked
    }

    fn name(&self) -> &str {
        "geo"
    }
}
