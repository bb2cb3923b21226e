pub mod geo;

use crate::core::{Coordinate, Listing, RankedListing};

pub use geo::GeoRanker;

/// Trait for turning fetched listings into a discovery queue
pub trait Ranker: Send + Sync {
    /// Annotate and order listings for the given viewer position.
    ///
    /// Must not mutate its inputs and must be deterministic for fixed input.
    fn rank(&self, listings: &[Listing], viewer: Option<&Coordinate>) -> Vec<RankedListing>;

    /// Get ranker name for logging
    fn name(&self) -> &str;
}

/// Rank with the default 50 km proximity threshold
pub fn rank(listings: &[Listing], viewer: Option<&Coordinate>) -> Vec<RankedListing> {
    GeoRanker::default().rank(listings, viewer)
}
