pub mod artishine;
pub mod ipapi;

use async_trait::async_trait;

use crate::core::{Coordinate, Listing};
use crate::deck::Decision;
use crate::error::Result;
use crate::session::SessionContext;

pub use artishine::ApiClient;
pub use ipapi::IpApiLocationProvider;

/// Trait for viewer location lookups (IP geolocation, GPS, fixed)
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Approximate viewer position, `None` when it cannot be determined
    async fn resolve(&self) -> Result<Option<Coordinate>>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Trait for listing sources (marketplace API, fixtures)
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch every listing available for discovery, in source order.
    ///
    /// `session` supplies credentials when the source needs them.
    async fn fetch_listings(&self, session: &SessionContext) -> Result<Vec<Listing>>;

    /// Get source name
    fn name(&self) -> &str;
}

/// Trait for persisting swipe decisions
#[async_trait]
pub trait WishlistSink: Send + Sync {
    /// Record `decision` on `listing` for the session's user
    async fn record(
        &self,
        session: &SessionContext,
        listing: &Listing,
        decision: Decision,
    ) -> Result<()>;

    /// Get sink name
    fn name(&self) -> &str;
}

/// Location provider that always answers with the same position
pub struct FixedLocation(pub Option<Coordinate>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn resolve(&self) -> Result<Option<Coordinate>> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Listing source backed by an in-memory list (fixtures, offline files)
pub struct StaticListings(pub Vec<Listing>);

#[async_trait]
impl ListingSource for StaticListings {
    async fn fetch_listings(&self, _: &SessionContext) -> Result<Vec<Listing>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_location() {
        let here = Coordinate::new(13.0827, 80.2707).unwrap();
        assert_eq!(tokio_test::block_on(FixedLocation(Some(here)).resolve()).unwrap(), Some(here));
        assert_eq!(tokio_test::block_on(FixedLocation(None).resolve()).unwrap(), None);
    }

    #[test]
    fn test_static_listings_keep_order() {
        let source = StaticListings(vec![Listing::new("b"), Listing::new("a")]);
        let fetched = tokio_test::block_on(source.fetch_listings(&SessionContext::anonymous())).unwrap();
        let ids: Vec<&str> = fetched.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
