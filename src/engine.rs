use std::sync::Arc;
use std::time::Instant;

use crate::config::DiscoveryConfig;
use crate::core::{Coordinate, RankedListing};
use crate::deck::{Decided, Decision, DiscoveryDeck};
use crate::error::{DiscoveryError, Result};
use crate::providers::{ApiClient, IpApiLocationProvider, ListingSource, LocationProvider, WishlistSink};
use crate::ranking::{GeoRanker, Ranker};
use crate::session::SessionContext;

/// Host that wires collaborators to the ranker and the deck
pub struct DiscoveryEngine {
    ranker: Arc<dyn Ranker>,
    listings: Arc<dyn ListingSource>,
    location: Arc<dyn LocationProvider>,
    wishlist: Arc<dyn WishlistSink>,
}

/// Accept/reject counts for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionTally {
    pub accepted: usize,
    pub rejected: usize,
}

impl DecisionTally {
    fn count(&mut self, decision: Decision) {
        match decision {
            Decision::Accept => self.accepted += 1,
            Decision::Reject => self.rejected += 1,
        }
    }
}

/// One browsing session: a viewer position resolved once and a deck over
/// the ranked queue
pub struct DiscoverySession {
    engine: Arc<DiscoveryEngine>,
    context: SessionContext,
    viewer: Option<Coordinate>,
    queue: Vec<RankedListing>,
    deck: DiscoveryDeck,
    tally: DecisionTally,
}

impl DiscoveryEngine {
    pub fn new(
        config: &DiscoveryConfig,
        listings: Arc<dyn ListingSource>,
        location: Arc<dyn LocationProvider>,
        wishlist: Arc<dyn WishlistSink>,
    ) -> Result<Self> {
        let ranker = GeoRanker::with_threshold(config.near_threshold_km)?;

        Ok(Self {
            ranker: Arc::new(ranker),
            listings,
            location,
            wishlist,
        })
    }

    /// Engine talking to the marketplace API and IP geolocation.
    ///
    /// Credentials come from the context given to `start_session`.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config.api_base_url, config.http_timeout())?);
        let location = Arc::new(IpApiLocationProvider::new(
            &config.location_base_url,
            config.http_timeout(),
        )?);

        Self::new(config, api.clone(), location, api)
    }

    /// Resolve the viewer once; failures degrade to an unknown position
    async fn resolve_viewer(&self) -> Option<Coordinate> {
        match self.location.resolve().await {
            Ok(Some(viewer)) => {
                tracing::debug!("Viewer at ({:.4}, {:.4})", viewer.lat(), viewer.lng());
                Some(viewer)
            }
            Ok(None) => {
                tracing::warn!("Location provider {} could not place the viewer", self.location.name());
                None
            }
            Err(e) => {
                tracing::warn!("Location provider {} failed: {}", self.location.name(), e);
                None
            }
        }
    }

    async fn build_queue(
        &self,
        context: &SessionContext,
        viewer: Option<&Coordinate>,
    ) -> Result<Vec<RankedListing>> {
        let listings = self.listings.fetch_listings(context).await?;
        tracing::debug!("Source {} returned {} listings", self.listings.name(), listings.len());

        Ok(self.ranker.rank(&listings, viewer))
    }

    /// Fetch, locate, rank and load a fresh deck.
    ///
    /// A listing fetch failure is returned and no session is created.
    pub async fn start_session(self: &Arc<Self>, context: SessionContext) -> Result<DiscoverySession> {
        let start = Instant::now();

        let (viewer, listings) = tokio::join!(
            self.resolve_viewer(),
            self.listings.fetch_listings(&context)
        );
        let listings = listings?;
        let queue = self.ranker.rank(&listings, viewer.as_ref());

        let mut deck = DiscoveryDeck::new();
        deck.load(queue.clone());

        tracing::info!(
            "Discovery session ready: {} listings, viewer {}, ranked by {} in {:.2}ms",
            queue.len(),
            if viewer.is_some() { "located" } else { "unknown" },
            self.ranker.name(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(DiscoverySession {
            engine: Arc::clone(self),
            context,
            viewer,
            queue,
            deck,
            tally: DecisionTally::default(),
        })
    }
}

impl DiscoverySession {
    pub fn current(&self) -> Option<&RankedListing> {
        self.deck.current()
    }

    pub fn viewer(&self) -> Option<&Coordinate> {
        self.viewer.as_ref()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn deck(&self) -> &DiscoveryDeck {
        &self.deck
    }

    /// The full ranked queue this session was loaded with
    pub fn queue(&self) -> &[RankedListing] {
        &self.queue
    }

    pub fn tally(&self) -> DecisionTally {
        self.tally
    }

    pub fn is_exhausted(&self) -> bool {
        self.deck.is_exhausted()
    }

    /// Decide on the current listing, then persist accepts.
    ///
    /// The deck advances before the wishlist call. A wishlist failure comes
    /// back as [`DiscoveryError::WishlistFailed`] holding the decided listing,
    /// with the deck already on the next one.
    pub async fn decide(&mut self, decision: Decision) -> Result<Decided> {
        let decided = self.deck.decide(decision)?;
        self.tally.count(decision);

        if decision == Decision::Accept {
            let wishlist = &self.engine.wishlist;
            if let Err(e) = wishlist
                .record(&self.context, decided.listing.listing(), decision)
                .await
            {
                tracing::warn!("Wishlist {} failed for {}: {}", wishlist.name(), decided.listing.id(), e);
                return Err(DiscoveryError::WishlistFailed {
                    decided: Box::new(decided),
                    source: Box::new(e),
                });
            }
        }

        Ok(decided)
    }

    /// Start over from the top of the same ranked queue
    pub fn restart(&mut self) {
        self.deck.load(self.queue.clone());
        self.tally = DecisionTally::default();
    }

    /// Re-fetch listings and rebuild the queue with the session's viewer.
    ///
    /// On failure the current deck is left untouched.
    pub async fn refresh(&mut self) -> Result<()> {
        let queue = self
            .engine
            .build_queue(&self.context, self.viewer.as_ref())
            .await?;
        tracing::info!("Discovery queue refreshed: {} listings", queue.len());

        self.deck.load(queue.clone());
        self.queue = queue;
        self.tally = DecisionTally::default();
        Ok(())
    }

    /// Withdraw the deck without a replacement
    pub fn withdraw(&mut self) {
        self.deck.reset();
    }
}
