//! # Artishine Discovery
//!
//! Discovery core for the Artishine craft marketplace:
//! - Proximity ranking of listings (Haversine, closest first, unknown last)
//! - Swipe deck sequencing with accept/reject decisions
//! - Marketplace API, IP geolocation and wishlist collaborators
//! - SQLite-backed session storage
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use artishine_discovery::{Decision, DiscoveryConfig, DiscoveryEngine, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DiscoveryConfig::from_env()?;
//!     let engine = Arc::new(DiscoveryEngine::from_config(&config)?);
//!
//!     let mut discovery = engine.start_session(SessionContext::anonymous()).await?;
//!     while let Some(item) = discovery.current() {
//!         println!("{} - {}", item.listing().display_name(), item.distance_label());
//!         discovery.decide(Decision::Reject).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod deck;
pub mod engine;
pub mod error;
pub mod providers;
pub mod ranking;
pub mod session;

// Re-export primary types
pub use config::DiscoveryConfig;
pub use self::core::{Coordinate, Listing, MapBounds, ProximityBand, RankedListing};
pub use deck::{DeckState, Decided, Decision, DiscoveryDeck};
pub use engine::{DecisionTally, DiscoveryEngine, DiscoverySession};
pub use error::{DiscoveryError, Result};
pub use ranking::{rank, GeoRanker, Ranker};
pub use session::{SessionContext, SessionStore, SqliteSessionStore, UserRole};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
