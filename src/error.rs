use thiserror::Error;

use crate::deck::Decided;

/// Main error type for discovery
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Deck operation called in a state that does not allow it
    #[error("Invalid deck state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Latitude/longitude outside the geographic range
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// The deck advanced but persisting the decision failed.
    ///
    /// Carries the decided listing so the host can retry or report it.
    #[error("Wishlist failed for listing {}: {}", .decided.listing.id(), .source)]
    WishlistFailed {
        decided: Box<Decided>,
        source: Box<DiscoveryError>,
    },

    /// Operation needs a logged-in session
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl DiscoveryError {
    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        DiscoveryError::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// The decision a failed wishlist call belonged to
    pub fn decided(&self) -> Option<&Decided> {
        match self {
            DiscoveryError::WishlistFailed { decided, .. } => Some(&**decided),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DiscoveryError>;
