pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

pub use sqlite::SqliteSessionStore;

/// Marketplace role returned at login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Artisan,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Buyer => "buyer",
            UserRole::Artisan => "artisan",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buyer" => Ok(UserRole::Buyer),
            "artisan" => Ok(UserRole::Artisan),
            other => Err(DiscoveryError::Other(format!("Unknown role: {}", other))),
        }
    }
}

/// Who is browsing. Passed explicitly to whatever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub user_id: Option<String>,

    /// Bearer token for the marketplace API
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub role: Option<UserRole>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(
        user_id: impl Into<String>,
        token: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            token: Some(token.into()),
            role: Some(role),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }
}

/// Trait for persisting the session between runs
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session (anonymous when nothing is stored)
    async fn load(&self) -> Result<SessionContext>;

    /// Replace the stored session
    async fn save(&self, session: &SessionContext) -> Result<()>;

    /// Forget the stored session
    async fn clear(&self) -> Result<()>;
}
