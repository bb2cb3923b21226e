use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::core::Coordinate;
use crate::error::{DiscoveryError, Result};
use crate::providers::LocationProvider;

const PROVIDER: &str = "ipapi";

/// IP-geolocation lookup (ipapi.co compatible)
pub struct IpApiLocationProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl IpApiLocationProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LocationProvider for IpApiLocationProvider {
    async fn resolve(&self) -> Result<Option<Coordinate>> {
        let url = format!("{}/json/", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DiscoveryError::provider(PROVIDER, format!("HTTP {}", response.status())));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Invalid JSON: {}", e)))?;

        if body.error {
            tracing::warn!(
                "IP geolocation refused: {}",
                body.reason.as_deref().unwrap_or("no reason given")
            );
            return Ok(None);
        }

        let coordinate = match (body.latitude, body.longitude) {
            (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng),
            _ => None,
        };

        if coordinate.is_none() {
            tracing::debug!("IP geolocation returned no usable coordinate");
        }

        Ok(coordinate)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
