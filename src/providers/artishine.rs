use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::core::Listing;
use crate::deck::Decision;
use crate::error::{DiscoveryError, Result};
use crate::providers::{ListingSource, WishlistSink};
use crate::session::{SessionContext, UserRole};

const PROVIDER: &str = "artishine";

/// Marketplace REST API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ArtisansResponse {
    #[serde(default)]
    artisans: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: UserRole,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(deserialize_with = "deserialize_id")]
    user_id: String,
    role: UserRole,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Accept IDs sent as either strings or integers
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    value_to_id(&value).ok_or_else(|| Error::custom(format!("Invalid id: {}", value)))
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coordinates arrive as numbers, numeric strings or null
fn value_to_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert one `/map/artisans` entry into a listing
fn artisan_to_listing(artisan: Value) -> Option<Listing> {
    let id = artisan
        .get("user_id")
        .or_else(|| artisan.get("id"))
        .and_then(value_to_id)?;
    let lat = value_to_f64(artisan.get("latitude"));
    let lng = value_to_f64(artisan.get("longitude"));

    Some(Listing::from_raw(id, lat, lng, artisan))
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn non-2xx responses into provider errors, keeping the server's `detail`
    async fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.detail)
            .map(|d| match d {
                Value::String(s) => s,
                other => other.to_string(),
            });

        Err(DiscoveryError::provider(
            PROVIDER,
            match detail {
                Some(detail) => format!("{} failed: HTTP {}: {}", what, status, detail),
                None => format!("{} failed: HTTP {}", what, status),
            },
        ))
    }

    /// Log in and return the resulting session
    pub async fn login(&self, email: &str, password: &str, role: UserRole) -> Result<SessionContext> {
        let response = self
            .client
            .post(self.url("/users/login"))
            .json(&LoginRequest { email, password, role })
            .send()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Login request failed: {}", e)))?;

        let login: LoginResponse = Self::check(response, "Login")
            .await?
            .json()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Invalid JSON: {}", e)))?;

        tracing::info!("Logged in as {} ({})", login.user_id, login.role.as_str());

        Ok(SessionContext::authenticated(login.user_id, login.access_token, login.role))
    }
}

#[async_trait]
impl ListingSource for ApiClient {
    async fn fetch_listings(&self, session: &SessionContext) -> Result<Vec<Listing>> {
        let request = Self::authorize(
            self.client.get(self.url("/map/artisans")),
            session.token.as_deref(),
        );

        let response = request
            .send()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Listing request failed: {}", e)))?;

        let body: ArtisansResponse = Self::check(response, "Listing fetch")
            .await?
            .json()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Invalid JSON: {}", e)))?;

        let total = body.artisans.len();
        let listings: Vec<Listing> = body
            .artisans
            .into_iter()
            .filter_map(artisan_to_listing)
            .collect();

        if listings.len() < total {
            tracing::warn!("Skipped {} artisans without an id", total - listings.len());
        }
        tracing::debug!("Fetched {} listings", listings.len());

        Ok(listings)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[async_trait]
impl WishlistSink for ApiClient {
    async fn record(
        &self,
        session: &SessionContext,
        listing: &Listing,
        decision: Decision,
    ) -> Result<()> {
        if decision == Decision::Reject {
            return Ok(());
        }

        let (user_id, token) = match (&session.user_id, &session.token) {
            (Some(user_id), Some(token)) => (user_id, token),
            _ => {
                return Err(DiscoveryError::Unauthenticated(
                    "log in to save items to your wishlist".to_string(),
                ))
            }
        };

        let mut body = match &listing.payload {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        body.insert("product_id".to_string(), Value::String(listing.id.clone()));

        let url = self.url(&format!("/wishlists/{}", urlencoding::encode(user_id)));
        let request = Self::authorize(self.client.post(url).json(&body), Some(token.as_str()));

        let response = request
            .send()
            .await
            .map_err(|e| DiscoveryError::provider(PROVIDER, format!("Wishlist request failed: {}", e)))?;
        Self::check(response, "Wishlist add").await?;

        tracing::debug!("Wishlisted {} for {}", listing.id, user_id);
        Ok(())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_artisan_to_listing() {
        let listing = artisan_to_listing(json!({
            "user_id": 17,
            "shop_name": "Clay Works",
            "latitude": "13.0067",
            "longitude": 80.2570
        }))
        .unwrap();

        assert_eq!(listing.id, "17");
        assert_eq!(listing.coordinate.unwrap().lat(), 13.0067);
        assert_eq!(listing.payload["shop_name"], "Clay Works");

        assert!(artisan_to_listing(json!({"name": "no id"})).is_none());
        assert!(artisan_to_listing(json!({"id": "x", "latitude": null}))
            .unwrap()
            .coordinate
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_listings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/map/artisans"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artisans": [
                    {"user_id": "a1", "latitude": 13.0067, "longitude": 80.2570},
                    {"user_id": "a2"},
                    {"user_id": "a3", "latitude": 200.0, "longitude": 80.0},
                    {"name": "orphan"}
                ]
            })))
            .mount(&server)
            .await;

        let listings = client_for(&server).fetch_listings(&SessionContext::anonymous()).await.unwrap();

        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        assert!(listings[0].coordinate.is_some());
        assert!(listings[1].coordinate.is_none());
        assert!(listings[2].coordinate.is_none());
    }

    #[tokio::test]
    async fn test_fetch_listings_missing_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/map/artisans"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let listings = client_for(&server)
            .fetch_listings(&SessionContext::anonymous())
            .await
            .unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_listings_uses_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/map/artisans"))
            .and(header("authorization", "Bearer tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artisans": [{"user_id": "a1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = SessionContext::authenticated("u2", "tok-2", UserRole::Buyer);
        let listings = client_for(&server).fetch_listings(&session).await.unwrap();
        assert_eq!(listings.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_listings_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_listings(&SessionContext::anonymous()).await.unwrap_err();
        assert!(err.to_string().contains("db down"));
    }

    #[tokio::test]
    async fn test_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .and(body_partial_json(json!({"email": "a@b.c", "role": "buyer"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "user_id": 9,
                "role": "buyer"
            })))
            .mount(&server)
            .await;

        let session = client_for(&server)
            .login("a@b.c", "pw", UserRole::Buyer)
            .await
            .unwrap();

        assert_eq!(session, SessionContext::authenticated("9", "tok", UserRole::Buyer));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login("a@b.c", "bad", UserRole::Buyer)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_record_accept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wishlists/u1"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({"product_id": "p1", "title": "Vase"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let session = SessionContext::authenticated("u1", "tok", UserRole::Buyer);
        let listing = Listing::new("p1").with_payload(json!({"title": "Vase"}));

        client_for(&server)
            .record(&session, &listing, Decision::Accept)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_record_reject_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let session = SessionContext::authenticated("u1", "tok", UserRole::Buyer);
        client_for(&server)
            .record(&session, &Listing::new("p1"), Decision::Reject)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_record_requires_login() {
        let server = MockServer::start().await;
        let err = client_for(&server)
            .record(&SessionContext::anonymous(), &Listing::new("p1"), Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Unauthenticated(_)));
    }
}
