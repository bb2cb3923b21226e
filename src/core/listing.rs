use serde::{Deserialize, Deserializer, Serialize};

use crate::core::Coordinate;

/// A product or artisan entry offered for discovery.
///
/// The payload is whatever the API returned for display; ranking and the
/// deck never look inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing ID
    pub id: String,

    /// Artisan's registered location, if known and valid
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub coordinate: Option<Coordinate>,

    /// Opaque display data
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Malformed or out-of-range pairs drop the coordinate instead of failing
/// the whole document
fn lenient_coordinate<'de, D>(deserializer: D) -> std::result::Result<Option<Coordinate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value) if !value.is_null() => value,
        _ => return Ok(None),
    };

    let lat = value.get("lat").and_then(serde_json::Value::as_f64);
    let lng = value.get("lng").and_then(serde_json::Value::as_f64);
    let coordinate = lat.zip(lng).and_then(|(lat, lng)| Coordinate::try_new(lat, lng));

    if coordinate.is_none() {
        tracing::debug!("Dropping malformed listing coordinate {}", value);
    }
    Ok(coordinate)
}

impl Listing {
    /// Create a listing with no coordinate and an empty payload
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinate: None,
            payload: serde_json::Value::Null,
        }
    }

    /// Build a listing from raw upstream values.
    ///
    /// A missing half or an out-of-range pair leaves the coordinate unset.
    pub fn from_raw(
        id: impl Into<String>,
        lat: Option<f64>,
        lng: Option<f64>,
        payload: serde_json::Value,
    ) -> Self {
        let coordinate = match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng),
            _ => None,
        };

        Self {
            id: id.into(),
            coordinate,
            payload,
        }
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Title for logs and terminal output, falling back to the ID
    pub fn display_name(&self) -> String {
        ["title", "shop_name", "name"]
            .iter()
            .find_map(|key| self.payload.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.clone())
    }
}
