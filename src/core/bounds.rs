use serde::{Deserialize, Serialize};

use crate::core::Coordinate;

/// Map centre used when no listing has a coordinate (centre of India)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (22.9734, 78.6569);

/// Bounding envelope of a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl MapBounds {
    /// Envelope of all coordinates, `None` when there are none
    pub fn from_coordinates<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        coords.into_iter().fold(None, |acc, c| {
            Some(match acc {
                None => MapBounds {
                    north: c.lat(),
                    south: c.lat(),
                    east: c.lng(),
                    west: c.lng(),
                },
                Some(b) => MapBounds {
                    north: b.north.max(c.lat()),
                    south: b.south.min(c.lat()),
                    east: b.east.max(c.lng()),
                    west: b.west.min(c.lng()),
                },
            })
        })
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.south..=self.north).contains(&c.lat()) && (self.west..=self.east).contains(&c.lng())
    }
}

/// Mean of the coordinates, or [`DEFAULT_MAP_CENTER`] when empty
pub fn map_center<'a, I>(coords: I) -> Coordinate
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let (sum_lat, sum_lng, n) = coords
        .into_iter()
        .fold((0.0, 0.0, 0usize), |(lat, lng, n), c| (lat + c.lat(), lng + c.lng(), n + 1));

    let (lat, lng) = if n == 0 {
        DEFAULT_MAP_CENTER
    } else {
        (sum_lat / n as f64, sum_lng / n as f64)
    };

    // Means of in-range values stay in range
    Coordinate::new_unchecked(lat, lng)
}
