pub mod bounds;
pub mod coordinate;
pub mod listing;
pub mod ranked;

pub use bounds::{map_center, MapBounds, DEFAULT_MAP_CENTER};
pub use coordinate::{haversine_km, Coordinate, EARTH_RADIUS_KM};
pub use listing::Listing;
pub use ranked::{ProximityBand, RankedListing, DEFAULT_NEAR_THRESHOLD_KM};
