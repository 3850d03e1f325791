pub mod events;
pub mod geo;

pub use events::LiveEvent;
pub use geo::GeoPoint;
