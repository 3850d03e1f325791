pub mod fare;
pub mod live;
pub mod manager;
pub mod models;
pub mod rating;

pub use fare::FareSchedule;
pub use manager::{TripManager, TripError};
pub use models::{Trip, TripStatus};
