pub mod cart;
pub mod identity;
pub mod notify;
pub mod route;
pub mod user;

pub use cart::{CartStatus, CartType, GolfCart};
pub use route::Route;
pub use user::{DriverProfile, Role, User};
