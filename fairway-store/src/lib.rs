pub mod app_config;
pub mod directory;

pub use app_config::Config;
pub use directory::{Directory, DirectoryError};
