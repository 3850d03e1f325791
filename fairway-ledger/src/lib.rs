pub mod engine;
pub mod models;

pub use engine::{LedgerEngine, LedgerError};
pub use models::{Payment, PaymentDirection, PaymentStatus, Wallet};
