//! System orchestration, startup, and shutdown logic.

pub mod config;
pub mod error;
pub mod store_system;
pub mod telemetry;

pub use config::StoreConfig;
pub use error::SystemError;
pub use store_system::StoreSystem;
pub use telemetry::setup_tracing;
