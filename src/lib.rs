//! Culex - weather forecast web API
//!
//! An HTTP endpoint that forwards each `GET /weatherforecast` request to a
//! singleton forecast provider actor and returns its answer unchanged.

pub mod api;
pub mod config;
pub mod error;
pub mod grain;
pub mod models;
pub mod source;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::CulexConfig;
pub use error::CulexError;
pub use grain::{ForecastKey, ForecastProvider, GrainDirectory, ProviderHandle};
pub use models::WeatherForecast;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CulexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
