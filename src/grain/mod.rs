//! Forecast provider grain
//!
//! This module provides the provider side of the service:
//! - The [`ForecastProvider`] capability the HTTP layer depends on
//! - The sentinel [`ForecastKey`] that addresses the single provider instance
//! - An actor runtime ([`ProviderHandle`]) serving calls from a mailbox
//! - A [`GrainDirectory`] that activates one actor per key on first use

use std::fmt::Display;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Result, models::WeatherForecast};

pub mod actor;
pub mod directory;

pub use actor::{ProviderHandle, ProviderOptions};
pub use directory::{GrainDirectory, GrainReference};

/// Anything that can answer a forecast request.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn get_forecast(&self) -> Result<Vec<WeatherForecast>>;
}

/// Identity of a provider activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForecastKey(Uuid);

impl ForecastKey {
    /// The nil UUID. Every caller addresses the provider through this key.
    pub const EMPTY: Self = Self(Uuid::nil());
}

impl Display for ForecastKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
