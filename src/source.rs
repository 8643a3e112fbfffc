//! Where forecast records come from.
//!
//! The provider actor owns exactly one [`ForecastSource`]. The shipped
//! implementation replays a fixed, configured list so responses are
//! deterministic.

use crate::{Result, models::WeatherForecast};

pub trait ForecastSource: Send + 'static {
    /// Produce the current ordered sequence of forecasts.
    fn forecasts(&mut self) -> Result<Vec<WeatherForecast>>;
}

impl ForecastSource for Box<dyn ForecastSource> {
    fn forecasts(&mut self) -> Result<Vec<WeatherForecast>> {
        (**self).forecasts()
    }
}

/// Replays the same forecasts, in the same order, on every call.
#[derive(Debug, Clone, Default)]
pub struct StaticForecastSource {
    forecasts: Vec<WeatherForecast>,
}

impl StaticForecastSource {
    #[must_use]
    pub fn new(forecasts: Vec<WeatherForecast>) -> Self {
        Self { forecasts }
    }
}

impl ForecastSource for StaticForecastSource {
    fn forecasts(&mut self) -> Result<Vec<WeatherForecast>> {
        Ok(self.forecasts.clone())
    }
}
