//! Weather forecast record

use chrono::NaiveDate;
use serde::Deserialize;

/// Divisor of the Celsius to Fahrenheit approximation (1 / 1.8, rounded).
const CELSIUS_PER_FAHRENHEIT: f64 = 0.5556;

/// A single forecast point: date, temperature and an optional summary.
///
/// Fahrenheit is never stored. It is derived from `temperature_c` on every
/// call to [`WeatherForecast::temperature_f`], and any `temperatureF` found
/// on the wire is ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherForecast {
    pub date: NaiveDate,
    #[serde(rename = "temperatureC")]
    pub temperature_c: i32,
    #[serde(default)]
    pub summary: Option<String>,
}

impl WeatherForecast {
    #[must_use]
    pub fn new(date: NaiveDate, temperature_c: i32, summary: Option<String>) -> Self {
        Self {
            date,
            temperature_c,
            summary,
        }
    }

    /// Temperature in Fahrenheit, truncated toward zero.
    #[must_use]
    pub fn temperature_f(&self) -> i32 {
        celsius_to_fahrenheit(self.temperature_c)
    }
}

/// `32 + trunc(celsius / 0.5556)`, saturating at the bounds of `i32`.
#[must_use]
pub fn celsius_to_fahrenheit(celsius: i32) -> i32 {
    let offset = (f64::from(celsius) / CELSIUS_PER_FAHRENHEIT) as i64;
    offset
        .saturating_add(32)
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
