//! Data models for the Culex forecast service

pub mod forecast;

pub use forecast::{WeatherForecast, celsius_to_fahrenheit};
