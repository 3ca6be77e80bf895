//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI.com client behind the [`WeatherProvider`] trait
//! - A shared sliding-window rate limiter and the session search cache
//! - Injected platform capabilities (geolocation, preference storage)
//! - The [`WeatherController`] that owns what a front end displays
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod preferences;
pub mod provider;
pub mod rate_limiter;
pub mod search;

pub use cache::SearchCache;
pub use config::Config;
pub use controller::{ControllerContext, WeatherController, WeatherState};
pub use error::WeatherError;
pub use geolocation::{Coordinates, Geolocator, PositionOptions};
pub use model::{LocationMatch, UnitSystem, WeatherSnapshot};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use provider::{WeatherProvider, weatherapi::WeatherApiProvider};
pub use rate_limiter::RateLimiter;
pub use search::LocationSearch;
