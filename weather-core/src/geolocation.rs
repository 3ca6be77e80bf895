//! Geolocation capability.
//!
//! The platform's position service is injected as a [`Geolocator`]; a missing
//! capability is `None` at the call site, not an implementation.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options for a single-shot position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the caller will accept.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// "lat,lon", the form the forecast endpoint accepts as a location.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Platform failure codes for a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied = 1,
    #[error("position unavailable")]
    PositionUnavailable = 2,
    #[error("timeout")]
    Timeout = 3,
}

impl PositionError {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PositionError::PermissionDenied),
            2 => Some(PositionError::PositionUnavailable),
            3 => Some(PositionError::Timeout),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self, options: &PositionOptions)
    -> Result<Coordinates, PositionError>;
}

/// A position known up front, e.g. from configuration or command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}

/// Answers from the last successful fix while it is younger than
/// `options.maximum_age`, otherwise asks the inner geolocator.
#[derive(Debug)]
pub struct CachedGeolocator<G> {
    inner: G,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl<G: Geolocator> CachedGeolocator<G> {
    pub fn new(inner: G) -> Self {
        Self { inner, last_fix: Mutex::new(None) }
    }

    fn cached(&self, maximum_age: Duration) -> Option<Coordinates> {
        let last_fix = self.last_fix.lock();
        match *last_fix {
            Some((taken, coords)) if taken.elapsed() <= maximum_age => Some(coords),
            _ => None,
        }
    }
}

#[async_trait]
impl<G: Geolocator> Geolocator for CachedGeolocator<G> {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        if let Some(coords) = self.cached(options.maximum_age) {
            tracing::debug!(?coords, "using cached position");
            return Ok(coords);
        }

        let coords = self.inner.current_position(options).await?;
        *self.last_fix.lock() = Some((Instant::now(), coords));
        Ok(coords)
    }
}
