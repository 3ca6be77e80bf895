//! Weather state controller.
//!
//! Owns what the presentation layer shows: the loading flag, the current
//! error message, the last snapshot and the unit system. Every fetch enters
//! `loading` under a fresh generation number and its completion is applied
//! only if no newer fetch has started since, so a slow stale response can
//! never overwrite fresher state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    WeatherError,
    geolocation::{Geolocator, PositionOptions},
    model::{UnitSystem, WeatherSnapshot},
    preferences::{CURRENT_LOCATION, LAST_LOCATION_KEY, PreferenceStore, UNITS_KEY},
    provider::{WeatherProvider, current_location_forecast},
    rate_limiter::RateLimiter,
};

/// Everything the controller talks to, constructed by the caller.
#[derive(Debug, Clone)]
pub struct ControllerContext {
    pub provider: Arc<dyn WeatherProvider>,
    /// `None` when the platform has no position service.
    pub geolocator: Option<Arc<dyn Geolocator>>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Platform locale such as `en-US` or `fr_FR.UTF-8`.
    pub locale: Option<String>,
    pub fallback_location: String,
    pub position_options: PositionOptions,
}

/// Observable controller state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub loading: bool,
    pub error: Option<String>,
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    pub units: UnitSystem,
}

/// What to fetch; remembered for `retry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Named(String),
    CurrentLocation,
}

impl Target {
    /// Value stored under the last-location preference key.
    fn persisted(&self) -> &str {
        match self {
            Target::Named(name) => name,
            Target::CurrentLocation => CURRENT_LOCATION,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    view: WeatherState,
    generation: u64,
    last_target: Option<Target>,
}

#[derive(Debug)]
pub struct WeatherController {
    ctx: ControllerContext,
    inner: Mutex<Inner>,
}

impl WeatherController {
    pub fn new(ctx: ControllerContext) -> Self {
        let units = initial_units(ctx.preferences.as_ref(), ctx.locale.as_deref());
        let inner = Inner { view: WeatherState { units, ..Default::default() }, ..Default::default() };

        Self { ctx, inner: Mutex::new(inner) }
    }

    pub fn state(&self) -> WeatherState {
        self.inner.lock().view.clone()
    }

    pub fn units(&self) -> UnitSystem {
        self.inner.lock().view.units
    }

    /// Restore the last view: the current location, the last named place, or
    /// the fallback location when nothing was stored.
    pub async fn start(&self) -> Result<(), WeatherError> {
        match self.ctx.preferences.get(LAST_LOCATION_KEY) {
            Some(last) if last == CURRENT_LOCATION => self.use_current_location().await,
            Some(last) if !last.trim().is_empty() => self.select_location(&last).await,
            _ => self.select_location(&self.ctx.fallback_location).await,
        }
    }

    pub async fn select_location(&self, location: &str) -> Result<(), WeatherError> {
        self.run(Target::Named(location.to_string())).await
    }

    pub async fn use_current_location(&self) -> Result<(), WeatherError> {
        self.run(Target::CurrentLocation).await
    }

    /// Repeat the most recent operation, or load the fallback location.
    pub async fn retry(&self) -> Result<(), WeatherError> {
        let target = self.inner.lock().last_target.clone();
        match target {
            Some(target) => self.run(target).await,
            None => self.select_location(&self.ctx.fallback_location).await,
        }
    }

    pub fn toggle_units(&self) -> UnitSystem {
        let units = self.units().toggled();
        self.set_units(units);
        units
    }

    pub fn set_units(&self, units: UnitSystem) {
        self.inner.lock().view.units = units;
        self.persist(UNITS_KEY, units.as_str());
    }

    async fn run(&self, target: Target) -> Result<(), WeatherError> {
        if !self.ctx.rate_limiter.can_make_request() {
            tracing::warn!(?target, "rate limit reached, not fetching");
            let err = WeatherError::RateLimited;
            let mut inner = self.inner.lock();
            // Supersedes any fetch still in flight.
            inner.generation += 1;
            inner.view.loading = false;
            inner.view.error = Some(err.to_string());
            inner.last_target = Some(target);
            return Err(err);
        }

        let generation = self.begin(&target);

        let result = match &target {
            Target::Named(location) => self.ctx.provider.fetch_forecast(location).await,
            Target::CurrentLocation => {
                current_location_forecast(
                    self.ctx.provider.as_ref(),
                    self.ctx.geolocator.as_deref(),
                    &self.ctx.position_options,
                )
                .await
            }
        };

        self.complete(generation, &target, result)
    }

    fn begin(&self, target: &Target) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.last_target = Some(target.clone());
        inner.view.loading = true;
        inner.view.error = None;
        inner.generation
    }

    fn complete(
        &self,
        generation: u64,
        target: &Target,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> Result<(), WeatherError> {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!(?target, generation, latest = inner.generation, "discarding stale result");
            return result.map(|_| ());
        }

        inner.view.loading = false;
        match result {
            Ok(snapshot) => {
                inner.view.snapshot = Some(Arc::new(snapshot));
                inner.view.error = None;
                drop(inner);
                self.persist(LAST_LOCATION_KEY, target.persisted());
                Ok(())
            }
            Err(err) => {
                tracing::error!(?target, error = %err, "weather fetch failed");
                inner.view.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.ctx.preferences.set(key, value) {
            tracing::warn!(key, error = %err, "failed to persist preference");
        }
    }
}

/// Stored preference if it parses, otherwise the locale default.
fn initial_units(preferences: &dyn PreferenceStore, locale: Option<&str>) -> UnitSystem {
    preferences
        .get(UNITS_KEY)
        .and_then(|saved| UnitSystem::parse(&saved))
        .unwrap_or_else(|| UnitSystem::for_locale(locale))
}
