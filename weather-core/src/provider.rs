use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    Config, WeatherError,
    geolocation::{Geolocator, PositionOptions},
    model::{LocationMatch, WeatherSnapshot},
    provider::weatherapi::WeatherApiProvider,
};

pub mod weatherapi;

/// Shortest query text worth sending to the search endpoint.
pub const MIN_QUERY_LEN: usize = 2;

pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_LEN
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions plus the multi-day forecast for `location`
    /// (a place name or a "lat,lon" pair).
    async fn fetch_forecast(&self, location: &str) -> Result<WeatherSnapshot, WeatherError>;

    /// Location candidates for `query`.
    ///
    /// Only a missing credential is reported as an error; any other failure is
    /// logged and yields an empty list.
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, WeatherError>;
}

/// Forecast for wherever the platform says we are.
pub async fn current_location_forecast(
    provider: &dyn WeatherProvider,
    geolocator: Option<&dyn Geolocator>,
    options: &PositionOptions,
) -> Result<WeatherSnapshot, WeatherError> {
    let geolocator = geolocator.ok_or(WeatherError::GeolocationUnsupported)?;

    let coords = tokio::time::timeout(options.timeout, geolocator.current_position(options))
        .await
        .map_err(|_| WeatherError::Timeout)??;

    tracing::debug!(?coords, "resolved current position");
    provider.fetch_forecast(&coords.to_query()).await
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    let provider = WeatherApiProvider::new(config.api_key.clone(), config.base_url.clone())?;
    Ok(Arc::new(provider))
}
