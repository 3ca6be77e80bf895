use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    WeatherError,
    model::{LocationMatch, WeatherSnapshot},
    provider::is_searchable,
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Days of forecast requested with every lookup.
pub const FORECAST_DAYS: u8 = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// WeatherAPI.com client.
///
/// The credential is optional so a missing key is reported per call as
/// [`WeatherError::Configuration`], before anything goes on the wire.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(WeatherError::HttpClient)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { api_key: api_key.filter(|k| !k.trim().is_empty()), base_url, http })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::Configuration)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, "sending request to WeatherAPI");

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::debug!(%status, body = %truncate_body(&body), "WeatherAPI request failed");
            return Err(WeatherError::from_status(status));
        }

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(WeatherError::MalformedResponse)
    }

    async fn try_search(&self, key: &str, query: &str) -> Result<Vec<LocationMatch>, WeatherError> {
        self.get("search.json", &[("key", key), ("q", query)]).await
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_forecast(&self, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        let key = self.api_key()?;
        let days = FORECAST_DAYS.to_string();

        self.get(
            "forecast.json",
            &[("key", key), ("q", location), ("days", days.as_str()), ("aqi", "yes"), ("alerts", "yes")],
        )
        .await
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, WeatherError> {
        let key = self.api_key()?;

        if !is_searchable(query) {
            return Ok(Vec::new());
        }

        match self.try_search(key, query).await {
            Ok(matches) => Ok(matches),
            Err(err) => {
                tracing::error!(error = %err, query, "location search failed");
                Ok(Vec::new())
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
