use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    cache::SearchCache,
    model::LocationMatch,
    provider::{WeatherProvider, is_searchable},
    rate_limiter::RateLimiter,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub results: Vec<LocationMatch>,
    pub loading: bool,
}

/// Best-effort location search backed by the session cache.
///
/// Never reports an error: failures are logged and show up as no results.
#[derive(Debug)]
pub struct LocationSearch {
    provider: Arc<dyn WeatherProvider>,
    rate_limiter: Arc<RateLimiter>,
    cache: Mutex<SearchCache>,
    state: Mutex<SearchState>,
}

impl LocationSearch {
    pub fn new(provider: Arc<dyn WeatherProvider>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            provider,
            rate_limiter,
            cache: Mutex::new(SearchCache::new()),
            state: Mutex::new(SearchState::default()),
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.lock().clone()
    }

    pub fn results(&self) -> Vec<LocationMatch> {
        self.state.lock().results.clone()
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.lock().len()
    }

    pub async fn search(&self, query: &str) -> Vec<LocationMatch> {
        if !is_searchable(query) {
            self.state.lock().results.clear();
            return Vec::new();
        }

        let cached = self.cache.lock().get(query).map(<[LocationMatch]>::to_vec);
        if let Some(results) = cached {
            tracing::debug!(query, "search cache hit");
            self.state.lock().results = results.clone();
            return results;
        }

        if !self.rate_limiter.can_make_request() {
            tracing::warn!(query, "rate limit reached for location search");
            return self.results();
        }

        self.state.lock().loading = true;
        let results = match self.provider.search_locations(query).await {
            Ok(results) => {
                self.cache.lock().insert(query, results.clone());
                results
            }
            Err(err) => {
                tracing::error!(error = %err, query, "failed to search locations");
                Vec::new()
            }
        };

        let mut state = self.state.lock();
        state.results = results.clone();
        state.loading = false;
        results
    }

    /// Drop the visible results; the cache is kept.
    pub fn clear(&self) {
        self.state.lock().results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::FakeProvider;
    use std::time::Duration;

    fn paris() -> LocationMatch {
        LocationMatch {
            id: 803267,
            name: "Paris".into(),
            region: "Ile-de-France".into(),
            country: "France".into(),
            lat: 48.87,
            lon: 2.33,
            url: Some("paris-ile-de-france-france".into()),
        }
    }

    fn search_with(provider: Arc<FakeProvider>, limiter: RateLimiter) -> LocationSearch {
        LocationSearch::new(provider, Arc::new(limiter))
    }

    #[tokio::test]
    async fn second_search_any_casing_hits_cache() {
        let provider = Arc::new(FakeProvider::default().with_search("Paris", vec![paris()]));
        let search = search_with(provider.clone(), RateLimiter::default());

        assert_eq!(search.search("Paris").await, vec![paris()]);
        assert_eq!(provider.search_calls(), 1);

        assert_eq!(search.search("PARIS").await, vec![paris()]);
        assert_eq!(search.search("paris").await, vec![paris()]);
        assert_eq!(provider.search_calls(), 1);
        assert_eq!(search.cached_queries(), 1);
    }

    #[tokio::test]
    async fn short_query_clears_without_request() {
        let provider = Arc::new(FakeProvider::default().with_search("Paris", vec![paris()]));
        let search = search_with(provider.clone(), RateLimiter::default());

        search.search("Paris").await;
        assert_eq!(search.results().len(), 1);

        assert!(search.search("P").await.is_empty());
        assert!(search.results().is_empty());
        assert_eq!(provider.search_calls(), 1);
    }

    #[tokio::test]
    async fn rate_limited_search_keeps_previous_results() {
        let provider = Arc::new(FakeProvider::default().with_search("Paris", vec![paris()]));
        let search = search_with(provider.clone(), RateLimiter::new(1, Duration::from_secs(60)));

        search.search("Paris").await;
        let results = search.search("Lyon").await;

        assert_eq!(results, vec![paris()]);
        assert_eq!(provider.search_calls(), 1);
        assert_eq!(search.cached_queries(), 1);
    }

    #[tokio::test]
    async fn cache_hits_do_not_spend_rate_budget() {
        let provider = Arc::new(FakeProvider::default().with_search("Paris", vec![paris()]));
        let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));
        let search = LocationSearch::new(provider.clone(), limiter.clone());

        search.search("Paris").await;
        for _ in 0..5 {
            search.search("paris").await;
        }
        assert_eq!(limiter.approvals_in_window_at(std::time::Instant::now()), 1);
    }

    #[tokio::test]
    async fn missing_credential_yields_empty_results() {
        let provider = Arc::new(FakeProvider { missing_key: true, ..Default::default() });
        let search = search_with(provider, RateLimiter::default());

        assert!(search.search("Paris").await.is_empty());
        assert!(!search.state().loading);
        assert_eq!(search.cached_queries(), 0);
    }

    #[tokio::test]
    async fn cached_query_never_reaches_the_wire() {
        use crate::provider::weatherapi::WeatherApiProvider;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 803267, "name": "Paris", "region": "Ile-de-France", "country": "France", "lat": 48.87, "lon": 2.33}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new(Some("k".to_string()), server.uri()).unwrap();
        let search = LocationSearch::new(Arc::new(provider), Arc::new(RateLimiter::default()));

        assert_eq!(search.search("Paris").await.len(), 1);
        assert_eq!(search.search("pArIs").await.len(), 1);
        assert!(search.search("P").await.is_empty());
    }

    #[tokio::test]
    async fn clear_keeps_cache() {
        let provider = Arc::new(FakeProvider::default().with_search("Paris", vec![paris()]));
        let search = search_with(provider.clone(), RateLimiter::default());

        search.search("Paris").await;
        search.clear();
        assert!(search.results().is_empty());

        search.search("Paris").await;
        assert_eq!(provider.search_calls(), 1);
        assert_eq!(search.results(), vec![paris()]);
    }
}
