use reqwest::StatusCode;
use thiserror::Error;

use crate::geolocation::PositionError;

/// Every failure the client, geolocation and controller can surface.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "Weather API key not configured.\n\
         Hint: set WEATHER_API_KEY or run `weather configure` and enter your API key."
    )]
    Configuration,

    #[error("Location not found. Please try a different city name.")]
    LocationNotFound,

    #[error("Invalid API key. Please check your weather API configuration.")]
    InvalidCredential,

    #[error("API key quota exceeded. Please upgrade your plan or try again later.")]
    QuotaExceeded,

    #[error("Weather service error: {0}")]
    Service(u16),

    #[error("Failed to fetch weather data. Please check your internet connection.")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to set up the HTTP client.")]
    HttpClient(#[source] reqwest::Error),

    #[error("Weather service returned an unreadable response.")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("Geolocation is not supported on this platform.")]
    GeolocationUnsupported,

    #[error("Location access denied. Please enable location services.")]
    PermissionDenied,

    #[error("Location information unavailable.")]
    PositionUnavailable,

    #[error("Location request timed out.")]
    Timeout,

    #[error("Too many requests. Please wait a moment before trying again.")]
    RateLimited,
}

impl WeatherError {
    /// Map a non-success forecast status to its error.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => WeatherError::LocationNotFound,
            401 => WeatherError::InvalidCredential,
            403 => WeatherError::QuotaExceeded,
            other => WeatherError::Service(other),
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err)
    }
}

impl From<PositionError> for WeatherError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => WeatherError::PermissionDenied,
            PositionError::PositionUnavailable => WeatherError::PositionUnavailable,
            PositionError::Timeout => WeatherError::Timeout,
        }
    }
}
