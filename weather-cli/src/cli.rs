use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use weather_core::{
    Config, ControllerContext, Coordinates, FilePreferences, Geolocator, LocationSearch,
    PositionOptions, PreferenceStore, RateLimiter, UnitSystem, WeatherController,
    geolocation::{CachedGeolocator, FixedPosition},
    provider::provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and the default location.
    Configure,

    /// Show current conditions and the forecast.
    Show {
        /// Place name or "lat,lon". Without it the last viewed location is shown.
        location: Option<String>,

        /// Try once more if the first lookup fails.
        #[arg(long)]
        retry: bool,
    },

    /// Show the weather where you are.
    Here(PositionArgs),

    /// Look up locations matching a query.
    Search {
        query: String,

        /// Choose one of the matches and show its weather.
        #[arg(long)]
        pick: bool,
    },

    /// Show or change the unit system.
    Units {
        #[arg(long, conflicts_with_all = ["metric", "imperial"])]
        toggle: bool,
        #[arg(long, conflicts_with = "imperial")]
        metric: bool,
        #[arg(long)]
        imperial: bool,
    },
}

#[derive(Debug, Args)]
pub struct PositionArgs {
    /// Latitude; overrides `[geolocation]` from the config file.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

/// Controller and search wired to the real client, files and environment.
struct Session {
    controller: WeatherController,
    search: LocationSearch,
}

impl Session {
    fn open(position: Option<Coordinates>) -> anyhow::Result<Self> {
        let config = Config::load()?;
        config.warn_if_unconfigured();

        let provider = provider_from_config(&config)?;
        let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        let preferences: Arc<dyn PreferenceStore> =
            Arc::new(FilePreferences::open(Config::preferences_file_path()?)?);
        let geolocator = position.or(config.geolocation).map(|coords| {
            Arc::new(CachedGeolocator::new(FixedPosition(coords))) as Arc<dyn Geolocator>
        });

        let ctx = ControllerContext {
            provider: provider.clone(),
            geolocator,
            preferences,
            rate_limiter: rate_limiter.clone(),
            locale: platform_locale(),
            fallback_location: config.default_location.clone(),
            position_options: PositionOptions::default(),
        };

        Ok(Self {
            controller: WeatherController::new(ctx),
            search: LocationSearch::new(provider, rate_limiter),
        })
    }

    /// Print the controller state; a stored error becomes the command's error.
    fn report(&self) -> anyhow::Result<()> {
        let state = self.controller.state();
        if let Some(error) = state.error {
            return Err(anyhow!(error));
        }
        let snapshot = state.snapshot.ok_or_else(|| anyhow!("No weather data available"))?;
        print!("{}", render::snapshot(&snapshot, state.units));
        Ok(())
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!(command = ?self.command, "running command");

        match self.command {
            Command::Configure => configure(),
            Command::Show { location, retry } => {
                let session = Session::open(None)?;
                // Failures land in the controller state and are reported below.
                let first = match location {
                    Some(location) => session.controller.select_location(&location).await,
                    None => session.controller.start().await,
                };
                if let (true, Err(err)) = (retry, first) {
                    tracing::info!(error = %err, "first lookup failed, retrying");
                    let _ = session.controller.retry().await;
                }
                session.report()
            }
            Command::Here(position) => {
                let session = Session::open(position.coordinates())?;
                let _ = session.controller.use_current_location().await;
                session.report()
            }
            Command::Search { query, pick } => {
                let session = Session::open(None)?;
                let matches = session.search.search(&query).await;
                if matches.is_empty() {
                    println!("No locations found for '{query}'.");
                    return Ok(());
                }
                if !pick {
                    print!("{}", render::matches(&matches));
                    return Ok(());
                }

                let labels: Vec<String> = matches.iter().map(|m| m.label()).collect();
                let chosen = inquire::Select::new("Location:", labels.clone())
                    .prompt()
                    .context("No location selected")?;
                let index = labels.iter().position(|l| *l == chosen).unwrap_or(0);

                let _ = session.controller.select_location(&matches[index].name).await;
                session.report()
            }
            Command::Units { toggle, metric, imperial } => {
                let session = Session::open(None)?;
                let controller = &session.controller;
                let units = if toggle {
                    controller.toggle_units()
                } else if metric {
                    controller.set_units(UnitSystem::Metric);
                    UnitSystem::Metric
                } else if imperial {
                    controller.set_units(UnitSystem::Imperial);
                    UnitSystem::Imperial
                } else {
                    controller.units()
                };
                println!("Units: {units}");
                Ok(())
            }
        }
    }
}

/// Edit the config file itself, without environment overrides mixed in.
fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_file(&path)?;

    let api_key = inquire::Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let location = inquire::Text::new("Default location:")
        .with_default(&config.default_location)
        .prompt()
        .context("Failed to read default location")?;
    if !location.trim().is_empty() {
        config.default_location = location.trim().to_string();
    }

    config.save_to(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// First non-empty of LC_ALL, LC_MESSAGES and LANG.
fn platform_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_without_location() {
        let cli = Cli::try_parse_from(["weather", "show"]).unwrap();
        assert!(matches!(cli.command, Command::Show { location: None, retry: false }));
    }

    #[test]
    fn parses_show_with_retry() {
        let cli = Cli::try_parse_from(["weather", "show", "Paris", "--retry"]).unwrap();
        let Command::Show { location, retry } = cli.command else { panic!("expected show") };
        assert_eq!(location.as_deref(), Some("Paris"));
        assert!(retry);
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["weather", "here", "--lat", "-33.87", "--lon", "151.21"])
            .unwrap();
        let Command::Here(position) = cli.command else { panic!("expected here") };
        assert_eq!(position.coordinates(), Some(Coordinates::new(-33.87, 151.21)));
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weather", "here", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn unit_flags_conflict() {
        assert!(Cli::try_parse_from(["weather", "units", "--metric", "--imperial"]).is_err());
        assert!(Cli::try_parse_from(["weather", "units", "--toggle", "--metric"]).is_err());
    }
}
