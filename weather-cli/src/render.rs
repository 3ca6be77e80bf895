//! Human-friendly output formatting.

use std::fmt::Write;

use weather_core::{
    LocationMatch, UnitSystem, WeatherSnapshot,
    display::{CurrentView, DayView},
};

pub fn snapshot(snapshot: &WeatherSnapshot, units: UnitSystem) -> String {
    let mut out = String::new();
    let place = &snapshot.location;
    let now = CurrentView::new(&snapshot.current, units);

    let _ = writeln!(out, "{}, {}, {}", place.name, place.region, place.country);
    let _ = writeln!(out, "{}", place.localtime.format("%A, %B %-d, %Y %I:%M %p"));
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}  {}", now.temperature(), snapshot.current.condition.text);
    let _ = writeln!(out, "  Feels like {}", now.feels_like());
    let _ = writeln!(out, "  Wind        {}", now.wind());
    let _ = writeln!(out, "  Humidity    {} ({})", now.humidity(), now.humidity_level());
    let _ = writeln!(out, "  Visibility  {}", now.visibility());
    let _ = writeln!(out, "  Pressure    {}", now.pressure());
    let _ = writeln!(out, "  Cloud cover {}", now.cloud());
    let _ = writeln!(out, "  UV index    {}", now.uv());

    if let Some(today) = snapshot.today() {
        let _ = writeln!(
            out,
            "  Sunrise     {}   Sunset {}",
            today.astro.sunrise, today.astro.sunset
        );
    }

    for alert in &snapshot.alerts.alert {
        let _ = writeln!(out, "  ! {}", alert.headline);
    }

    let _ = writeln!(out);
    let today = place.localtime.date();
    for day in snapshot.days() {
        let view = DayView::new(day, units);
        let _ = write!(
            out,
            "  {:<12} {:>6} / {:<6} rain {:>4}  {}",
            view.label(today),
            view.high(),
            view.low(),
            view.chance_of_rain(),
            day.day.condition.text,
        );
        if let Some(precip) = view.precipitation() {
            let _ = write!(out, " ({precip})");
        }
        let _ = writeln!(out);
    }

    out
}

pub fn matches(matches: &[LocationMatch]) -> String {
    matches.iter().fold(String::new(), |mut out, m| {
        let _ = writeln!(out, "{}", m.label());
        out
    })
}
