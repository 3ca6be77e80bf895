//! Unit-aware formatting of snapshot values.
//!
//! Values are rounded the way a weather card shows them; no conversion is
//! done here since the provider sends both unit systems.

use chrono::{Datelike, NaiveDate};

use crate::model::{Current, ForecastDay, UnitSystem};

pub fn temperature_unit(units: UnitSystem) -> &'static str {
    if units.is_metric() { "°C" } else { "°F" }
}

/// Nearest integer, halves going up: `-2.5` gives `-2`, `2.5` gives `3`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn temperature(value: f64, units: UnitSystem) -> String {
    format!("{}{}", round_half_up(value), temperature_unit(units))
}

/// Readings of the current conditions in one unit system.
#[derive(Debug, Clone, Copy)]
pub struct CurrentView<'a> {
    current: &'a Current,
    units: UnitSystem,
}

impl<'a> CurrentView<'a> {
    pub fn new(current: &'a Current, units: UnitSystem) -> Self {
        Self { current, units }
    }

    pub fn temperature(&self) -> String {
        temperature(self.units.pick(self.current.temp_c, self.current.temp_f), self.units)
    }

    pub fn feels_like(&self) -> String {
        temperature(self.units.pick(self.current.feelslike_c, self.current.feelslike_f), self.units)
    }

    pub fn wind(&self) -> String {
        let speed = round_half_up(self.units.pick(self.current.wind_kph, self.current.wind_mph));
        let unit = if self.units.is_metric() { "km/h" } else { "mph" };
        if self.current.wind_dir.is_empty() {
            format!("{speed} {unit}")
        } else {
            format!("{speed} {unit} {}", self.current.wind_dir)
        }
    }

    pub fn visibility(&self) -> String {
        let unit = if self.units.is_metric() { "km" } else { "mi" };
        format!("{} {unit}", self.units.pick(self.current.vis_km, self.current.vis_miles))
    }

    pub fn pressure(&self) -> String {
        let value =
            round_half_up(self.units.pick(self.current.pressure_mb, self.current.pressure_in));
        let unit = if self.units.is_metric() { "mb" } else { "in" };
        format!("{value} {unit}")
    }

    pub fn humidity(&self) -> String {
        format!("{}%", self.current.humidity)
    }

    pub fn humidity_level(&self) -> &'static str {
        humidity_level(self.current.humidity)
    }

    pub fn cloud(&self) -> String {
        format!("{}%", self.current.cloud)
    }

    pub fn uv(&self) -> String {
        format!("{} ({})", self.current.uv, uv_level(self.current.uv))
    }
}

/// Readings of one forecast day in one unit system.
#[derive(Debug, Clone, Copy)]
pub struct DayView<'a> {
    day: &'a ForecastDay,
    units: UnitSystem,
}

impl<'a> DayView<'a> {
    pub fn new(day: &'a ForecastDay, units: UnitSystem) -> Self {
        Self { day, units }
    }

    pub fn high(&self) -> String {
        let d = &self.day.day;
        temperature(self.units.pick(d.maxtemp_c, d.maxtemp_f), self.units)
    }

    pub fn low(&self) -> String {
        let d = &self.day.day;
        temperature(self.units.pick(d.mintemp_c, d.mintemp_f), self.units)
    }

    pub fn chance_of_rain(&self) -> String {
        format!("{}%", self.day.day.daily_chance_of_rain)
    }

    /// Total precipitation, only when rain is possible at all.
    pub fn precipitation(&self) -> Option<String> {
        let d = &self.day.day;
        if d.daily_chance_of_rain == 0 {
            return None;
        }
        let unit = if self.units.is_metric() { "mm" } else { "in" };
        Some(format!("{}{unit}", self.units.pick(d.totalprecip_mm, d.totalprecip_in)))
    }

    pub fn label(&self, today: NaiveDate) -> String {
        day_label(self.day.date, today)
    }
}

/// `Today`, `Tomorrow`, or e.g. `Mon, Jun 3`.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        format!("{}, {} {}", date.format("%a"), date.format("%b"), date.day())
    }
}

pub fn humidity_level(humidity: u8) -> &'static str {
    match humidity {
        h if h > 70 => "High",
        h if h > 40 => "Moderate",
        _ => "Low",
    }
}

pub fn uv_level(uv: f64) -> &'static str {
    match uv {
        uv if uv <= 2.0 => "Low",
        uv if uv <= 5.0 => "Moderate",
        uv if uv <= 7.0 => "High",
        uv if uv <= 10.0 => "Very High",
        _ => "Extreme",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_snapshot;

    #[test]
    fn current_metric_and_imperial() {
        let snapshot = sample_snapshot("Paris", 20.0, 68.0);

        let metric = CurrentView::new(&snapshot.current, UnitSystem::Metric);
        assert_eq!(metric.temperature(), "20°C");
        assert_eq!(metric.feels_like(), "19°C");
        assert_eq!(metric.wind(), "15 km/h WNW");
        assert_eq!(metric.visibility(), "10 km");
        assert_eq!(metric.pressure(), "1015 mb");

        let imperial = CurrentView::new(&snapshot.current, UnitSystem::Imperial);
        assert_eq!(imperial.temperature(), "68°F");
        assert_eq!(imperial.feels_like(), "67°F");
        assert_eq!(imperial.wind(), "9 mph WNW");
        assert_eq!(imperial.visibility(), "6 mi");
        assert_eq!(imperial.pressure(), "30 in");
    }

    #[test]
    fn humidity_and_uv() {
        let snapshot = sample_snapshot("Paris", 20.0, 68.0);
        let view = CurrentView::new(&snapshot.current, UnitSystem::Metric);
        assert_eq!(view.humidity(), "64%");
        assert_eq!(view.humidity_level(), "Moderate");
        assert_eq!(view.uv(), "5 (Moderate)");
        assert_eq!(view.cloud(), "50%");

        assert_eq!(humidity_level(40), "Low");
        assert_eq!(humidity_level(71), "High");
        assert_eq!(uv_level(2.0), "Low");
        assert_eq!(uv_level(7.0), "High");
        assert_eq!(uv_level(10.0), "Very High");
        assert_eq!(uv_level(11.0), "Extreme");
    }

    #[test]
    fn halves_round_up_below_zero() {
        let snapshot = sample_snapshot("Oslo", -2.5, 27.5);
        let metric = CurrentView::new(&snapshot.current, UnitSystem::Metric);
        assert_eq!(metric.temperature(), "-2°C");
        assert_eq!(CurrentView::new(&snapshot.current, UnitSystem::Imperial).temperature(), "28°F");

        let snapshot = sample_snapshot("Oslo", -0.5, 31.1);
        assert_eq!(CurrentView::new(&snapshot.current, UnitSystem::Metric).temperature(), "0°C");

        assert_eq!(round_half_up(-3.5), -3);
        assert_eq!(round_half_up(-3.6), -4);
        assert_eq!(round_half_up(2.5), 3);
    }

    #[test]
    fn forecast_day_readings() {
        let snapshot = sample_snapshot("Paris", 20.0, 68.0);
        let rainy = DayView::new(&snapshot.days()[0], UnitSystem::Metric);
        assert_eq!(rainy.high(), "23°C");
        assert_eq!(rainy.low(), "13°C");
        assert_eq!(rainy.chance_of_rain(), "80%");
        assert_eq!(rainy.precipitation().as_deref(), Some("1.2mm"));

        let dry = DayView::new(&snapshot.days()[1], UnitSystem::Imperial);
        assert_eq!(dry.high(), "70°F");
        assert_eq!(dry.precipitation(), None);
    }

    #[test]
    fn day_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), today), "Tomorrow");
        assert_eq!(day_label(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), today), "Mon, Jun 3");
    }
}
