use chrono::{DateTime, Utc};
use serde::Serialize;

pub const ICON_ON: &str = "mdi:cloud-check-variant";
pub const ICON_OFF: &str = "mdi:cloud-alert";

/// Outcome of one forecast-window evaluation. Rebuilt from scratch on every
/// poll cycle; nothing is carried over between cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowVerdict {
    /// True when no scanned record tripped any predicate.
    pub is_favorable: bool,
    /// The adverse condition code of the record that ended the scan, if the
    /// scan ended on a categorical match.
    pub bad_condition: Option<String>,
    pub precipitation: bool,
    pub strong_wind: bool,
    pub cold_temperature: bool,
    pub hot_temperature: bool,
    /// Timestamp of the first record that tripped any predicate.
    pub bad_at: Option<DateTime<Utc>>,
}

impl WindowVerdict {
    pub fn favorable() -> Self {
        Self {
            is_favorable: true,
            bad_condition: None,
            precipitation: false,
            strong_wind: false,
            cold_temperature: false,
            hot_temperature: false,
            bad_at: None,
        }
    }

    /// True as soon as any of the five predicates has fired.
    pub fn any_flag(&self) -> bool {
        self.bad_condition.is_some()
            || self.precipitation
            || self.strong_wind
            || self.cold_temperature
            || self.hot_temperature
    }

    pub fn state_str(&self) -> &'static str {
        if self.is_favorable {
            "on"
        } else {
            "off"
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.is_favorable {
            ICON_ON
        } else {
            ICON_OFF
        }
    }
}

/// Attribute payload published alongside the binary sensor state.
///
/// `condition` carries the triggering adverse condition when the verdict is
/// unfavorable, otherwise the first raw forecast record's condition.
/// `current_condition` is the weather entity's live reported condition; the
/// two can legitimately differ, so both are exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SensorAttributes {
    pub friendly_name: String,
    pub icon: &'static str,
    pub condition: Option<String>,
    pub current_condition: Option<String>,
    pub precipitation: bool,
    pub strong_wind: bool,
    pub cold_temperature: bool,
    pub hot_temperature: bool,
    pub bad_weather_at: Option<DateTime<Utc>>,
}

impl SensorAttributes {
    pub fn new(
        friendly_name: &str,
        verdict: &WindowVerdict,
        first_forecast_condition: Option<String>,
        current_condition: Option<String>,
    ) -> Self {
        Self {
            friendly_name: friendly_name.to_string(),
            icon: verdict.icon(),
            condition: verdict
                .bad_condition
                .clone()
                .or(first_forecast_condition),
            current_condition,
            precipitation: verdict.precipitation,
            strong_wind: verdict.strong_wind,
            cold_temperature: verdict.cold_temperature,
            hot_temperature: verdict.hot_temperature,
            bad_weather_at: verdict.bad_at,
        }
    }
}
