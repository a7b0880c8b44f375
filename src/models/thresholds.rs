use serde::{Deserialize, Serialize};

pub const DEFAULT_HOURS: u32 = 8;
pub const DEFAULT_MIN_TEMPERATURE: f64 = 10.0;
pub const DEFAULT_MAX_TEMPERATURE: f64 = 30.0;
pub const DEFAULT_PRECIPITATION_THRESHOLD: f64 = 0.1;
pub const DEFAULT_WIND_THRESHOLD: f64 = 20.0;

/// Fully resolved thresholds, immutable for the duration of one window
/// evaluation.
///
/// Comparisons against these values are strict: a forecast value exactly
/// equal to its threshold is still favorable.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Look-ahead window length in hours.
    pub hours: u32,
    /// Temperature strictly below this is too cold.
    pub min_temperature: f64,
    /// Temperature strictly above this is too hot.
    pub max_temperature: f64,
    /// Precipitation strictly above this is too wet.
    pub precipitation_threshold: f64,
    /// Wind speed strictly above this is too windy.
    pub wind_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hours: DEFAULT_HOURS,
            min_temperature: DEFAULT_MIN_TEMPERATURE,
            max_temperature: DEFAULT_MAX_TEMPERATURE,
            precipitation_threshold: DEFAULT_PRECIPITATION_THRESHOLD,
            wind_threshold: DEFAULT_WIND_THRESHOLD,
        }
    }
}

/// A partial threshold set as written in the config file. Every field is
/// optional so overlays can be stacked without having to be complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_threshold: Option<f64>,
    /// Deprecated spelling of `min_temperature`, kept so pre-split configs
    /// still load. See `migrate_deprecated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_threshold: Option<f64>,
}

impl ThresholdOverlay {
    /// Folds the deprecated single `temperature_threshold` key into
    /// `min_temperature`, mirroring the v1 -> v2 entry migration of the
    /// original integration. An explicit `min_temperature` wins.
    pub fn migrate_deprecated(mut self) -> Self {
        if let Some(temp) = self.temperature_threshold.take() {
            if self.min_temperature.is_none() {
                tracing::warn!(
                    "`temperature_threshold` is deprecated, use `min_temperature`"
                );
                self.min_temperature = Some(temp);
            }
        }
        self
    }
}

impl Thresholds {
    /// Resolves a stack of overlays into a concrete threshold set.
    ///
    /// Layers are ordered from most to least specific; for each field
    /// independently the first layer carrying a value wins, and the hard
    /// default applies when no layer does. Overlays do not have to be
    /// complete.
    pub fn resolve(layers: &[&ThresholdOverlay]) -> Thresholds {
        let defaults = Thresholds::default();
        Thresholds {
            hours: layers
                .iter()
                .find_map(|l| l.hours)
                .unwrap_or(defaults.hours),
            min_temperature: layers
                .iter()
                .find_map(|l| l.min_temperature)
                .unwrap_or(defaults.min_temperature),
            max_temperature: layers
                .iter()
                .find_map(|l| l.max_temperature)
                .unwrap_or(defaults.max_temperature),
            precipitation_threshold: layers
                .iter()
                .find_map(|l| l.precipitation_threshold)
                .unwrap_or(defaults.precipitation_threshold),
            wind_threshold: layers
                .iter()
                .find_map(|l| l.wind_threshold)
                .unwrap_or(defaults.wind_threshold),
        }
    }
}
