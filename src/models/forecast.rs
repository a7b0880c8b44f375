use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condition codes that are adverse outright, independent of any numeric
/// threshold. Matches the closed list used by the Home Assistant weather
/// platform for stormy/wet conditions.
pub const BAD_CONDITIONS: [&str; 7] = [
    "lightning",
    "lightning-rainy",
    "hail",
    "rainy",
    "snowy",
    "snowy-rainy",
    "pouring",
];

pub fn is_bad_condition(condition: &str) -> bool {
    BAD_CONDITIONS.contains(&condition)
}

/// One hourly record from the `weather.get_forecasts` service response.
///
/// The numeric fields are required on purpose: a record missing
/// `precipitation`, `wind_speed` or `temperature` is rejected at
/// deserialization rather than silently compared against thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub datetime: DateTime<Utc>,
    /// Open set of condition codes; only `BAD_CONDITIONS` members are
    /// interpreted, everything else is treated as benign.
    pub condition: String,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_conditions_membership() {
        assert!(is_bad_condition("lightning"));
        assert!(is_bad_condition("lightning-rainy"));
        assert!(is_bad_condition("hail"));
        assert!(is_bad_condition("rainy"));
        assert!(is_bad_condition("snowy"));
        assert!(is_bad_condition("snowy-rainy"));
        assert!(is_bad_condition("pouring"));

        assert!(!is_bad_condition("sunny"));
        assert!(!is_bad_condition("partlycloudy"));
        assert!(!is_bad_condition("cloudy"));
        // Open set: unknown codes are benign, not errors
        assert!(!is_bad_condition("volcanic-ash"));
    }

    #[test]
    fn forecast_entry_parses_wire_format() {
        let json = r#"{
            "datetime": "2026-08-29T14:00:00+00:00",
            "condition": "sunny",
            "precipitation": 0.0,
            "wind_speed": 11.5,
            "temperature": 21.3,
            "humidity": 40
        }"#;

        let entry: ForecastEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.condition, "sunny");
        assert!((entry.wind_speed - 11.5).abs() < f64::EPSILON);
        assert!((entry.temperature - 21.3).abs() < f64::EPSILON);
        assert_eq!(
            entry.datetime,
            "2026-08-29T14:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn forecast_entry_rejects_missing_numeric_fields() {
        // No silent coercion: a record without wind_speed must not parse
        let json = r#"{
            "datetime": "2026-08-29T14:00:00+00:00",
            "condition": "sunny",
            "precipitation": 0.0,
            "temperature": 21.3
        }"#;

        assert!(serde_json::from_str::<ForecastEntry>(json).is_err());
    }
}
