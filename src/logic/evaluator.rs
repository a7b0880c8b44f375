use chrono::{DateTime, Duration, Utc};

use crate::models::{is_bad_condition, ForecastEntry, Thresholds, WindowVerdict};

/// Scans the look-ahead window and returns the verdict for it.
///
/// The window covers everything strictly before `now + thresholds.hours`;
/// no lower bound is applied, so records at or before `now` count too
/// (weather that is bad right now is still bad). Records are scanned in the
/// order given, which callers are expected to keep chronological.
///
/// The scan stops at the first record that trips any predicate ("first bad
/// hour wins"): later, possibly worse, records are never inspected. Flags
/// accumulate across scanned records up to that point and are never reset.
///
/// An empty window is favorable; distinguishing "no forecast at all" from
/// "no bad weather found" is the caller's job.
pub fn evaluate_window(
    entries: &[ForecastEntry],
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> WindowVerdict {
    let end_time = now + Duration::hours(i64::from(thresholds.hours));
    let mut verdict = WindowVerdict::favorable();

    for entry in entries.iter().filter(|e| e.datetime < end_time) {
        tracing::debug!(
            datetime = %entry.datetime,
            condition = %entry.condition,
            precipitation = entry.precipitation,
            wind_speed = entry.wind_speed,
            temperature = entry.temperature,
            "evaluating forecast record"
        );

        if is_bad_condition(&entry.condition) {
            verdict.bad_condition = Some(entry.condition.clone());
        }
        if entry.precipitation > thresholds.precipitation_threshold {
            verdict.precipitation = true;
        }
        if entry.wind_speed > thresholds.wind_threshold {
            verdict.strong_wind = true;
        }
        if entry.temperature < thresholds.min_temperature {
            verdict.cold_temperature = true;
        }
        if entry.temperature > thresholds.max_temperature {
            verdict.hot_temperature = true;
        }

        if verdict.any_flag() {
            verdict.is_favorable = false;
            verdict.bad_at = Some(entry.datetime);
            tracing::debug!(bad_at = %entry.datetime, "bad weather found, stopping scan");
            break;
        }
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap()
    }

    fn entry(hours_ahead: i64, condition: &str) -> ForecastEntry {
        ForecastEntry {
            datetime: now() + Duration::hours(hours_ahead),
            condition: condition.to_string(),
            precipitation: 0.0,
            wind_speed: 5.0,
            temperature: 20.0,
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            hours: 8,
            min_temperature: 10.0,
            max_temperature: 30.0,
            precipitation_threshold: 0.1,
            wind_threshold: 20.0,
        }
    }

    #[test]
    fn empty_forecast_is_favorable() {
        let verdict = evaluate_window(&[], now(), &thresholds());
        assert!(verdict.is_favorable);
        assert!(!verdict.any_flag());
        assert_eq!(verdict.bad_at, None);
    }

    #[test]
    fn clear_window_is_favorable() {
        let entries = vec![entry(1, "sunny"), entry(2, "partlycloudy"), entry(3, "cloudy")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(verdict.is_favorable);
        assert!(!verdict.any_flag());
        assert_eq!(verdict.bad_at, None);
    }

    #[test]
    fn bad_condition_flips_verdict_and_records_time() {
        let entries = vec![entry(1, "sunny"), entry(2, "rainy"), entry(3, "sunny")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert_eq!(verdict.bad_condition.as_deref(), Some("rainy"));
        assert_eq!(verdict.bad_at, Some(entries[1].datetime));
    }

    #[test]
    fn first_bad_hour_wins() {
        // First record matches a bad condition; second would trip the
        // precipitation threshold but must never be inspected.
        let mut second = entry(2, "sunny");
        second.precipitation = 5.0;
        let entries = vec![entry(1, "rainy"), second];

        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert_eq!(verdict.bad_condition.as_deref(), Some("rainy"));
        assert!(!verdict.precipitation);
        assert_eq!(verdict.bad_at, Some(entries[0].datetime));
    }

    #[test]
    fn favorable_single_record_within_thresholds() {
        let e = ForecastEntry {
            datetime: now() + Duration::hours(1),
            condition: "sunny".into(),
            precipitation: 0.0,
            wind_speed: 5.0,
            temperature: 20.0,
        };
        let verdict = evaluate_window(&[e], now(), &thresholds());
        assert!(verdict.is_favorable);
    }

    #[test]
    fn cold_record_sets_only_cold_flag() {
        let mut e = entry(1, "sunny");
        e.temperature = 5.0;
        let verdict = evaluate_window(&[e], now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert!(verdict.cold_temperature);
        assert!(!verdict.hot_temperature);
        assert!(!verdict.precipitation);
        assert!(!verdict.strong_wind);
        assert_eq!(verdict.bad_condition, None);
    }

    #[test]
    fn hot_record_sets_only_hot_flag() {
        let mut e = entry(1, "sunny");
        e.temperature = 33.0;
        let verdict = evaluate_window(&[e], now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert!(verdict.hot_temperature);
        assert!(!verdict.cold_temperature);
    }

    #[test]
    fn wind_above_threshold_flags_strong_wind() {
        let mut e = entry(1, "sunny");
        e.wind_speed = 20.5;
        let entries = [e];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert!(verdict.strong_wind);
        assert_eq!(verdict.bad_at, Some(entries[0].datetime));
    }

    #[test]
    fn records_outside_window_are_ignored() {
        // Lightning at now+9h must not matter with an 8 hour window
        let entries = vec![entry(1, "sunny"), entry(9, "lightning")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(verdict.is_favorable);
        assert_eq!(verdict.bad_condition, None);
    }

    #[test]
    fn record_exactly_at_end_time_is_excluded() {
        // Filtering is strict-less-than on end_time
        let entries = vec![entry(8, "lightning")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(verdict.is_favorable);
    }

    #[test]
    fn record_at_or_before_now_is_included() {
        // No lower bound: currently bad weather counts as unfavorable
        let entries = vec![entry(0, "pouring")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert_eq!(verdict.bad_condition.as_deref(), Some("pouring"));

        let entries = vec![entry(-1, "hail")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
    }

    #[test]
    fn threshold_equal_values_are_favorable() {
        // Strict inequalities throughout: boundary values do not trip
        let e = ForecastEntry {
            datetime: now() + Duration::hours(1),
            condition: "sunny".into(),
            precipitation: 0.1,
            wind_speed: 20.0,
            temperature: 10.0,
        };
        let verdict = evaluate_window(&[e], now(), &thresholds());
        assert!(verdict.is_favorable);
        assert!(!verdict.any_flag());
    }

    #[test]
    fn multiple_predicates_on_one_record_all_flagged() {
        // A single record can trip several predicates; all of them report
        let e = ForecastEntry {
            datetime: now() + Duration::hours(1),
            condition: "snowy".into(),
            precipitation: 2.0,
            wind_speed: 30.0,
            temperature: -2.0,
        };
        let entries = [e];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert_eq!(verdict.bad_condition.as_deref(), Some("snowy"));
        assert!(verdict.precipitation);
        assert!(verdict.strong_wind);
        assert!(verdict.cold_temperature);
        assert!(!verdict.hot_temperature);
        assert_eq!(verdict.bad_at, Some(entries[0].datetime));
    }

    #[test]
    fn scan_follows_given_order_not_time_order() {
        // The evaluator does not sort; the first scanned bad record wins
        // even when a chronologically earlier bad record comes later in
        // the slice.
        let entries = vec![entry(3, "rainy"), entry(1, "hail")];
        let verdict = evaluate_window(&entries, now(), &thresholds());
        assert!(!verdict.is_favorable);
        assert_eq!(verdict.bad_condition.as_deref(), Some("rainy"));
        assert_eq!(verdict.bad_at, Some(entries[0].datetime));
    }

    #[test]
    fn custom_hours_widen_the_window() {
        let mut t = thresholds();
        t.hours = 12;
        let entries = vec![entry(9, "lightning")];
        let verdict = evaluate_window(&entries, now(), &t);
        assert!(!verdict.is_favorable);
        assert_eq!(verdict.bad_condition.as_deref(), Some("lightning"));
    }
}
