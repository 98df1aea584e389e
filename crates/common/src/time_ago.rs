//! Relative "time ago" strings with tiered granularity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Output language for relative durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    #[serde(alias = "en")]
    English,
    #[serde(alias = "tr")]
    Turkish,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Locale::English),
            "tr" | "turkish" => Some(Locale::Turkish),
            _ => None,
        }
    }

    fn units(self) -> [&'static str; 4] {
        match self {
            Locale::English => ["seconds", "minutes", "hours", "days"],
            Locale::Turkish => ["saniye", "dakika", "saat", "gün"],
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Locale::English => "-ago",
            Locale::Turkish => " önce",
        }
    }
}

/// Describe how long ago `then` was, relative to `now`.
///
/// Future instants are clamped to zero elapsed seconds.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let elapsed = (now - then).num_seconds().max(0);
    format_elapsed(elapsed, locale)
}

/// Format a whole number of elapsed seconds.
///
/// The largest unit is always shown; the next smaller unit is appended only
/// when its remainder is non-zero.
pub fn format_elapsed(secs: i64, locale: Locale) -> String {
    let [sec_unit, min_unit, hour_unit, day_unit] = locale.units();

    let (major, major_unit, minor, minor_unit) = if secs < MINUTE {
        (secs, sec_unit, 0, sec_unit)
    } else if secs < HOUR {
        (secs / MINUTE, min_unit, secs % MINUTE, sec_unit)
    } else if secs < DAY {
        (secs / HOUR, hour_unit, (secs % HOUR) / MINUTE, min_unit)
    } else {
        (secs / DAY, day_unit, (secs % DAY) / HOUR, hour_unit)
    };

    if minor == 0 {
        format!("{major} {major_unit}{}", locale.suffix())
    } else {
        format!(
            "{major} {major_unit} {minor} {minor_unit}{}",
            locale.suffix()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_seconds_tier() {
        assert_eq!(format_elapsed(0, Locale::English), "0 seconds-ago");
        assert_eq!(format_elapsed(59, Locale::English), "59 seconds-ago");
    }

    #[test]
    fn test_minutes_tier() {
        assert_eq!(format_elapsed(60, Locale::English), "1 minutes-ago");
        assert_eq!(format_elapsed(120, Locale::English), "2 minutes-ago");
        assert_eq!(format_elapsed(125, Locale::English), "2 minutes 5 seconds-ago");
        assert_eq!(format_elapsed(3_599, Locale::English), "59 minutes 59 seconds-ago");
    }

    #[test]
    fn test_hours_tier() {
        assert_eq!(format_elapsed(3_600, Locale::English), "1 hours-ago");
        // Leftover seconds below a minute are not shown in the hours tier.
        assert_eq!(format_elapsed(3_659, Locale::English), "1 hours-ago");
        assert_eq!(format_elapsed(7_380, Locale::English), "2 hours 3 minutes-ago");
        assert_eq!(format_elapsed(86_399, Locale::English), "23 hours 59 minutes-ago");
    }

    #[test]
    fn test_days_tier() {
        assert_eq!(format_elapsed(86_400, Locale::English), "1 days-ago");
        assert_eq!(format_elapsed(2 * 86_400 + 5 * 3_600, Locale::English), "2 days 5 hours-ago");
        assert_eq!(format_elapsed(86_400 + 3_599, Locale::English), "1 days-ago");
    }

    #[test]
    fn test_turkish_locale() {
        assert_eq!(format_elapsed(125, Locale::Turkish), "2 dakika 5 saniye önce");
        assert_eq!(format_elapsed(30, Locale::Turkish), "30 saniye önce");
        assert_eq!(format_elapsed(90_000, Locale::Turkish), "1 gün 1 saat önce");
    }

    #[test]
    fn test_time_ago_truncates_fractional_seconds() {
        let now = Utc::now();
        let then = now - Duration::milliseconds(125_900);
        assert_eq!(time_ago(then, now, Locale::English), "2 minutes 5 seconds-ago");
    }

    #[test]
    fn test_future_instant_clamps_to_zero() {
        let now = Utc::now();
        let then = now + Duration::seconds(30);
        assert_eq!(time_ago(then, now, Locale::English), "0 seconds-ago");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("TR"), Some(Locale::Turkish));
        assert_eq!(Locale::parse("english"), Some(Locale::English));
        assert_eq!(Locale::parse("fr"), None);
    }
}
