use std::sync::LazyLock;

use regex::Regex;

/// Sentinel for tasks without a time-of-day — sorts after every real time.
pub const NO_TIME_MINUTES: u32 = u32::MAX;

/// Normalized form of a scheduled time: `4PM`, `11:30AM`.
static NORMALIZED_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?(AM|PM)$").expect("time regex"));

/// A parsed 12-hour clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    /// 1–12
    pub hour: u32,
    /// 0–59
    pub minute: u32,
    /// true = PM
    pub pm: bool,
}

impl ClockTime {
    /// Minutes since midnight. 12AM → 0, 12PM → 720.
    pub fn minutes_from_midnight(self) -> u32 {
        let hour24 = match (self.hour, self.pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        hour24 * 60 + self.minute
    }

    /// Render in the normalized `4PM` / `11:30AM` form.
    pub fn normalized(self) -> String {
        let meridiem = if self.pm { "PM" } else { "AM" };
        if self.minute == 0 {
            format!("{}{}", self.hour, meridiem)
        } else {
            format!("{}:{:02}{}", self.hour, self.minute, meridiem)
        }
    }
}

/// Parse a normalized time string. Returns None for anything that isn't a
/// valid 12-hour time (hour 1–12, minute 00–59).
pub fn parse_clock_time(s: &str) -> Option<ClockTime> {
    let caps = NORMALIZED_TIME.captures(s)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    Some(ClockTime {
        hour,
        minute,
        pm: &caps[3] == "PM",
    })
}

/// Minutes since midnight for a task's optional scheduled time. Unparseable
/// or absent times get the no-time sentinel so they sort last.
pub fn scheduled_minutes(scheduled_time: Option<&str>) -> u32 {
    scheduled_time
        .and_then(parse_clock_time)
        .map(ClockTime::minutes_from_midnight)
        .unwrap_or(NO_TIME_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hour_only() {
        let t = parse_clock_time("4PM").unwrap();
        assert_eq!(t.minutes_from_midnight(), 16 * 60);
        assert_eq!(t.normalized(), "4PM");
    }

    #[test]
    fn parses_hour_and_minutes() {
        let t = parse_clock_time("11:30AM").unwrap();
        assert_eq!(t.minutes_from_midnight(), 11 * 60 + 30);
        assert_eq!(t.normalized(), "11:30AM");
    }

    #[test]
    fn twelve_am_is_midnight_and_twelve_pm_is_noon() {
        assert_eq!(parse_clock_time("12AM").unwrap().minutes_from_midnight(), 0);
        assert_eq!(
            parse_clock_time("12PM").unwrap().minutes_from_midnight(),
            720
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(parse_clock_time("13PM"), None);
        assert_eq!(parse_clock_time("0AM"), None);
        assert_eq!(parse_clock_time("7:75PM"), None);
        assert_eq!(parse_clock_time("4 PM"), None);
        assert_eq!(parse_clock_time("4pm"), None);
    }

    #[test]
    fn missing_time_sorts_last() {
        assert_eq!(scheduled_minutes(None), NO_TIME_MINUTES);
        assert_eq!(scheduled_minutes(Some("garbage")), NO_TIME_MINUTES);
        assert!(scheduled_minutes(Some("11:59PM")) < NO_TIME_MINUTES);
    }
}
