//! Human-readable relative time labels.
//!
//! Pure functions only; the feed engine calls these on its refresh
//! interval without touching the network.

use chrono::{DateTime, Utc};

/// Format `instant` relative to `now` ("just now", "5 minutes ago", ...).
///
/// Instants in the future (client clock ahead of the server clock)
/// collapse to "just now" rather than a negative age.
pub fn relative_label(now: DateTime<Utc>, instant: DateTime<Utc>) -> String {
    let secs = (now - instant).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }

    let mins = secs / 60;
    if mins < 60 {
        return plural(mins, "minute");
    }

    let hours = mins / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days < 7 {
        return plural(days, "day");
    }

    // Older than a week: absolute date reads better than "412 days ago".
    instant.format("%b %-d, %Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_just_now() {
        let now = Utc::now();
        assert_eq!(relative_label(now, now), "just now");
        assert_eq!(relative_label(now, now - Duration::seconds(59)), "just now");
    }

    #[test]
    fn test_future_instant_clamps() {
        let now = Utc::now();
        assert_eq!(relative_label(now, now + Duration::seconds(30)), "just now");
    }

    #[test]
    fn test_minutes_and_hours() {
        let now = Utc::now();
        assert_eq!(relative_label(now, now - Duration::minutes(1)), "1 minute ago");
        assert_eq!(relative_label(now, now - Duration::minutes(5)), "5 minutes ago");
        assert_eq!(relative_label(now, now - Duration::hours(3)), "3 hours ago");
    }

    #[test]
    fn test_days() {
        let now = Utc::now();
        assert_eq!(relative_label(now, now - Duration::days(2)), "2 days ago");
    }

    #[test]
    fn test_older_than_a_week_is_a_date() {
        let now = Utc::now();
        let label = relative_label(now, now - Duration::days(30));
        assert!(!label.ends_with("ago"), "got {label}");
    }
}
