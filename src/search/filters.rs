//! Pure message-set filters applied before ranking.

use chrono::{DateTime, Datelike, Duration, Local, TimeZone};

use crate::core::directory::UserDirectory;
use crate::core::message::Message;

/// Keep messages whose timestamp is at or after the cutoff implied by the
/// canonical time label. `None` (and an unrecognized label) is a no-op that
/// preserves input order. Messages without a parsable timestamp are dropped
/// when a cutoff applies.
pub fn filter_by_time(
    messages: &[Message],
    time_filter: Option<&str>,
    now: DateTime<Local>,
) -> Vec<Message> {
    let label = match time_filter {
        Some(label) => label.to_lowercase(),
        None => return messages.to_vec(),
    };

    let cutoff = if label.contains("yesterday") {
        now - Duration::hours(24)
    } else if label.contains("last week") || label.contains("past week") {
        now - Duration::days(7)
    } else if label.contains("today") {
        local_midnight(now.date_naive(), now)
    } else if label.contains("this week") || label.contains("current week") {
        let monday = now.date_naive()
            - Duration::days(i64::from(now.weekday().num_days_from_monday()));
        local_midnight(monday, now)
    } else if label.contains("last month") || label.contains("past month") {
        now - Duration::days(30)
    } else {
        return messages.to_vec();
    };

    messages
        .iter()
        .filter(|m| m.timestamp().map(|t| t >= cutoff).unwrap_or(false))
        .cloned()
        .collect()
}

/// Calendar midnight of the given local date. Computed from the naive date
/// rather than by subtracting time-of-day, so the cutoff stays on midnight
/// across DST transitions. Ambiguous midnight resolves to the earlier
/// instant; zones where local midnight does not exist (spring-forward at
/// 00:00) fall back to `now`.
fn local_midnight(date: chrono::NaiveDate, now: DateTime<Local>) -> DateTime<Local> {
    match Local.from_local_datetime(&date.and_time(chrono::NaiveTime::MIN)) {
        chrono::LocalResult::Single(t) | chrono::LocalResult::Ambiguous(t, _) => t,
        chrono::LocalResult::None => now,
    }
}

/// Keep messages authored by the user the filter resolves to, or whose text
/// mentions the filter string. The text clause is a safety net: it keeps the
/// filter useful when directory resolution fails or the name only appears
/// inline. Directory errors degrade to text matching alone.
pub fn filter_by_user(
    messages: &[Message],
    user_filter: Option<&str>,
    directory: &dyn UserDirectory,
) -> Vec<Message> {
    let filter = match user_filter {
        Some(filter) => filter,
        None => return messages.to_vec(),
    };

    let user_id = match directory.find_id(filter) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("User lookup failed, matching on text only: {e}");
            None
        }
    };
    let needle = filter.to_lowercase();

    messages
        .iter()
        .filter(|m| {
            let by_author = match (&user_id, &m.user) {
                (Some(id), Some(author)) => id == author,
                _ => false,
            };
            by_author || m.text.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::NullDirectory;
    use anyhow::{anyhow, Result};
    use chrono::TimeZone;

    fn msg_at(ts_secs: i64, text: &str, user: Option<&str>) -> Message {
        Message {
            ts: format!("{ts_secs}.000100"),
            text: text.to_string(),
            user: user.map(str::to_string),
            channel_id: None,
            channel_name: None,
            thread_ts: None,
        }
    }

    // Wednesday 2024-06-12, 15:00 local time.
    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_none_filter_is_noop_preserving_order() {
        let now = fixed_now();
        let messages = vec![
            msg_at(now.timestamp() - 100, "b", None),
            msg_at(now.timestamp() - 10, "a", None),
        ];
        let out = filter_by_time(&messages, None, now);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "b");
    }

    #[test]
    fn test_yesterday_cutoff() {
        let now = fixed_now();
        let messages = vec![
            msg_at(now.timestamp() - 3600 * 2, "recent", None),
            msg_at(now.timestamp() - 3600 * 30, "stale", None),
        ];
        let out = filter_by_time(&messages, Some("yesterday"), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "recent");
    }

    #[test]
    fn test_today_starts_at_midnight() {
        let now = fixed_now();
        let this_morning = Local.with_ymd_and_hms(2024, 6, 12, 0, 30, 0).unwrap();
        let last_night = Local.with_ymd_and_hms(2024, 6, 11, 23, 30, 0).unwrap();
        let messages = vec![
            msg_at(this_morning.timestamp(), "morning", None),
            msg_at(last_night.timestamp(), "night", None),
        ];
        let out = filter_by_time(&messages, Some("today"), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "morning");
    }

    #[test]
    fn test_start_of_day_is_calendar_midnight() {
        let now = fixed_now();
        let midnight = Local.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap();
        assert_eq!(local_midnight(now.date_naive(), now), midnight);

        // Boundary: exactly-midnight messages count as today, one second
        // earlier does not.
        let at_midnight = msg_at(midnight.timestamp(), "boundary", None);
        let just_before = msg_at(midnight.timestamp() - 1, "late", None);
        let out = filter_by_time(&[at_midnight, just_before], Some("today"), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "boundary");
    }

    #[test]
    fn test_this_week_starts_monday() {
        let now = fixed_now();
        let monday = Local.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let sunday = Local.with_ymd_and_hms(2024, 6, 9, 20, 0, 0).unwrap();
        let messages = vec![
            msg_at(monday.timestamp(), "monday", None),
            msg_at(sunday.timestamp(), "sunday", None),
        ];
        let out = filter_by_time(&messages, Some("this week"), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "monday");
    }

    #[test]
    fn test_last_month_window() {
        let now = fixed_now();
        let messages = vec![
            msg_at(now.timestamp() - 86400 * 20, "kept", None),
            msg_at(now.timestamp() - 86400 * 40, "dropped", None),
        ];
        let out = filter_by_time(&messages, Some("last month"), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "kept");
    }

    #[test]
    fn test_unknown_label_is_noop() {
        let now = fixed_now();
        let messages = vec![msg_at(now.timestamp() - 86400 * 400, "ancient", None)];
        let out = filter_by_time(&messages, Some("fortnight"), now);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_unparsable_timestamp_dropped_under_cutoff() {
        let now = fixed_now();
        let mut bad = msg_at(now.timestamp(), "bad", None);
        bad.ts = "garbage".to_string();
        let out = filter_by_time(&[bad], Some("last week"), now);
        assert!(out.is_empty());
    }

    #[test]
    fn test_time_filter_monotonic() {
        let now = fixed_now();
        let older = msg_at(now.timestamp() - 3600 * 6, "older", None);
        let newer = msg_at(now.timestamp() - 3600 * 3, "newer", None);
        let out = filter_by_time(&[older.clone(), newer.clone()], Some("yesterday"), now);
        // If the older message passes, the newer one must too.
        if out.iter().any(|m| m.text == "older") {
            assert!(out.iter().any(|m| m.text == "newer"));
        }
    }

    struct FixedDirectory;

    impl UserDirectory for FixedDirectory {
        fn display_name(&self, _id: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn find_id(&self, name: &str) -> Result<Option<String>> {
            if name.eq_ignore_ascii_case("john") {
                Ok(Some("U1".to_string()))
            } else {
                Ok(None)
            }
        }
    }

    struct FailingDirectory;

    impl UserDirectory for FailingDirectory {
        fn display_name(&self, _id: &str) -> Result<Option<String>> {
            Err(anyhow!("directory offline"))
        }

        fn find_id(&self, _name: &str) -> Result<Option<String>> {
            Err(anyhow!("directory offline"))
        }
    }

    #[test]
    fn test_user_filter_none_is_noop() {
        let messages = vec![msg_at(1, "hello", Some("U9"))];
        let out = filter_by_user(&messages, None, &NullDirectory);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_user_filter_matches_resolved_author() {
        let messages = vec![
            msg_at(1, "shipping notes", Some("U1")),
            msg_at(2, "other message", Some("U2")),
        ];
        let out = filter_by_user(&messages, Some("John"), &FixedDirectory);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].user.as_deref(), Some("U1"));
    }

    #[test]
    fn test_user_filter_text_mention_safety_net() {
        let messages = vec![
            msg_at(1, "ask john about the migration", Some("U2")),
            msg_at(2, "unrelated", Some("U3")),
        ];
        let out = filter_by_user(&messages, Some("John"), &NullDirectory);
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("john"));
    }

    #[test]
    fn test_user_filter_directory_failure_degrades_to_text() {
        let messages = vec![
            msg_at(1, "ping John re standup", Some("U1")),
            msg_at(2, "quiet", Some("U1")),
        ];
        let out = filter_by_user(&messages, Some("john"), &FailingDirectory);
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("John"));
    }
}
