use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// A single chat message, as it appears in a workspace export.
///
/// The `ts` field doubles as the message identity: chat platforms derive it
/// from the posting instant and guarantee uniqueness per channel. Unknown
/// export fields are ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub ts: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl Message {
    /// Parse the `seconds.micros` timestamp into a local datetime.
    ///
    /// Returns `None` for missing or garbage timestamps so that a single
    /// malformed record never aborts a batch operation.
    pub fn timestamp(&self) -> Option<DateTime<Local>> {
        let seconds: f64 = self.ts.parse().ok()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        let whole = seconds.trunc() as i64;
        let nanos = ((seconds - seconds.trunc()) * 1_000_000_000.0) as u32;
        Local.timestamp_opt(whole, nanos).single()
    }

    /// True when this message is a reply inside a thread.
    pub fn is_thread_reply(&self) -> bool {
        matches!(&self.thread_ts, Some(parent) if *parent != self.ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(ts: &str) -> Message {
        Message {
            ts: ts.to_string(),
            text: String::new(),
            user: None,
            channel_id: None,
            channel_name: None,
            thread_ts: None,
        }
    }

    #[test]
    fn test_timestamp_parses_slack_form() {
        let m = msg("1693123456.000200");
        let t = m.timestamp().unwrap();
        assert_eq!(t.timestamp(), 1693123456);
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!(msg("not-a-ts").timestamp().is_none());
        assert!(msg("").timestamp().is_none());
        assert!(msg("-12.5").timestamp().is_none());
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let raw = r#"{"ts": "1.0", "text": "hi", "user": "U1", "subtype": "bot_message"}"#;
        let m: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(m.text, "hi");
        assert_eq!(m.user.as_deref(), Some("U1"));
    }

    #[test]
    fn test_thread_reply_detection() {
        let mut m = msg("2.0");
        assert!(!m.is_thread_reply());
        m.thread_ts = Some("2.0".to_string());
        assert!(!m.is_thread_reply());
        m.thread_ts = Some("1.0".to_string());
        assert!(m.is_thread_reply());
    }
}
