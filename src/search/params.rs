use serde::{Deserialize, Serialize};

/// Structured search parameters extracted from a natural language query.
///
/// Always constructible: any input that cannot be interpreted degrades to a
/// params value carrying the raw query as its only keyword. Immutable once
/// built; consumed by the filter and ranking stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchParams {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub time_filter: Option<String>,
    #[serde(default)]
    pub user_filter: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub channel_hints: Vec<String>,
}

impl SearchParams {
    /// Parse params from a JSON object. Never fails: malformed input yields
    /// `keywords = [raw]` with every other field empty.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(params) => params,
            Err(_) => Self {
                keywords: vec![raw.to_string()],
                ..Self::default()
            },
        }
    }

    /// True when any filter beyond plain keywords was extracted.
    pub fn has_filters(&self) -> bool {
        self.time_filter.is_some() || self.user_filter.is_some() || self.content_type.is_some()
    }

    /// The query string handed to the ranking stage: joined keywords, or the
    /// original query when extraction left nothing.
    pub fn ranking_query(&self, original: &str) -> String {
        if self.keywords.is_empty() {
            original.to_string()
        } else {
            self.keywords.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_valid() {
        let params = SearchParams::from_json(
            r#"{"keywords": ["deploy"], "time_filter": "last week", "channel_hints": ["ops"]}"#,
        );
        assert_eq!(params.keywords, vec!["deploy"]);
        assert_eq!(params.time_filter.as_deref(), Some("last week"));
        assert_eq!(params.channel_hints, vec!["ops"]);
        assert_eq!(params.user_filter, None);
    }

    #[test]
    fn test_from_json_malformed_degrades_to_raw_keyword() {
        let params = SearchParams::from_json("{not valid json");
        assert_eq!(params.keywords, vec!["{not valid json"]);
        assert_eq!(params.time_filter, None);
        assert_eq!(params.user_filter, None);
        assert_eq!(params.content_type, None);
        assert_eq!(params.sentiment, None);
        assert!(params.channel_hints.is_empty());
    }

    #[test]
    fn test_from_json_partial_object() {
        let params = SearchParams::from_json(r#"{"keywords": []}"#);
        assert!(params.keywords.is_empty());
        assert!(!params.has_filters());
    }

    #[test]
    fn test_ranking_query_falls_back_to_original() {
        let params = SearchParams::default();
        assert_eq!(params.ranking_query("raw query"), "raw query");

        let params = SearchParams {
            keywords: vec!["api".into(), "changes".into()],
            ..SearchParams::default()
        };
        assert_eq!(params.ranking_query("ignored"), "api changes");
    }
}
