//! Query interpretation: free text → [`SearchParams`].
//!
//! Two tiers. The LLM tier asks for a fixed JSON schema and is used when a
//! text-generation client is configured; any call or decode failure drops to
//! the rule tier for that call. The rule tier is deterministic and total.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use super::llm::LlmClient;
use super::params::SearchParams;

lazy_static! {
    // Ordered: first matching phrase wins and its span is stripped.
    static ref TIME_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\b(yesterday|last day)\b").unwrap(), "yesterday"),
        (Regex::new(r"(?i)\b(last week|past week)\b").unwrap(), "last week"),
        (Regex::new(r"(?i)\b(today|this day)\b").unwrap(), "today"),
        (Regex::new(r"(?i)\b(this week|current week)\b").unwrap(), "this week"),
        (Regex::new(r"(?i)\b(last month|past month)\b").unwrap(), "last month"),
    ];

    // "what John said", "from alice said", "by bob said"
    static ref USER_RE: Regex = Regex::new(r"(?i)\b(what|from|by)\s+(\w+)\s+said\b").unwrap();

    static ref CONTENT_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\b(decision|decide|decided)").unwrap(), "decisions"),
        (Regex::new(r"(?i)\b(question|asked|asking)").unwrap(), "questions"),
        (Regex::new(r"(?i)\b(issue|problem|bug)").unwrap(), "issues"),
        (Regex::new(r"(?i)\b(concern|worried|problem)").unwrap(), "concerns"),
    ];

    static ref SENTIMENT_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\b(confused|unclear|lost)\b").unwrap(), "confused"),
        (Regex::new(r"(?i)\b(excited|happy|great)\b").unwrap(), "excited"),
        (Regex::new(r"(?i)\b(concerned|worried|anxious)\b").unwrap(), "concerned"),
    ];

    static ref CHANNEL_RE: Regex = Regex::new(r"#(\w+)").unwrap();
    static ref SIGIL_RE: Regex = Regex::new(r"[#@]").unwrap();
    static ref STOPWORD_RE: Regex =
        Regex::new(r"(?i)\b(show|find|get|me|discussions?|about|the)\b").unwrap();
    static ref FENCE_OPEN_RE: Regex = Regex::new(r"^```(?:json)?\s*").unwrap();
    static ref FENCE_CLOSE_RE: Regex = Regex::new(r"\s*```$").unwrap();
}

/// Interpretation strategy, selected once at construction by probing for an
/// LLM client. Both variants are total: `interpret` always returns a value.
pub enum QueryInterpreter {
    Llm(Box<dyn LlmClient>),
    Rules,
}

impl QueryInterpreter {
    pub fn with_client(client: Box<dyn LlmClient>) -> Self {
        Self::Llm(client)
    }

    pub fn rules() -> Self {
        Self::Rules
    }

    pub fn interpret(&self, query: &str) -> SearchParams {
        match self {
            Self::Llm(client) => match interpret_with_llm(client.as_ref(), query) {
                Ok(params) => params,
                Err(e) => {
                    eprintln!("LLM query parsing failed, using rules: {e}");
                    interpret_with_rules(query)
                }
            },
            Self::Rules => interpret_with_rules(query),
        }
    }
}

fn interpret_with_llm(client: &dyn LlmClient, query: &str) -> Result<SearchParams> {
    let prompt = format!(
        r#"Parse this chat search query and extract structured search parameters:
Query: "{query}"

Extract and return ONLY a valid JSON object with these fields:
{{
    "keywords": ["main", "search", "terms"],
    "time_filter": "last week" or "yesterday" or null,
    "user_filter": "John" or "team lead" or null,
    "content_type": "decisions" or "questions" or "issues" or "concerns" or null,
    "sentiment": "confused" or "excited" or "concerned" or null,
    "channel_hints": ["channel-name"] or []
}}

Return ONLY the JSON, no other text."#
    );

    let raw = client.complete(&prompt)?;
    let cleaned = strip_code_fences(raw.trim());
    serde_json::from_str(cleaned).context("LLM returned a non-schema response")
}

fn strip_code_fences(raw: &str) -> &str {
    let raw = match FENCE_OPEN_RE.find(raw) {
        Some(m) => &raw[m.end()..],
        None => raw,
    };
    match FENCE_CLOSE_RE.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    }
}

/// Deterministic rule tier. Time and user phrases are stripped from the
/// working query so filter wording does not pollute the keyword list;
/// content type and sentiment are classified against the original query
/// since those words may also be part of the topic itself.
pub fn interpret_with_rules(query: &str) -> SearchParams {
    let mut working = query.to_string();

    let mut time_filter = None;
    for (pattern, label) in TIME_PATTERNS.iter() {
        if pattern.is_match(&working) {
            time_filter = Some((*label).to_string());
            working = pattern.replace_all(&working, "").into_owned();
            break;
        }
    }

    let user_filter = USER_RE
        .captures(&working)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string());
    if user_filter.is_some() {
        working = USER_RE.replace_all(&working, "").into_owned();
    }

    let content_type = CONTENT_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(query))
        .map(|(_, label)| (*label).to_string());

    let sentiment = SENTIMENT_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(query))
        .map(|(_, label)| (*label).to_string());

    // Deduplicated, order of first occurrence.
    let mut channel_hints: Vec<String> = Vec::new();
    for caps in CHANNEL_RE.captures_iter(&working) {
        let name = caps[1].to_string();
        if !channel_hints.contains(&name) {
            channel_hints.push(name);
        }
    }

    let cleaned = SIGIL_RE.replace_all(&working, "");
    let cleaned = STOPWORD_RE.replace_all(&cleaned, "");
    let keywords = cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(|word| word.to_string())
        .collect();

    SearchParams {
        keywords,
        time_filter,
        user_filter,
        content_type,
        sentiment,
        channel_hints,
    }
}
