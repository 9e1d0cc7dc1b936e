//! Result summarization.

use anyhow::Result;

use super::llm::LlmClient;
use super::ranker::ScoredMessage;

pub const NO_RESULTS_SUMMARY: &str = "No relevant messages found.";
pub const ONE_RESULT_SUMMARY: &str = "Found 1 relevant message matching your search.";

/// How many top results feed the LLM prompt.
const SUMMARY_RESULT_BUDGET: usize = 5;
/// Per-message text budget in the prompt, in characters.
const SUMMARY_TEXT_BUDGET: usize = 200;

/// Summarizes ranked results. LLM tier when a client is configured, with a
/// deterministic count-based fallback; always returns a string.
pub struct SummaryGenerator {
    client: Option<Box<dyn LlmClient>>,
}

impl SummaryGenerator {
    pub fn with_client(client: Option<Box<dyn LlmClient>>) -> Self {
        Self { client }
    }

    pub fn rule_based() -> Self {
        Self { client: None }
    }

    pub fn summarize(&self, results: &[ScoredMessage], query: &str) -> String {
        if results.is_empty() {
            return NO_RESULTS_SUMMARY.to_string();
        }
        if results.len() == 1 {
            return ONE_RESULT_SUMMARY.to_string();
        }

        if let Some(client) = &self.client {
            match summarize_with_llm(client.as_ref(), results, query) {
                Ok(summary) => return summary,
                Err(e) => eprintln!("LLM summary failed, using counts: {e}"),
            }
        }

        format!(
            "Found {} relevant messages discussing the topic.",
            results.len()
        )
    }
}

fn summarize_with_llm(
    client: &dyn LlmClient,
    results: &[ScoredMessage],
    query: &str,
) -> Result<String> {
    let mut lines = Vec::new();
    for result in results.iter().take(SUMMARY_RESULT_BUDGET) {
        let author = result.message.user.as_deref().unwrap_or("Unknown");
        let text: String = result
            .message
            .text
            .chars()
            .take(SUMMARY_TEXT_BUDGET)
            .collect();
        lines.push(format!("{author}: {text}"));
    }

    let prompt = format!(
        r#"User searched for: "{query}"

Here are the most relevant messages found:
{}

Provide a 1-2 sentence summary of what these results show about the topic.
Focus on key insights, decisions, or important information."#,
        lines.join("\n")
    );

    client.complete(&prompt)
}

#[cfg(test)]
mod tests {
    use super::super::llm::testing::FakeLlm;
    use super::*;
    use crate::core::message::Message;

    fn scored(ts: &str, text: &str) -> ScoredMessage {
        ScoredMessage {
            message: Message {
                ts: ts.to_string(),
                text: text.to_string(),
                user: Some("U1".to_string()),
                channel_id: None,
                channel_name: None,
                thread_ts: None,
            },
            score: 0.9,
            match_reason: String::new(),
        }
    }

    #[test]
    fn test_empty_results_fixed_string() {
        let generator = SummaryGenerator::rule_based();
        assert_eq!(generator.summarize(&[], "query"), NO_RESULTS_SUMMARY);

        // Independent of tier availability.
        let generator = SummaryGenerator::with_client(Some(Box::new(FakeLlm::replying("hi"))));
        assert_eq!(generator.summarize(&[], "query"), NO_RESULTS_SUMMARY);
    }

    #[test]
    fn test_single_result_fixed_string() {
        let generator = SummaryGenerator::rule_based();
        let results = vec![scored("1.0", "one")];
        assert_eq!(generator.summarize(&results, "query"), ONE_RESULT_SUMMARY);
    }

    #[test]
    fn test_rule_tier_counts_results() {
        let generator = SummaryGenerator::rule_based();
        let results = vec![scored("1.0", "a"), scored("2.0", "b"), scored("3.0", "c")];
        assert_eq!(
            generator.summarize(&results, "query"),
            "Found 3 relevant messages discussing the topic."
        );
    }

    #[test]
    fn test_llm_tier_used_for_multiple_results() {
        let generator =
            SummaryGenerator::with_client(Some(Box::new(FakeLlm::replying("The team agreed."))));
        let results = vec![scored("1.0", "a"), scored("2.0", "b")];
        assert_eq!(generator.summarize(&results, "query"), "The team agreed.");
    }

    #[test]
    fn test_llm_failure_falls_back_to_counts() {
        let generator = SummaryGenerator::with_client(Some(Box::new(FakeLlm::failing())));
        let results = vec![scored("1.0", "a"), scored("2.0", "b")];
        assert_eq!(
            generator.summarize(&results, "query"),
            "Found 2 relevant messages discussing the topic."
        );
    }
}
