//! Smart search pipeline: interpret → filter → rank → summarize.
//!
//! Every stage degrades instead of failing, so a search always produces a
//! report the caller can render. Single-threaded and synchronous; callers
//! needing a timeout impose one around the whole call.

use chrono::Local;

use crate::core::directory::UserDirectory;
use crate::core::message::Message;

use super::filters::{filter_by_time, filter_by_user};
use super::interpreter::QueryInterpreter;
use super::llm::{LlmClient, OpenAiClient};
use super::params::SearchParams;
use super::ranker::{ScoredMessage, SimilarityRanker};
use super::summary::SummaryGenerator;

/// Outcome of one smart search call.
#[derive(Debug)]
pub struct SearchReport {
    /// Filters and keywords extracted from the query.
    pub params: SearchParams,
    /// Ranked matches, best first.
    pub results: Vec<ScoredMessage>,
    /// Natural-language synthesis, present when the caller asked for one.
    pub summary: Option<String>,
}

pub struct SearchEngine {
    interpreter: QueryInterpreter,
    ranker: SimilarityRanker,
    summarizer: SummaryGenerator,
}

impl SearchEngine {
    /// Probe capabilities once: LLM tiers when an API key is configured,
    /// deterministic tiers otherwise. The embedding tier is always on since
    /// the built-in embedder needs no credentials.
    pub fn from_env() -> Self {
        let interpreter = match OpenAiClient::from_env() {
            Some(client) => QueryInterpreter::with_client(Box::new(client)),
            None => QueryInterpreter::rules(),
        };
        let summarizer = SummaryGenerator::with_client(
            OpenAiClient::from_env().map(|c| Box::new(c) as Box<dyn LlmClient>),
        );
        Self {
            interpreter,
            ranker: SimilarityRanker::new(),
            summarizer,
        }
    }

    /// Engine with only deterministic tiers.
    pub fn rule_based() -> Self {
        Self {
            interpreter: QueryInterpreter::rules(),
            ranker: SimilarityRanker::new(),
            summarizer: SummaryGenerator::rule_based(),
        }
    }

    pub fn with_parts(
        interpreter: QueryInterpreter,
        ranker: SimilarityRanker,
        summarizer: SummaryGenerator,
    ) -> Self {
        Self {
            interpreter,
            ranker,
            summarizer,
        }
    }

    /// Interpret `query` standalone; used by the `interpret` command.
    pub fn interpret(&self, query: &str) -> SearchParams {
        self.interpreter.interpret(query)
    }

    /// Run the full pipeline over `messages`.
    pub fn smart_search(
        &mut self,
        query: &str,
        messages: &[Message],
        limit: usize,
        directory: &dyn UserDirectory,
        include_summary: bool,
    ) -> SearchReport {
        let params = self.interpreter.interpret(query);

        let filtered = filter_by_time(messages, params.time_filter.as_deref(), Local::now());
        let filtered = filter_by_user(&filtered, params.user_filter.as_deref(), directory);

        let ranking_query = params.ranking_query(query);
        let results = self.ranker.rank(&ranking_query, &filtered, limit);

        let summary = include_summary.then(|| self.summarizer.summarize(&results, query));

        SearchReport {
            params,
            results,
            summary,
        }
    }
}
