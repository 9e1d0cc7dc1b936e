//! Natural-language search core.
//!
//! Pipeline: interpret(query) → time/user filters → similarity ranking →
//! summary. Each AI-backed stage has a deterministic fallback tier; no
//! public operation here returns an error.

pub mod cache;
pub mod embedding;
pub mod engine;
pub mod filters;
pub mod interpreter;
pub mod llm;
pub mod params;
pub mod ranker;
pub mod summary;

pub use cache::EmbeddingCache;
pub use embedding::{cosine_similarity, Embedder, HarmonicEmbedder};
pub use engine::{SearchEngine, SearchReport};
pub use filters::{filter_by_time, filter_by_user};
pub use interpreter::QueryInterpreter;
pub use llm::{LlmClient, OpenAiClient};
pub use params::SearchParams;
pub use ranker::{ScoredMessage, SimilarityRanker};
pub use summary::SummaryGenerator;
