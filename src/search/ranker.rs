//! Similarity ranking: order messages by relevance to a query.
//!
//! Embedding tier when an embedder is configured, keyword-overlap tier
//! otherwise. A tier failure falls back for the whole call so one result
//! list never mixes scoring semantics.

use std::collections::HashSet;

use anyhow::Result;

use crate::core::message::Message;

use super::cache::EmbeddingCache;
use super::embedding::{cosine_similarity, Embedder, HarmonicEmbedder};

/// Messages below this cosine similarity are dropped. Deliberately low so
/// short queries and acronyms still match.
const SIMILARITY_FLOOR: f32 = 0.2;

/// A message plus its relevance score and a human-readable explanation of
/// why it matched. Created fresh per search call.
#[derive(Debug, Clone)]
pub struct ScoredMessage {
    pub message: Message,
    pub score: f32,
    pub match_reason: String,
}

pub struct SimilarityRanker {
    embedder: Option<Box<dyn Embedder>>,
    cache: EmbeddingCache,
}

impl SimilarityRanker {
    /// Default ranker: built-in deterministic embedder, default cache.
    pub fn new() -> Self {
        Self::with_embedder(Some(Box::new(HarmonicEmbedder::new())))
    }

    pub fn with_embedder(embedder: Option<Box<dyn Embedder>>) -> Self {
        Self {
            embedder,
            cache: EmbeddingCache::default(),
        }
    }

    /// Ranker without an embedding capability; every call uses the keyword
    /// tier.
    pub fn keyword_only() -> Self {
        Self::with_embedder(None)
    }

    pub fn cached_embeddings(&self) -> usize {
        self.cache.len()
    }

    /// Score and order `messages` against `query`, descending, truncated to
    /// `limit`. Empty input yields empty output. Never fails: an embedding
    /// tier error routes the whole call to the keyword tier.
    pub fn rank(&mut self, query: &str, messages: &[Message], limit: usize) -> Vec<ScoredMessage> {
        if messages.is_empty() {
            return Vec::new();
        }

        if let Some(embedder) = &self.embedder {
            match rank_with_embeddings(embedder.as_ref(), &mut self.cache, query, messages, limit) {
                Ok(results) => return results,
                Err(e) => eprintln!("Embedding search failed, using keyword matching: {e}"),
            }
        }

        rank_with_keywords(query, messages, limit)
    }
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::new()
    }
}

fn rank_with_embeddings(
    embedder: &dyn Embedder,
    cache: &mut EmbeddingCache,
    query: &str,
    messages: &[Message],
    limit: usize,
) -> Result<Vec<ScoredMessage>> {
    let query_embedding = embedder.embed(query)?;

    let mut scored = Vec::new();
    for message in messages {
        if message.text.is_empty() {
            continue;
        }

        let embedding = match cache.get(&message.ts) {
            Some(cached) => cached,
            None => {
                let fresh = embedder.embed(&message.text)?;
                cache.insert(message.ts.clone(), fresh.clone());
                fresh
            }
        };

        let similarity = cosine_similarity(&query_embedding, &embedding);
        if similarity > SIMILARITY_FLOOR {
            scored.push(ScoredMessage {
                message: message.clone(),
                score: similarity,
                match_reason: format!("Semantic similarity: {similarity:.2}"),
            });
        }
    }

    sort_and_truncate(&mut scored, limit);
    Ok(scored)
}

fn rank_with_keywords(query: &str, messages: &[Message], limit: usize) -> Vec<ScoredMessage> {
    let query_words: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if query_words.is_empty() {
        return Vec::new();
    }

    let mut scored = Vec::new();
    for message in messages {
        if message.text.is_empty() {
            continue;
        }

        let text_words: HashSet<String> = message
            .text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let mut matched: Vec<&String> = query_words.intersection(&text_words).collect();
        if matched.is_empty() {
            continue;
        }
        matched.sort();

        let score = matched.len() as f32 / query_words.len() as f32;
        let matched = matched
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        scored.push(ScoredMessage {
            message: message.clone(),
            score,
            match_reason: format!("Keywords: {matched}"),
        });
    }

    sort_and_truncate(&mut scored, limit);
    scored
}

/// Stable descending sort; equal scores keep input order.
fn sort_and_truncate(scored: &mut Vec<ScoredMessage>, limit: usize) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
}
