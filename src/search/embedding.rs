//! Deterministic local text embeddings.
//!
//! Harmonic token projection: each token is encoded as an integer from its
//! Unicode code points, reduced modulo a set of primes, and projected onto
//! the unit circle per modulus. Token vectors are mean-pooled and L2
//! normalized. No model file, no network, identical output across runs,
//! which makes the embedding tier always available and cheap enough to run
//! per message.

use std::f64::consts::PI;

use anyhow::Result;

/// Output dimension: two circle coordinates per modulus.
pub const EMBEDDING_DIM: usize = 256;

const NUM_MODULI: usize = EMBEDDING_DIM / 2;

/// Tokens longer than this are truncated before integer encoding.
const MAX_TOKEN_CHARS: usize = 64;

/// Text-to-vector capability consumed by the ranking stage.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;
}

/// The built-in harmonic projection embedder.
pub struct HarmonicEmbedder {
    moduli: Vec<u64>,
}

impl HarmonicEmbedder {
    pub fn new() -> Self {
        Self {
            moduli: first_primes(NUM_MODULI),
        }
    }

    fn project_token(&self, token: &str) -> Vec<f64> {
        let n = token_integer(token);
        let mut out = Vec::with_capacity(EMBEDDING_DIM);
        for &m in &self.moduli {
            let theta = 2.0 * PI * ((n % m) as f64) / (m as f64);
            out.push(theta.sin());
            out.push(theta.cos());
        }
        out
    }
}

impl Default for HarmonicEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HarmonicEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(vec![0.0; EMBEDDING_DIM]);
        }

        // Mean pooling over token projections.
        let mut pooled = vec![0.0f64; EMBEDDING_DIM];
        for token in &tokens {
            for (slot, value) in pooled.iter_mut().zip(self.project_token(token)) {
                *slot += value;
            }
        }
        let count = tokens.len() as f64;
        for slot in &mut pooled {
            *slot /= count;
        }

        let norm: f64 = pooled.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            Ok(pooled.iter().map(|x| (*x / norm) as f32).collect())
        } else {
            Ok(pooled.iter().map(|x| *x as f32).collect())
        }
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Base-2^16 integer encoding of a token's code points, wrapping on
/// overflow.
fn token_integer(token: &str) -> u64 {
    token
        .chars()
        .take(MAX_TOKEN_CHARS)
        .fold(0u64, |acc, c| acc.wrapping_mul(65536).wrapping_add(c as u64))
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate: u64 = 2;
    while primes.len() < count {
        if primes.iter().all(|p| candidate % p != 0) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Cosine similarity; 0.0 when dimensions differ or either vector is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}
