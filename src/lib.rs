//! chatscout library
//!
//! Natural-language search over chat message archives.
//!
//! # Modules
//!
//! - `core`: message records, archive access, user directory
//! - `search`: query interpretation, ranking, filtering, summarization
//! - `mcp`: MCP server for AI assistant integration

pub mod core;
pub mod search;

// Re-exports for convenience
pub use crate::core::archive::MessageArchive;
pub use crate::core::directory::{ArchiveDirectory, NullDirectory, UserDirectory};
pub use crate::core::message::Message;
pub use search::engine::{SearchEngine, SearchReport};
pub use search::params::SearchParams;
pub use search::ranker::ScoredMessage;
