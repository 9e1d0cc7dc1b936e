//! CLI command implementations.

pub mod channels;
pub mod find;
pub mod interpret;
pub mod messages;
pub mod search;
