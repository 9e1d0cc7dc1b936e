//! MCP server for chat archive search.
//!
//! Exposes the smart-search pipeline and archive browsing as tools over
//! stdio.

mod server;

pub use server::run_mcp_server;
