//! Chat archive MCP Server implementation

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::archive::MessageArchive;
use crate::core::directory::{ArchiveDirectory, UserDirectory};
use crate::core::message::Message;
use crate::search::engine::SearchEngine;

/// Messages gathered per channel before filtering and ranking.
const GATHER_LIMIT: usize = 100;

/// Parameters for chat_smart_search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SmartSearchParams {
    /// Natural language search query (e.g., "decisions about the mobile app")
    #[schemars(description = "Natural language search query")]
    pub query: String,
    /// Restrict the search to one channel (default: all channels)
    #[schemars(description = "Restrict the search to one channel")]
    #[serde(default)]
    pub channel: Option<String>,
    /// Maximum number of results to return (default: 10)
    #[schemars(description = "Maximum number of results (default: 10)")]
    #[serde(default)]
    pub limit: usize,
    /// Include a natural-language summary of the results (default: true)
    #[schemars(description = "Include a summary of the results (default: true)")]
    #[serde(default = "default_true")]
    pub include_summary: bool,
}

fn default_true() -> bool {
    true
}

/// Parameters for chat_search_messages tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TextSearchParams {
    /// Text fragment to look for in message text
    #[schemars(description = "Text to match, case-insensitive substring")]
    pub query: String,
    /// Restrict the search to one channel (default: all channels)
    #[schemars(description = "Restrict the search to one channel")]
    #[serde(default)]
    pub channel: Option<String>,
    /// Maximum number of results (default: 20)
    #[schemars(description = "Maximum number of results (default: 20)")]
    #[serde(default)]
    pub limit: usize,
}

/// Parameters for chat_get_channel_messages tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChannelMessagesParams {
    /// Channel name as it appears in the archive
    #[schemars(description = "Channel name")]
    pub channel: String,
    /// Maximum number of messages (default: 20)
    #[schemars(description = "Maximum number of messages (default: 20)")]
    #[serde(default)]
    pub limit: usize,
}

/// Parameters for chat_get_user_info tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserInfoParams {
    /// User id to resolve
    #[schemars(description = "User id to resolve")]
    pub user_id: String,
}

/// Chat archive MCP Service
#[derive(Clone)]
pub struct ChatService {
    archive_root: PathBuf,
    // Shared so the embedding cache survives across tool calls.
    engine: Arc<Mutex<SearchEngine>>,
    tool_router: ToolRouter<Self>,
}

impl ChatService {
    pub fn new(archive_root: PathBuf) -> Self {
        Self {
            archive_root,
            engine: Arc::new(Mutex::new(SearchEngine::from_env())),
            tool_router: Self::tool_router(),
        }
    }

    fn open_archive(&self) -> Result<MessageArchive, McpError> {
        MessageArchive::open(&self.archive_root)
            .map_err(|e| McpError::internal_error(format!("Failed to open archive: {e}"), None))
    }
}

fn load_directory(root: &Path) -> ArchiveDirectory {
    ArchiveDirectory::load(root).unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable user directory: {e}");
        ArchiveDirectory::empty()
    })
}

fn clamp_limit(requested: usize, default: usize, max: usize) -> usize {
    if requested == 0 {
        default
    } else {
        requested.min(max)
    }
}

/// Candidate messages for ranking: one channel's history when a scope is
/// given, otherwise a per-channel slice of the whole archive.
fn gather_messages(archive: &MessageArchive, channel: Option<&str>) -> Vec<Message> {
    match channel {
        Some(channel) => archive.channel_messages(channel, GATHER_LIMIT),
        None => archive.all_messages(GATHER_LIMIT),
    }
}

fn resolve_author(directory: &dyn UserDirectory, message: &Message) -> String {
    message
        .user
        .as_deref()
        .map(|id| {
            directory
                .display_name(id)
                .ok()
                .flatten()
                .unwrap_or_else(|| id.to_string())
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

#[tool_router]
impl ChatService {
    /// Natural language search across the archive
    #[tool(
        description = "Search chat messages using a natural language query. Understands time phrases (\"last week\"), user phrases (\"what John said\"), content types (decisions/questions/issues/concerns) and #channel hints; optionally scoped to one channel; returns ranked matches with an optional summary."
    )]
    async fn chat_smart_search(
        &self,
        params: Parameters<SmartSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let SmartSearchParams {
            query,
            channel,
            limit,
            include_summary,
        } = params.0;
        let limit = clamp_limit(limit, 10, 100);
        let root = self.archive_root.clone();
        let engine = Arc::clone(&self.engine);

        // Interpretation, ranking and summarization are synchronous (LLM
        // tiers block on HTTP with a 30s timeout); keep them off the
        // async executor.
        let output = tokio::task::spawn_blocking(move || -> Result<String, McpError> {
            let archive = MessageArchive::open(&root).map_err(|e| {
                McpError::internal_error(format!("Failed to open archive: {e}"), None)
            })?;
            let directory = load_directory(&root);
            let messages = gather_messages(&archive, channel.as_deref());

            let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
            let report = engine.smart_search(&query, &messages, limit, &directory, include_summary);
            drop(engine);

            let results: Vec<_> = report
                .results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "ts": r.message.ts,
                        "channel": r.message.channel_name,
                        "user": resolve_author(&directory, &r.message),
                        "text": r.message.text,
                        "score": r.score,
                        "match_reason": r.match_reason,
                    })
                })
                .collect();

            let output = serde_json::json!({
                "query": query,
                "params": report.params,
                "summary": report.summary,
                "results": results,
            });

            serde_json::to_string_pretty(&output).map_err(|e| {
                McpError::internal_error(format!("JSON serialization failed: {e}"), None)
            })
        })
        .await
        .map_err(|e| McpError::internal_error(format!("Search task failed: {e}"), None))??;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// Plain text search across the archive
    #[tool(
        description = "Find messages containing an exact text fragment. Deterministic case-insensitive substring match, optionally scoped to one channel, newest first. Use chat_smart_search for natural language queries."
    )]
    async fn chat_search_messages(
        &self,
        params: Parameters<TextSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let archive = self.open_archive()?;
        let directory = load_directory(&self.archive_root);
        let limit = clamp_limit(params.0.limit, 20, 100);

        let matches: Vec<_> = archive
            .search_text(&params.0.query, params.0.channel.as_deref(), limit)
            .iter()
            .map(|m| {
                serde_json::json!({
                    "ts": m.ts,
                    "channel": m.channel_name,
                    "user": resolve_author(&directory, m),
                    "text": m.text,
                })
            })
            .collect();

        let output = serde_json::to_string_pretty(&matches).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {e}"), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// List channels present in the archive
    #[tool(description = "List all channels present in the chat archive with message counts.")]
    async fn chat_list_channels(&self) -> Result<CallToolResult, McpError> {
        let archive = self.open_archive()?;

        let listing: Vec<_> = archive
            .channels()
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "messages": archive.channel_messages(name, usize::MAX).len(),
                })
            })
            .collect();

        let output = serde_json::to_string_pretty(&listing).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {e}"), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// Get recent messages from a channel
    #[tool(description = "Get recent messages from one channel, newest first, with resolved author names.")]
    async fn chat_get_channel_messages(
        &self,
        params: Parameters<ChannelMessagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let archive = self.open_archive()?;
        let directory = load_directory(&self.archive_root);
        let limit = clamp_limit(params.0.limit, 20, 500);

        let messages: Vec<_> = archive
            .channel_messages(&params.0.channel, limit)
            .iter()
            .map(|m| {
                serde_json::json!({
                    "ts": m.ts,
                    "user": resolve_author(&directory, m),
                    "text": m.text,
                    "thread_reply": m.is_thread_reply(),
                })
            })
            .collect();

        let output = serde_json::to_string_pretty(&messages).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {e}"), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// Resolve a user id to directory information
    #[tool(description = "Resolve a user id against the archive's user directory.")]
    async fn chat_get_user_info(
        &self,
        params: Parameters<UserInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        let directory = load_directory(&self.archive_root);
        let name = directory
            .display_name(&params.0.user_id)
            .unwrap_or_default();

        let output = serde_json::json!({
            "id": params.0.user_id,
            "display_name": name,
        });

        let output = serde_json::to_string_pretty(&output).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {e}"), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}

#[rmcp::tool_handler]
impl ServerHandler for ChatService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Chat archive search MCP server. Provides natural language search with time/user filters, ranking, and summaries over an exported message archive, plus plain text search.".to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(archive_root: PathBuf) -> Result<()> {
    use tokio::io::{stdin, stdout};

    let service = ChatService::new(archive_root);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed_archive(dir: &Path) {
        fs::write(
            dir.join("general.json"),
            r#"[{"ts": "100.0", "text": "release notes posted"}, {"ts": "200.0", "text": "lunch plans"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("dev.json"),
            r#"[{"ts": "300.0", "text": "release branch cut"}]"#,
        )
        .unwrap();
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(0, 10, 100), 10);
        assert_eq!(clamp_limit(5, 10, 100), 5);
        assert_eq!(clamp_limit(1000, 10, 100), 100);
    }

    #[test]
    fn test_gather_messages_scopes_to_channel() {
        let tmp = tempfile::tempdir().unwrap();
        seed_archive(tmp.path());
        let archive = MessageArchive::open(tmp.path()).unwrap();

        let all = gather_messages(&archive, None);
        assert_eq!(all.len(), 3);

        let scoped = gather_messages(&archive, Some("dev"));
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].channel_name.as_deref(), Some("dev"));
    }

    #[tokio::test]
    async fn test_smart_search_tool_with_channel_scope() {
        let tmp = tempfile::tempdir().unwrap();
        seed_archive(tmp.path());
        let service = ChatService::new(tmp.path().to_path_buf());

        let result = service
            .chat_smart_search(Parameters(SmartSearchParams {
                query: "release".to_string(),
                channel: Some("dev".to_string()),
                limit: 5,
                include_summary: false,
            }))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_text_search_tool() {
        let tmp = tempfile::tempdir().unwrap();
        seed_archive(tmp.path());
        let service = ChatService::new(tmp.path().to_path_buf());

        let result = service
            .chat_search_messages(Parameters(TextSearchParams {
                query: "release".to_string(),
                channel: None,
                limit: 0,
            }))
            .await;
        assert!(result.is_ok());
    }
}
