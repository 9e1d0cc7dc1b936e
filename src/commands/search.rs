//! Smart search command - natural language search over an archive.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::core::archive::MessageArchive;
use crate::core::directory::{ArchiveDirectory, UserDirectory};
use crate::core::message::Message;
use crate::search::engine::SearchEngine;

/// Messages gathered per channel before filtering and ranking.
const GATHER_LIMIT: usize = 100;
/// Display budget per message in human output.
const TEXT_PREVIEW_CHARS: usize = 300;

pub fn run(
    query: &str,
    archive: &Path,
    channel: Option<&str>,
    limit: usize,
    no_summary: bool,
    json: bool,
) -> Result<()> {
    let archive = MessageArchive::open(archive)?;
    let directory = ArchiveDirectory::load(archive.root()).unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable user directory: {e}");
        ArchiveDirectory::empty()
    });

    let messages = match channel {
        Some(channel) => archive.channel_messages(channel, GATHER_LIMIT),
        None => archive.all_messages(GATHER_LIMIT),
    };
    if messages.is_empty() {
        println!("{} Archive contains no messages.", "!".yellow());
        return Ok(());
    }

    let mut engine = SearchEngine::from_env();
    let report = engine.smart_search(query, &messages, limit, &directory, !no_summary);

    if json {
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
        let out = serde_json::json!({
            "query": query,
            "params": report.params,
            "summary": report.summary,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if report.results.is_empty() {
        println!(
            "{} No messages found matching: {}",
            "→".dimmed(),
            query.cyan()
        );
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        report.results.len(),
        query.cyan()
    );

    if report.params.has_filters() {
        let mut filters = Vec::new();
        if let Some(ref t) = report.params.time_filter {
            filters.push(format!("Time: {t}"));
        }
        if let Some(ref u) = report.params.user_filter {
            filters.push(format!("User: {u}"));
        }
        if let Some(ref c) = report.params.content_type {
            filters.push(format!("Type: {c}"));
        }
        println!("{} {}", "Detected filters:".bold(), filters.join(", "));
    }

    if let Some(ref summary) = report.summary {
        println!("{} {}", "Summary:".bold(), summary);
    }
    println!();

    for (i, result) in report.results.iter().enumerate() {
        let score_str = format!("{:.2}", result.score);
        let score_colored = if result.score > 0.8 {
            score_str.green()
        } else if result.score > 0.5 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };

        let when = result
            .message
            .timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        let channel = result.message.channel_name.as_deref().unwrap_or("?");
        let author = resolve_author(&directory, &result.message);

        println!(
            "{}. [{}] {} #{} - {}",
            (i + 1).to_string().bold(),
            score_colored,
            when.dimmed(),
            channel.cyan(),
            author
        );

        let preview: String = result
            .message
            .text
            .chars()
            .take(TEXT_PREVIEW_CHARS)
            .collect();
        let ellipsis = if result.message.text.chars().count() > TEXT_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        println!("   {preview}{ellipsis}");
        println!("   {}", result.match_reason.dimmed());
        println!();
    }

    Ok(())
}

fn resolve_author(directory: &ArchiveDirectory, message: &Message) -> String {
    let id = match &message.user {
        Some(id) => id.clone(),
        None => return "Unknown".to_string(),
    };
    directory.display_name(&id).ok().flatten().unwrap_or(id)
}
