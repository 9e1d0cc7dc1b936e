//! Find command - plain text search over an archive.
//!
//! Deterministic counterpart to the smart search: case-insensitive substring
//! match on message text, no interpretation or ranking involved.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::core::archive::MessageArchive;
use crate::core::directory::{ArchiveDirectory, UserDirectory};

pub fn run(
    query: &str,
    archive: &Path,
    channel: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let archive = MessageArchive::open(archive)?;
    let directory = ArchiveDirectory::load(archive.root()).unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable user directory: {e}");
        ArchiveDirectory::empty()
    });

    let matches = archive.search_text(query, channel, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("{} No messages contain: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} messages containing: {}",
        "→".dimmed(),
        matches.len(),
        query.cyan()
    );
    println!();

    for msg in &matches {
        let when = msg
            .timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        let channel = msg.channel_name.as_deref().unwrap_or("?");
        let author = msg
            .user
            .as_deref()
            .map(|id| {
                directory
                    .display_name(id)
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| id.to_string())
            })
            .unwrap_or_else(|| "Unknown".to_string());

        println!(
            "[{}] #{} {}: {}",
            when.dimmed(),
            channel.cyan(),
            author.bold(),
            msg.text
        );
    }

    Ok(())
}
