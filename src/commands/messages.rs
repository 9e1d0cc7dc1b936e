//! Messages command - show recent messages from one channel.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::core::archive::MessageArchive;
use crate::core::directory::{ArchiveDirectory, UserDirectory};

pub fn run(channel: &str, archive: &Path, limit: usize, json: bool) -> Result<()> {
    let archive = MessageArchive::open(archive)?;
    let directory = ArchiveDirectory::load(archive.root()).unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable user directory: {e}");
        ArchiveDirectory::empty()
    });

    let mut messages = archive.channel_messages(channel, limit);
    // Oldest first for reading.
    messages.reverse();

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("{} No messages found in #{}.", "!".yellow(), channel.cyan());
        return Ok(());
    }

    println!(
        "{} {} messages from #{}:",
        "→".dimmed(),
        messages.len(),
        channel.cyan()
    );
    println!();

    for msg in &messages {
        let when = msg
            .timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
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

        println!("[{}] {}: {}", when.dimmed(), author.bold(), msg.text);
        if msg.is_thread_reply() {
            println!("  {}", "└─ (part of thread)".dimmed());
        }
    }

    Ok(())
}
