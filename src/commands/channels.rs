//! Channels command - list channels present in an archive.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::core::archive::MessageArchive;

pub fn run(archive: &Path, json: bool) -> Result<()> {
    let archive = MessageArchive::open(archive)?;
    let channels = archive.channels();

    if json {
        let listing: Vec<_> = channels
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "messages": archive.channel_messages(name, usize::MAX).len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if channels.is_empty() {
        println!("{} No channels found in archive.", "!".yellow());
        return Ok(());
    }

    println!("{} {} channels:", "→".dimmed(), channels.len());
    for name in &channels {
        let count = archive.channel_messages(name, usize::MAX).len();
        println!("  #{} ({} messages)", name.cyan(), count);
    }

    Ok(())
}
