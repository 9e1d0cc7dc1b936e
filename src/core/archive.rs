//! Workspace-export archive access.
//!
//! An archive is a directory in the standard workspace-export layout: one
//! JSON file (or one directory of JSON files) per channel, each holding an
//! array of message records, plus an optional `users.json` at the root.
//! Channels that fail to read or parse are skipped, never fatal.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::message::Message;

/// Root-level files that are not channels.
const RESERVED_FILES: &[&str] = &["users", "channels", "integration_logs"];

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive directory not found: {0}")]
    NotFound(PathBuf),
    #[error("archive path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Read-only view over an exported message archive.
#[derive(Debug)]
pub struct MessageArchive {
    root: PathBuf,
}

impl MessageArchive {
    pub fn open(root: &Path) -> Result<Self, ArchiveError> {
        if !root.exists() {
            return Err(ArchiveError::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ArchiveError::NotADirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Channel names present in the archive, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names = Vec::new();

        if let Ok(entries) = fs::read_dir(&self.root) {
            for entry in entries.flatten() {
                let path = entry.path();
                let stem = match path.file_stem().and_then(|s| s.to_str()) {
                    Some(s) => s.to_string(),
                    None => continue,
                };
                if path.is_dir() {
                    names.push(stem);
                } else if path.extension().map(|e| e == "json").unwrap_or(false)
                    && !RESERVED_FILES.contains(&stem.as_str())
                {
                    names.push(stem);
                }
            }
        }

        names.sort();
        names.dedup();
        names
    }

    /// Messages for one channel, newest first, truncated to `limit`.
    ///
    /// Each returned message is annotated with the channel name so that
    /// downstream ranking can render provenance without re-resolving it.
    pub fn channel_messages(&self, channel: &str, limit: usize) -> Vec<Message> {
        let mut messages = Vec::new();

        let single = self.root.join(format!("{channel}.json"));
        if single.is_file() {
            messages.extend(read_message_file(&single));
        } else {
            let dir = self.root.join(channel);
            if let Ok(entries) = fs::read_dir(&dir) {
                let mut files: Vec<PathBuf> = entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
                    .collect();
                files.sort();
                for file in files {
                    messages.extend(read_message_file(&file));
                }
            }
        }

        for msg in &mut messages {
            msg.channel_name = Some(channel.to_string());
        }

        // Newest first, matching chat history APIs.
        messages.sort_by(|a, b| {
            let ta = a.ts.parse::<f64>().unwrap_or(0.0);
            let tb = b.ts.parse::<f64>().unwrap_or(0.0);
            tb.partial_cmp(&ta).unwrap_or(std::cmp::Ordering::Equal)
        });
        messages.truncate(limit);
        messages
    }

    /// Gather messages across every channel, up to `per_channel_limit` each.
    pub fn all_messages(&self, per_channel_limit: usize) -> Vec<Message> {
        let mut all = Vec::new();
        for channel in self.channels() {
            all.extend(self.channel_messages(&channel, per_channel_limit));
        }
        all
    }

    /// Plain text search: case-insensitive substring match on message text,
    /// optionally scoped to one channel, newest first, truncated to `limit`.
    pub fn search_text(&self, query: &str, channel: Option<&str>, limit: usize) -> Vec<Message> {
        let needle = query.to_lowercase();
        let channels = match channel {
            Some(name) => vec![name.to_string()],
            None => self.channels(),
        };

        let mut matches = Vec::new();
        for name in channels {
            for msg in self.channel_messages(&name, usize::MAX) {
                if msg.text.to_lowercase().contains(&needle) {
                    matches.push(msg);
                }
            }
        }

        matches.sort_by(|a, b| {
            let ta = a.ts.parse::<f64>().unwrap_or(0.0);
            let tb = b.ts.parse::<f64>().unwrap_or(0.0);
            tb.partial_cmp(&ta).unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        matches
    }
}

/// Parse one export file into messages; unreadable or malformed files
/// contribute nothing.
fn read_message_file(path: &Path) -> Vec<Message> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Skipping unreadable archive file {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Message>>(&raw) {
        Ok(messages) => messages,
        Err(e) => {
            eprintln!("Skipping malformed archive file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
