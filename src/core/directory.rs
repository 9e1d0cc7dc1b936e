//! User directory lookups.
//!
//! The search core only needs two operations: id → display name (for result
//! rendering) and name → id (for author filtering). Both are behind a trait
//! so tests and future live-API callers can supply their own resolver.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name/id resolution capability consumed by the search core.
///
/// Implementations may fail (a live directory can time out); callers in the
/// search core swallow those failures and degrade, per the always-degrade
/// contract.
pub trait UserDirectory {
    /// Display name for a user id, if known.
    fn display_name(&self, id: &str) -> Result<Option<String>>;

    /// Reverse lookup: user id whose real name or handle matches
    /// (case-insensitive).
    fn find_id(&self, name: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
}

/// Directory backed by the archive's `users.json`.
pub struct ArchiveDirectory {
    users: Vec<UserRecord>,
}

impl ArchiveDirectory {
    /// Load from `<root>/users.json`. A missing file yields an empty
    /// directory rather than an error: exports without user metadata are
    /// common and the filter degrades to text matching anyway.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("users.json");
        if !path.exists() {
            return Ok(Self { users: Vec::new() });
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let users: Vec<UserRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Self { users })
    }

    pub fn empty() -> Self {
        Self { users: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for ArchiveDirectory {
    fn display_name(&self, id: &str) -> Result<Option<String>> {
        let found = self.users.iter().find(|u| u.id == id);
        Ok(found.and_then(|u| u.real_name.clone().or_else(|| u.name.clone())))
    }

    fn find_id(&self, name: &str) -> Result<Option<String>> {
        let needle = name.to_lowercase();
        let matches = |field: &Option<String>| {
            field
                .as_deref()
                .map(|v| v.to_lowercase() == needle)
                .unwrap_or(false)
        };
        let found = self
            .users
            .iter()
            .find(|u| matches(&u.real_name) || matches(&u.name));
        Ok(found.map(|u| u.id.clone()))
    }
}

/// Directory that resolves nothing; used when no user metadata exists.
pub struct NullDirectory;

impl UserDirectory for NullDirectory {
    fn display_name(&self, _id: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn find_id(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn directory_with_users() -> ArchiveDirectory {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("users.json"),
            r#"[
                {"id": "U1", "name": "jdoe", "real_name": "John Doe"},
                {"id": "U2", "name": "asmith"}
            ]"#,
        )
        .unwrap();
        ArchiveDirectory::load(tmp.path()).unwrap()
    }

    #[test]
    fn test_find_id_case_insensitive() {
        let dir = directory_with_users();
        assert_eq!(dir.find_id("john doe").unwrap().as_deref(), Some("U1"));
        assert_eq!(dir.find_id("JDOE").unwrap().as_deref(), Some("U1"));
        assert_eq!(dir.find_id("nobody").unwrap(), None);
    }

    #[test]
    fn test_display_name_prefers_real_name() {
        let dir = directory_with_users();
        assert_eq!(dir.display_name("U1").unwrap().as_deref(), Some("John Doe"));
        assert_eq!(dir.display_name("U2").unwrap().as_deref(), Some("asmith"));
        assert_eq!(dir.display_name("U9").unwrap(), None);
    }

    #[test]
    fn test_missing_users_file_is_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ArchiveDirectory::load(tmp.path()).unwrap();
        assert!(dir.is_empty());
        assert_eq!(dir.find_id("anyone").unwrap(), None);
    }
}
