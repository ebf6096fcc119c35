//! Allow-list of registered Telegram usernames, loaded once at startup and read-only afterwards.
//!
//! Sources (merged): `REGISTERED_USERS` (comma or whitespace separated) and
//! `REGISTERED_USERS_FILE` (one username per line, blank lines and `#` comments ignored).
//! A leading `@` on configured entries is dropped. Matching is exact, like Telegram's
//! `from.username` field.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    users: HashSet<String>,
}

fn normalize(entry: &str) -> Option<String> {
    let name = entry.trim().trim_start_matches('@');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

impl AllowList {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            users: users.into_iter().filter_map(|u| normalize(u.as_ref())).collect(),
        }
    }

    /// Parses a comma- or whitespace-separated list.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(|c: char| c == ',' || c.is_whitespace()))
    }

    /// Reads one username per line; `#` starts a comment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read allow-list file {}", path.display()))?;
        Ok(Self::new(
            content
                .lines()
                .map(|line| line.split('#').next().unwrap_or("")),
        ))
    }

    /// Loads from `REGISTERED_USERS` and `REGISTERED_USERS_FILE`; a missing file is an error.
    pub fn from_env() -> Result<Self> {
        let mut list = env::var("REGISTERED_USERS")
            .map(|s| Self::parse(&s))
            .unwrap_or_default();
        if let Ok(path) = env::var("REGISTERED_USERS_FILE") {
            list.extend(Self::from_file(&path)?);
        }
        Ok(list)
    }

    /// Startup summary; warns when nobody can use the bot. Call once tracing is initialized.
    pub fn log_summary(&self) {
        if self.is_empty() {
            warn!("Allow-list is empty; every user will be denied");
        } else {
            info!(count = self.len(), "Allow-list loaded");
        }
    }

    fn extend(&mut self, other: AllowList) {
        self.users.extend(other.users);
    }

    /// True iff `username` is present, non-empty and registered.
    pub fn is_authorized(&self, username: Option<&str>) -> bool {
        match username {
            Some(name) if !name.is_empty() => self.users.contains(name),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
