//! Durable channel persistence seam
//!
//! A committed channel outlives the process by being written back into the
//! endpoint's existing configuration file. Only the value line for the
//! channel key is touched; everything else in the file is preserved.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use al_protocol::Channel;

use crate::error::StoreError;

/// Durably persists a committed channel value
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Write the committed channel. Called only after a successful confirm.
    async fn persist(&self, channel: Channel) -> Result<(), StoreError>;
}

/// Production store rewriting the channel key line in a config file.
///
/// The rewrite goes through a sibling temp file plus rename so a crash
/// mid-write never leaves a truncated config. An optional secondary file
/// (e.g. a recovery partition copy) is updated best-effort.
pub struct FileStore {
    path: PathBuf,
    key: String,
    secondary: Option<PathBuf>,
}

impl FileStore {
    /// Create a store for the given file and key
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            secondary: None,
        }
    }

    /// Also update a secondary file, best-effort
    pub fn with_secondary(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary = Some(path.into());
        self
    }

    /// Read the channel currently stored under the key.
    ///
    /// The ground driver uses this at startup to learn which channel it is
    /// on, so it knows where to revert to.
    pub async fn load(&self) -> Result<Channel, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        for line in content.lines() {
            if let Some(value) = read_value_line(line, &self.key) {
                if let Ok(channel) = value.parse::<Channel>() {
                    return Ok(channel);
                }
            }
        }

        Err(StoreError::KeyMissing {
            key: self.key.clone(),
            path: self.path.clone(),
        })
    }

    async fn rewrite_file(path: &Path, key: &str, channel: Channel) -> Result<(), StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let mut replaced = false;
        let mut out = String::with_capacity(content.len());

        for line in content.lines() {
            match rewrite_value_line(line, key, channel) {
                Some(new_line) => {
                    out.push_str(&new_line);
                    replaced = true;
                }
                None => out.push_str(line),
            }
            out.push('\n');
        }

        if !replaced {
            return Err(StoreError::KeyMissing {
                key: key.to_string(),
                path: path.to_path_buf(),
            });
        }

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, out).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Extract the value from a `key = value` / `key: value` line, with any
/// single quotes stripped. Returns None for non-matching lines.
fn read_value_line<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(key)?;

    let sep_idx = rest.find(['=', ':'])?;
    if !rest[..sep_idx].trim().is_empty() {
        return None;
    }

    let value = rest[sep_idx + 1..].trim();
    Some(value.trim_matches('\''))
}

/// Rewrite `key = value` / `key: value` lines, preserving indentation,
/// separator style, and single-quoting. Returns None for non-matching lines.
fn rewrite_value_line(line: &str, key: &str, channel: Channel) -> Option<String> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(key)?;

    let sep_idx = rest.find(['=', ':'])?;
    if !rest[..sep_idx].trim().is_empty() {
        // Key was only a prefix of a longer identifier
        return None;
    }
    let sep = rest.as_bytes()[sep_idx] as char;

    let old_value = rest[sep_idx + 1..].trim();
    let quoted = old_value.starts_with('\'') && old_value.ends_with('\'');
    let value = if quoted {
        format!("'{}'", channel)
    } else {
        channel.to_string()
    };

    let indent = &line[..line.len() - trimmed.len()];
    Some(format!("{}{}{} {}", indent, key, sep, value))
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn persist(&self, channel: Channel) -> Result<(), StoreError> {
        Self::rewrite_file(&self.path, &self.key, channel).await?;

        if let Some(secondary) = &self.secondary {
            if let Err(e) = Self::rewrite_file(secondary, &self.key, channel).await {
                tracing::warn!(
                    "Secondary persist to {:?} failed (primary succeeded): {}",
                    secondary,
                    e
                );
            }
        }

        Ok(())
    }
}
