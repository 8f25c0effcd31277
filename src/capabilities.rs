//! Destructive-action capability flags.
//!
//! [`CapabilitySet`] records which tools may run destructive actions in this
//! deployment. It is a plain value: the gate receives a snapshot per call and
//! never reads process state itself.
//!
//! [`CapabilityStore`] owns the current set. When the configuration came from
//! a file, the store checks the file's mtime before handing out a snapshot
//! and re-reads the flags if it changed, so an operator can enable or revoke
//! destructive actions without restarting the server. Only the flags are
//! reloaded; endpoint and API key changes still need a restart.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::{Mutex, RwLock};

use crate::config;
use crate::registry::Tool;

/// Tools whose destructive actions are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    destructive: BTreeSet<Tool>,
}

impl CapabilitySet {
    /// Nothing enabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every tool enabled.
    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            destructive: Tool::ALL.iter().copied().collect(),
        }
    }

    #[cfg(test)]
    pub fn allow(mut self, tool: Tool) -> Self {
        self.destructive.insert(tool);
        self
    }

    pub fn set(&mut self, tool: Tool, enabled: bool) {
        if enabled {
            self.destructive.insert(tool);
        } else {
            self.destructive.remove(&tool);
        }
    }

    pub fn allows_destructive(&self, tool: Tool) -> bool {
        self.destructive.contains(&tool)
    }

    /// Enabled tools, sorted.
    pub fn enabled(&self) -> impl Iterator<Item = Tool> + '_ {
        self.destructive.iter().copied()
    }
}

/// Holds the live [`CapabilitySet`], optionally backed by a config file.
pub struct CapabilityStore {
    current: RwLock<CapabilitySet>,
    /// Config file to watch (if loaded from file).
    source: Option<PathBuf>,
    /// Last observed mtime of the config file.
    last_mtime: Mutex<Option<SystemTime>>,
}

impl CapabilityStore {
    /// A store whose flags only change through [`CapabilityStore::replace`].
    pub fn fixed(set: CapabilitySet) -> Self {
        Self {
            current: RwLock::new(set),
            source: None,
            last_mtime: Mutex::new(None),
        }
    }

    /// A store that re-reads flags from `path` when the file changes.
    pub fn watching(set: CapabilitySet, path: PathBuf) -> Self {
        let mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self {
            current: RwLock::new(set),
            source: Some(path),
            last_mtime: Mutex::new(mtime),
        }
    }

    /// The flags in effect right now.
    pub async fn snapshot(&self) -> CapabilitySet {
        self.maybe_reload().await;
        self.current.read().await.clone()
    }

    /// Swap in a new set explicitly.
    pub async fn replace(&self, set: CapabilitySet) {
        *self.current.write().await = set;
    }

    async fn maybe_reload(&self) {
        let path = match &self.source {
            Some(p) => p,
            None => return,
        };

        let current_mtime = match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(_) => return,
        };

        let mut last = self.last_mtime.lock().await;
        if *last == Some(current_mtime) {
            return;
        }

        // A broken edit keeps the previous flags; the next change retries.
        *last = Some(current_mtime);
        let reloaded = match tokio::fs::read_to_string(path).await {
            Ok(contents) => config::capabilities_from_contents(path, &contents),
            Err(e) => Err(format!("Failed to read config file {}: {}", path.display(), e)),
        };
        match reloaded {
            Ok(set) => {
                let enabled: Vec<&str> = set.enabled().map(Tool::as_str).collect();
                tracing::info!(
                    path = %path.display(),
                    enabled = ?enabled,
                    "Config file changed, reloaded destructive-action flags"
                );
                self.replace(set).await;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Capability reload failed");
            }
        }
    }
}
