//! Hot reload of the rule file.

use super::{RuleStore, SharedRules};
use crate::core::{BridgeError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Watch a rule file and swap in a freshly loaded store on change.
///
/// Readers holding the previous store keep using it until they load the
/// handle again; nothing is mutated in place.
pub struct RuleWatcher {
    path: PathBuf,
    rules: SharedRules,
}

impl RuleWatcher {
    /// Create a watcher that publishes into `rules`
    pub fn new(path: PathBuf, rules: SharedRules) -> Self {
        RuleWatcher { path, rules }
    }

    /// Reload once, with the same fallback chain as startup.
    ///
    /// An empty document is taken as a write in progress and leaves the
    /// current store in place. Returns whether a new store was swapped in.
    pub fn reload(&self) -> bool {
        if let Ok(text) = std::fs::read_to_string(&self.path) {
            if is_empty_document(&text) {
                tracing::debug!("Rule file is empty, keeping current rules");
                return false;
            }
        }

        let store = RuleStore::load(Some(&self.path));
        tracing::info!(count = store.len(), "Name rules reloaded");
        self.rules.store(Arc::new(store));
        true
    }

    /// Start watching for rule file changes
    pub async fn watch(self) -> Result<()> {
        use notify::{RecursiveMode, Watcher};

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        })
        .map_err(|e| BridgeError::config(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| BridgeError::config(format!("Failed to watch rule file: {}", e)))?;

        tracing::info!("Watching rule file: {:?}", self.path);

        while let Some(event) = rx.recv().await {
            if matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                tracing::info!("Rule file changed, reloading...");
                self.reload();
            }
        }

        Ok(())
    }
}

/// Blank text, or YAML that holds nothing but comments or `~`.
fn is_empty_document(text: &str) -> bool {
    text.trim().is_empty()
        || serde_yaml::from_str::<serde_yaml::Value>(text).is_ok_and(|v| v.is_null())
}
