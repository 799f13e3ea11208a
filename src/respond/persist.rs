//! Load/save contract for durable rule storage and the background writer.
//!
//! Saving never runs on the message path: the engine hands a snapshot to
//! [`RuleWriter`], whose task writes only the newest queued snapshot.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::respond::rule::Rule;

/// Durable storage for rules.
pub trait RuleRepository: Send + Sync + 'static {
    /// Every stored rule, in creation order.
    fn load(&self) -> Result<Vec<Rule>, String>;

    /// Replace the stored rules with `rules`.
    fn save(&self, rules: &[Rule]) -> Result<(), String>;
}

/// Queues rule snapshots for a background save task.
pub struct RuleWriter {
    tx: mpsc::UnboundedSender<Vec<Rule>>,
}

impl RuleWriter {
    /// Spawn the save task. It exits once every writer handle is dropped and
    /// the queue is drained.
    pub fn spawn(repository: Arc<dyn RuleRepository>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Rule>>();

        let task = tokio::spawn(async move {
            while let Some(mut rules) = rx.recv().await {
                // Older snapshots are superseded
                while let Ok(newer) = rx.try_recv() {
                    rules = newer;
                }

                let repository = repository.clone();
                let count = rules.len();
                match tokio::task::spawn_blocking(move || repository.save(&rules)).await {
                    Ok(Ok(())) => debug!("💾 Saved {} rules", count),
                    Ok(Err(e)) => error!("Failed to save rules: {}", e),
                    Err(e) => error!("Rule save task failed: {}", e),
                }
            }
        });

        (Self { tx }, task)
    }

    /// Queue a snapshot. Never blocks.
    pub fn save(&self, rules: Vec<Rule>) {
        if self.tx.send(rules).is_err() {
            warn!("Rule writer closed, snapshot dropped");
        }
    }
}
