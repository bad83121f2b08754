//! Debounced global search: short queries clear the result panel, longer
//! ones fetch after a quiet period, cancelling any earlier pending query.

use std::{collections::HashMap, sync::Arc, time::Duration};

use shared::domain::SearchTarget;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::warn;

use crate::{transport::SearchBackend, ClientEvent};

pub const MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(500);

pub struct Searcher {
    backend: Arc<dyn SearchBackend>,
    events: tokio::sync::broadcast::Sender<ClientEvent>,
    delay: Duration,
    pending: Mutex<HashMap<SearchTarget, JoinHandle<()>>>,
}

impl Searcher {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        events: tokio::sync::broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            backend,
            events,
            delay: DEFAULT_SEARCH_DELAY,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Called on every keystroke for `target`.
    pub async fn input(self: &Arc<Self>, target: &SearchTarget, query: &str) {
        if let Some(previous) = self.pending.lock().await.remove(target) {
            previous.abort();
        }

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            let _ = self.events.send(ClientEvent::SearchCleared {
                target: target.clone(),
            });
            return;
        }

        let searcher = Arc::clone(self);
        let task_target = target.clone();
        let query = trimmed.to_string();
        let task = tokio::spawn(async move {
            tokio::time::sleep(searcher.delay).await;
            match searcher.backend.search(&query, task_target.as_str()).await {
                Ok(response) => {
                    let _ = searcher.events.send(ClientEvent::SearchResults {
                        target: task_target,
                        hits: response.results,
                    });
                }
                Err(err) => {
                    warn!(target = %task_target, query = %query, error = %err, "search request failed");
                }
            }
        });
        self.pending.lock().await.insert(target.clone(), task);
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
