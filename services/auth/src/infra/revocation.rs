use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Process-local list of revoked session tokens.
///
/// Maps the literal token string to the instant after which the entry may be
/// dropped (the token's own expiry). Cloning shares the same list.
///
/// Not persisted and not shared between instances: a restart forgets every
/// revocation, and a token revoked on one instance stays valid on the others.
#[derive(Clone, Default)]
pub struct RevocationList {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.insert(token.to_owned(), expires_at);
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(token)
    }

    /// Drop entries whose expiry is before `now`. Returns the number removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Background task that sweeps a [`RevocationList`] on a fixed interval.
///
/// Started explicitly with [`RevocationSweeper::start`] and stopped with
/// [`RevocationSweeper::stop`], which waits for the task to finish.
pub struct RevocationSweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RevocationSweeper {
    pub fn start(list: RevocationList, every: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let removed = list.sweep(Utc::now()).await;
                        debug!(removed, "revocation list swept");
                    }
                }
            }
        });

        info!(interval_secs = every.as_secs(), "revocation sweeper started");
        Self { cancel, handle }
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
        info!("revocation sweeper stopped");
    }
}
