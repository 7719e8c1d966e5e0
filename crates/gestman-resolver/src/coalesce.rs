// SPDX-License-Identifier: Apache-2.0

use gestman_model::SparePartId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes metadata fetches for identical ID batches so that callers
/// racing over the same text do not duplicate a request already in flight.
/// Holders re-check the metadata cache after acquiring.
pub struct FetchCoalescer {
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FetchCoalescer {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Stable key for a batch; `ids` must already be sorted.
    pub fn batch_key(ids: &[SparePartId]) -> String {
        let mut key = String::new();
        for id in ids {
            if !key.is_empty() {
                key.push('\n');
            }
            key.push_str(id.as_str());
        }
        key
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
