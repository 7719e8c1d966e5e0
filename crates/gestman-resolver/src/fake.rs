// SPDX-License-Identifier: Apache-2.0

//! In-memory catalog used by the contract tests.

use crate::catalog::SparePartCatalog;
use crate::CatalogError;
use async_trait::async_trait;
use gestman_model::{PartMetadata, SparePartId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub struct FakeCatalog {
    pub ids: Mutex<Vec<String>>,
    pub info: Mutex<HashMap<SparePartId, PartMetadata>>,
    pub all_ids_calls: AtomicU64,
    pub info_calls: AtomicU64,
    pub last_info_request: Mutex<Vec<SparePartId>>,
    pub fail_all_ids: AtomicBool,
    pub fail_info: AtomicBool,
    pub fetch_delay: Mutex<Option<Duration>>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self {
            ids: Mutex::new(Vec::new()),
            info: Mutex::new(HashMap::new()),
            all_ids_calls: AtomicU64::new(0),
            info_calls: AtomicU64::new(0),
            last_info_request: Mutex::new(Vec::new()),
            fail_all_ids: AtomicBool::new(false),
            fail_info: AtomicBool::new(false),
            fetch_delay: Mutex::new(None),
        }
    }
}

impl FakeCatalog {
    pub async fn seed_ids<I: IntoIterator<Item = &'static str>>(&self, ids: I) {
        *self.ids.lock().await = ids.into_iter().map(ToString::to_string).collect();
    }

    pub async fn seed_info(&self, id: &str, metadata: PartMetadata) {
        self.info
            .lock()
            .await
            .insert(SparePartId::new(id), metadata);
    }

    async fn maybe_sleep(&self) {
        if let Some(delay) = *self.fetch_delay.lock().await {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SparePartCatalog for FakeCatalog {
    fn catalog_tag(&self) -> &'static str {
        "fake"
    }

    async fn fetch_all_ids(&self) -> Result<Vec<String>, CatalogError> {
        self.all_ids_calls.fetch_add(1, Ordering::Relaxed);
        self.maybe_sleep().await;
        if self.fail_all_ids.load(Ordering::Relaxed) {
            return Err(CatalogError("injected all-ids failure".to_string()));
        }
        Ok(self.ids.lock().await.clone())
    }

    async fn fetch_info(
        &self,
        ids: &[SparePartId],
    ) -> Result<HashMap<SparePartId, PartMetadata>, CatalogError> {
        self.info_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_info_request.lock().await = ids.to_vec();
        self.maybe_sleep().await;
        if self.fail_info.load(Ordering::Relaxed) {
            return Err(CatalogError("injected validate failure".to_string()));
        }
        let info = self.info.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| info.get(id).map(|meta| (id.clone(), meta.clone())))
            .collect())
    }
}
