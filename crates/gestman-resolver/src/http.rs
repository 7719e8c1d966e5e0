// SPDX-License-Identifier: Apache-2.0

use crate::catalog::{AllIdsResponse, SparePartCatalog, ValidateRequest, ValidateResponse};
use crate::CatalogError;
use async_trait::async_trait;
use gestman_model::{PartMetadata, SparePartId};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 120,
        }
    }
}

/// HTTP catalog backend speaking the GESTMAN warehouse API.
///
/// Endpoint paths are the deployment contract of the backend's `magazzino`
/// blueprint: `{base}/api/magazzino/ricambi/all-ids` and
/// `{base}/api/magazzino/ricambi/validate`.
pub struct HttpCatalog {
    base_url: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl HttpCatalog {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_retry(base_url, RetryPolicy::default())
    }

    #[must_use]
    pub fn with_retry(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
            timeout: Duration::from_secs(10),
        }
    }

    fn all_ids_url(&self) -> String {
        format!("{}/api/magazzino/ricambi/all-ids", self.base_url)
    }

    fn validate_url(&self) -> String {
        format!("{}/api/magazzino/ricambi/validate", self.base_url)
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    #[instrument(name = "catalog_get_with_retry", skip(self))]
    async fn get_with_retry(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let client = self.client();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .bytes()
                        .await
                        .map(|b| b.to_vec())
                        .map_err(|e| CatalogError(format!("read body failed: {e}")));
                }
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(CatalogError(format!(
                            "catalog request failed status={} url={url}",
                            resp.status()
                        )));
                    }
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(CatalogError(format!("catalog request failed url={url}: {e}")));
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt as u64),
            ))
            .await;
        }
    }

    #[instrument(name = "catalog_post_with_retry", skip(self, body))]
    async fn post_json_with_retry(
        &self,
        url: &str,
        body: &ValidateRequest,
    ) -> Result<Vec<u8>, CatalogError> {
        let client = self.client();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match client.post(url).json(body).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .bytes()
                        .await
                        .map(|b| b.to_vec())
                        .map_err(|e| CatalogError(format!("read body failed: {e}")));
                }
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(CatalogError(format!(
                            "catalog request failed status={} url={url}",
                            resp.status()
                        )));
                    }
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(CatalogError(format!("catalog request failed url={url}: {e}")));
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt as u64),
            ))
            .await;
        }
    }
}

#[async_trait]
impl SparePartCatalog for HttpCatalog {
    fn catalog_tag(&self) -> &'static str {
        "http"
    }

    async fn fetch_all_ids(&self) -> Result<Vec<String>, CatalogError> {
        let bytes = self.get_with_retry(&self.all_ids_url()).await?;
        let parsed: AllIdsResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError(format!("all-ids parse failed: {e}")))?;
        Ok(parsed.ids)
    }

    async fn fetch_info(
        &self,
        ids: &[SparePartId],
    ) -> Result<HashMap<SparePartId, PartMetadata>, CatalogError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let request = ValidateRequest { ids: ids.to_vec() };
        let bytes = self
            .post_json_with_retry(&self.validate_url(), &request)
            .await?;
        let parsed: ValidateResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError(format!("validate parse failed: {e}")))?;
        Ok(parsed
            .info
            .into_iter()
            .filter_map(|(id, meta)| meta.map(|m| (SparePartId::new(id), m)))
            .collect())
    }
}
