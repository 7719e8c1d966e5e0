// SPDX-License-Identifier: Apache-2.0

use crate::CatalogError;
use async_trait::async_trait;
use gestman_model::{PartMetadata, SparePartId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire body of `GET .../ricambi/all-ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllIdsResponse {
    #[serde(rename = "ricambi_ids", default)]
    pub ids: Vec<String>,
}

/// Wire body of `POST .../ricambi/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub ids: Vec<SparePartId>,
}

/// Wire response of the validate endpoint. The backend omits IDs it does
/// not know; an explicit `null` value is equivalent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    #[serde(rename = "ricambi_info", default)]
    pub info: HashMap<String, Option<PartMetadata>>,
}

/// The warehouse catalog the resolver validates tokens against.
#[async_trait]
pub trait SparePartCatalog: Send + Sync {
    fn catalog_tag(&self) -> &'static str;

    /// Full enumeration of known spare-part IDs, exact casing.
    async fn fetch_all_ids(&self) -> Result<Vec<String>, CatalogError>;

    /// Batch metadata lookup. IDs the backend does not recognize are simply
    /// absent from the returned map.
    async fn fetch_info(
        &self,
        ids: &[SparePartId],
    ) -> Result<HashMap<SparePartId, PartMetadata>, CatalogError>;
}
