// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Warehouse record for one spare part, as served by the catalog's validate
/// endpoint. Wire keys are the backend's own (Italian) column names; every
/// field except `low_stock` may be null in the warehouse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PartMetadata {
    #[serde(rename = "asset_tipo")]
    pub asset_type: Option<String>,
    #[serde(rename = "costruttore")]
    pub manufacturer: Option<String>,
    #[serde(rename = "fornitore")]
    pub supplier: Option<String>,
    #[serde(rename = "quantita_disponibile")]
    pub quantity_available: Option<i64>,
    #[serde(rename = "quantita_minima")]
    pub minimum_quantity: Option<i64>,
    #[serde(rename = "unita_misura")]
    pub unit: Option<String>,
    #[serde(rename = "prezzo_unitario")]
    pub unit_price: Option<f64>,
    #[serde(rename = "scorta_bassa")]
    pub low_stock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_row() {
        let json = r#"{
            "asset_tipo": "Compressore",
            "costruttore": "ABAC",
            "fornitore": "Ricambi SRL",
            "quantita_disponibile": 4,
            "quantita_minima": 2,
            "unita_misura": "pz",
            "prezzo_unitario": 12.5,
            "scorta_bassa": false
        }"#;
        let meta: PartMetadata = serde_json::from_str(json).expect("metadata");
        assert_eq!(meta.asset_type.as_deref(), Some("Compressore"));
        assert_eq!(meta.supplier.as_deref(), Some("Ricambi SRL"));
        assert_eq!(meta.quantity_available, Some(4));
        assert_eq!(meta.unit_price, Some(12.5));
        assert!(!meta.low_stock);
    }

    #[test]
    fn tolerates_sparse_rows() {
        let meta: PartMetadata = serde_json::from_str(r#"{"scorta_bassa": true}"#).expect("metadata");
        assert!(meta.low_stock);
        assert_eq!(meta.asset_type, None);
        assert_eq!(meta.quantity_available, None);
    }
}
