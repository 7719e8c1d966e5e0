// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Suffix of the spare-part naming convention, matched case-insensitively.
pub const SPARE_SUFFIX: &str = "_spare";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

/// A spare-part identifier, e.g. `filtro-olio_spare` stored as `filtro_olio_spare`.
///
/// Identity is exact string comparison. Case is preserved: the catalog's
/// casing is authoritative and lookups never normalize. `new` is unchecked
/// because the existence cache must carry whatever the backend enumerates;
/// `parse` enforces the convention and is meant for operator-supplied input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparePartId(String);

impl SparePartId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("spare part id must not be empty".to_string()));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError(format!(
                "spare part id may contain only word characters: {s}"
            )));
        }
        let lower = s.to_ascii_lowercase();
        if !lower.ends_with(SPARE_SUFFIX) || lower.len() == SPARE_SUFFIX.len() {
            return Err(ValidationError(format!(
                "spare part id must follow the <name>{SPARE_SUFFIX} convention: {s}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SparePartId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
