// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Spare-part reference resolution for GESTMAN free text.
//!
//! Given arbitrary notes or descriptions, the resolver finds tokens that
//! follow the `<name>_spare` convention, confirms them against the warehouse
//! catalog, and splits the text into typed segments suitable for rendering
//! as links with tooltip metadata. The catalog is an external HTTP
//! collaborator; both of its caches (the existence set and the metadata map)
//! live in memory for the lifetime of one resolver instance.
//!
//! Failures never block rendering: a failed catalog load leaves the prior
//! cache in place, a failed metadata fetch yields references without
//! metadata, and segmentation itself is infallible.

mod catalog;
mod coalesce;
pub mod fake;
mod http;
mod matcher;
mod resolver;

pub const CRATE_NAME: &str = "gestman-resolver";

pub use catalog::{AllIdsResponse, SparePartCatalog, ValidateRequest, ValidateResponse};
pub use http::{HttpCatalog, RetryPolicy};
pub use matcher::{find_spare_tokens, TokenMatch};
pub use resolver::{ResolverState, SparePartResolver};

/// Catalog interaction failure: transport error, unexpected status, or a
/// body that did not parse. Always recoverable for the rendering path.
#[derive(Debug)]
pub struct CatalogError(pub String);

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CatalogError {}
