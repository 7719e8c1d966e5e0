// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Domain types shared by the GESTMAN spare-part resolver and its callers.
//!
//! Everything here is plain data: identifiers following the `<name>_spare`
//! convention, the warehouse metadata record served by the catalog, and the
//! typed text segments the resolver produces. No I/O lives in this crate.

mod metadata;
mod part;
mod segment;

pub const CRATE_NAME: &str = "gestman-model";

pub use metadata::PartMetadata;
pub use part::{SparePartId, ValidationError, SPARE_SUFFIX};
pub use segment::{reassemble, Segment};
