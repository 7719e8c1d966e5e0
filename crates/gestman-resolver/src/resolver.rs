// SPDX-License-Identifier: Apache-2.0

use crate::catalog::SparePartCatalog;
use crate::coalesce::FetchCoalescer;
use crate::matcher::{find_spare_tokens, TokenMatch};
use crate::CatalogError;
use gestman_model::{PartMetadata, Segment, SparePartId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResolverState {
    Uninitialized = 0,
    Loading = 1,
    Ready = 2,
}

impl ResolverState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Loading,
            2 => Self::Ready,
            _ => Self::Uninitialized,
        }
    }
}

/// Resolves spare-part references in free text against the warehouse catalog.
///
/// Owns both caches exclusively: the existence set (all catalog IDs, exact
/// casing) and the metadata map (lazily batch-fetched, kept for the instance
/// lifetime). Cheap to share behind an `Arc`; segmentation may be called in
/// any state and degrades to "nothing recognized" until the first successful
/// `load`.
pub struct SparePartResolver {
    catalog: Arc<dyn SparePartCatalog>,
    state: AtomicU8,
    known_ids: RwLock<HashSet<String>>,
    info: RwLock<HashMap<SparePartId, Option<PartMetadata>>>,
    // at most one outstanding all-ids fetch per instance
    load_flight: Mutex<()>,
    info_flights: FetchCoalescer,
}

impl SparePartResolver {
    #[must_use]
    pub fn new(catalog: Arc<dyn SparePartCatalog>) -> Self {
        Self {
            catalog,
            state: AtomicU8::new(ResolverState::Uninitialized as u8),
            known_ids: RwLock::new(HashSet::new()),
            info: RwLock::new(HashMap::new()),
            load_flight: Mutex::new(()),
            info_flights: FetchCoalescer::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ResolverState {
        ResolverState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ResolverState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub async fn known_id_count(&self) -> usize {
        self.known_ids.read().await.len()
    }

    /// Fetches the full catalog ID set and replaces the existence cache.
    ///
    /// On failure the prior cache stays in place (stale beats empty) and the
    /// error is both logged and returned for callers that asked explicitly.
    pub async fn load(&self) -> Result<usize, CatalogError> {
        let _flight = self.load_flight.lock().await;
        self.load_locked().await
    }

    /// Explicit cache-population contract: loads once if not already ready,
    /// never fails. Call before relying on recognition; concurrent callers
    /// share a single catalog fetch.
    pub async fn ensure_ready(&self) -> ResolverState {
        if self.state() == ResolverState::Ready {
            return ResolverState::Ready;
        }
        let _flight = self.load_flight.lock().await;
        if self.state() == ResolverState::Ready {
            return ResolverState::Ready;
        }
        // failure already logged; callers render unrecognized text meanwhile
        let _ = self.load_locked().await;
        self.state()
    }

    async fn load_locked(&self) -> Result<usize, CatalogError> {
        let prior = self.state();
        self.set_state(ResolverState::Loading);
        match self.catalog.fetch_all_ids().await {
            Ok(ids) => {
                let count = ids.len();
                *self.known_ids.write().await = ids.into_iter().collect();
                self.set_state(ResolverState::Ready);
                info!(
                    count,
                    catalog = self.catalog.catalog_tag(),
                    "spare part id cache loaded"
                );
                Ok(count)
            }
            Err(err) => {
                self.set_state(prior);
                warn!(
                    error = %err,
                    catalog = self.catalog.catalog_tag(),
                    "spare part id cache load failed; keeping prior cache"
                );
                Err(err)
            }
        }
    }

    /// Clears both caches; the next `load` starts from scratch. Useful after
    /// catalog-modifying operations elsewhere in the application.
    pub async fn invalidate(&self) {
        self.known_ids.write().await.clear();
        self.info.write().await.clear();
        self.set_state(ResolverState::Uninitialized);
        debug!("spare part caches invalidated");
    }

    /// Splits `text` into plain-text and confirmed-reference segments.
    ///
    /// Infallible by contract: tokens that match the pattern but are not in
    /// the existence cache stay part of the surrounding text, and metadata
    /// fetch failures yield references with `metadata: None`. Concatenating
    /// the result's contents reproduces `text` exactly.
    pub async fn segment(&self, text: &str) -> Vec<Segment> {
        let confirmed = self.confirmed_tokens(text).await;
        if confirmed.is_empty() {
            return vec![Segment::text(text)];
        }

        let unique = dedupe_ids(&confirmed);
        let info = self.metadata_for(&unique).await;

        let mut segments = Vec::with_capacity(confirmed.len() * 2 + 1);
        let mut cursor = 0;
        for token in &confirmed {
            if token.start > cursor {
                segments.push(Segment::text(&text[cursor..token.start]));
            }
            let id = SparePartId::new(token.text);
            let metadata = info.get(&id).cloned().flatten();
            segments.push(Segment::reference(id, metadata));
            cursor = token.end();
        }
        if cursor < text.len() {
            segments.push(Segment::text(&text[cursor..]));
        }
        segments
    }

    /// Deduplicated catalog-confirmed IDs cited in `text`, in first-seen
    /// order, without touching the metadata cache.
    pub async fn find_references(&self, text: &str) -> Vec<SparePartId> {
        dedupe_ids(&self.confirmed_tokens(text).await)
    }

    /// Exact-case membership test against the existence cache.
    pub async fn is_known(&self, id: &SparePartId) -> bool {
        self.known_ids.read().await.contains(id.as_str())
    }

    /// Metadata for a set of IDs, batch-fetching any not yet cached.
    ///
    /// One request per batch of previously-unseen IDs; identical batches in
    /// flight are coalesced. After a successful fetch, IDs missing from the
    /// response are cached as `None` so they are not requested again. On
    /// failure nothing is cached and every requested unknown resolves to
    /// `None`, leaving a later call free to retry.
    pub async fn metadata_for(
        &self,
        ids: &[SparePartId],
    ) -> HashMap<SparePartId, Option<PartMetadata>> {
        let missing = self.missing_from_info(ids).await;
        if !missing.is_empty() {
            let key = FetchCoalescer::batch_key(&missing);
            let _flight = self.info_flights.acquire(&key).await;
            // a coalesced twin may have filled the cache while we waited
            let still_missing = self.missing_from_info(&missing).await;
            if !still_missing.is_empty() {
                match self.catalog.fetch_info(&still_missing).await {
                    Ok(found) => {
                        let mut cache = self.info.write().await;
                        for id in &still_missing {
                            cache.insert(id.clone(), found.get(id).cloned());
                        }
                        debug!(
                            requested = still_missing.len(),
                            resolved = found.len(),
                            "spare part metadata batch fetched"
                        );
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            requested = still_missing.len(),
                            "spare part metadata fetch failed; rendering without tooltips"
                        );
                    }
                }
            }
        }

        let cache = self.info.read().await;
        ids.iter()
            .map(|id| (id.clone(), cache.get(id).cloned().flatten()))
            .collect()
    }

    async fn confirmed_tokens<'t>(&self, text: &'t str) -> Vec<TokenMatch<'t>> {
        let known = self.known_ids.read().await;
        find_spare_tokens(text)
            .into_iter()
            .filter(|token| known.contains(token.text))
            .collect()
    }

    async fn missing_from_info(&self, ids: &[SparePartId]) -> Vec<SparePartId> {
        let cache = self.info.read().await;
        let mut missing: Vec<SparePartId> = ids
            .iter()
            .filter(|id| !cache.contains_key(*id))
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

fn dedupe_ids(tokens: &[TokenMatch<'_>]) -> Vec<SparePartId> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .filter(|token| seen.insert(token.text))
        .map(|token| SparePartId::new(token.text))
        .collect()
}
