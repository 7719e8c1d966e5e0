// SPDX-License-Identifier: Apache-2.0

use gestman_model::{reassemble, PartMetadata, Segment, SparePartId};
use gestman_resolver::fake::FakeCatalog;
use gestman_resolver::{ResolverState, SparePartResolver};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn meta(supplier: &str, quantity: i64) -> PartMetadata {
    PartMetadata {
        supplier: Some(supplier.to_string()),
        quantity_available: Some(quantity),
        unit_price: Some(9.9),
        ..PartMetadata::default()
    }
}

async fn ready_resolver(ids: &[&'static str]) -> (Arc<FakeCatalog>, SparePartResolver) {
    let catalog = Arc::new(FakeCatalog::default());
    catalog.seed_ids(ids.iter().copied()).await;
    let resolver = SparePartResolver::new(catalog.clone());
    resolver.load().await.expect("load");
    (catalog, resolver)
}

#[tokio::test]
async fn reassembly_is_lossless() {
    let (_catalog, resolver) = ready_resolver(&["filtro_spare", "cinghia_spare"]).await;
    let inputs = [
        "",
        "nessun ricambio",
        "usa filtro_spare ora",
        "filtro_spare",
        "filtro_spare cinghia_spare",
        "sconosciuto_spare in mezzo a filtro_spare, fine",
        "testo con FILTRO_SPARE maiuscolo",
    ];
    for input in inputs {
        let segments = resolver.segment(input).await;
        assert_eq!(reassemble(&segments), input, "input {input:?}");
    }
}

#[tokio::test]
async fn plain_text_yields_single_text_segment() {
    let (_catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    let segments = resolver.segment("manutenzione ordinaria completata").await;
    assert_eq!(
        segments,
        vec![Segment::text("manutenzione ordinaria completata")]
    );
}

#[tokio::test]
async fn confirmed_token_produces_three_segments_with_metadata() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    catalog
        .seed_info("filtro_spare", meta("Ricambi SRL", 4))
        .await;

    let segments = resolver.segment("usa filtro_spare ora").await;
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], Segment::text("usa "));
    match &segments[1] {
        Segment::Reference {
            content,
            id,
            metadata,
        } => {
            assert_eq!(content, "filtro_spare");
            assert_eq!(id, &SparePartId::new("filtro_spare"));
            let metadata = metadata.as_ref().expect("metadata present");
            assert_eq!(metadata.supplier.as_deref(), Some("Ricambi SRL"));
            assert_eq!(metadata.quantity_available, Some(4));
        }
        Segment::Text { .. } => panic!("expected reference segment"),
    }
    assert_eq!(segments[2], Segment::text(" ora"));
}

#[tokio::test]
async fn unconfirmed_candidate_stays_plain_text() {
    let (_catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    let segments = resolver.segment("serve xyz_spare domani").await;
    assert_eq!(segments, vec![Segment::text("serve xyz_spare domani")]);
}

#[tokio::test]
async fn before_first_load_nothing_is_recognized() {
    let catalog = Arc::new(FakeCatalog::default());
    catalog.seed_ids(["filtro_spare"]).await;
    let resolver = SparePartResolver::new(catalog);

    assert_eq!(resolver.state(), ResolverState::Uninitialized);
    let segments = resolver.segment("usa filtro_spare ora").await;
    assert_eq!(segments, vec![Segment::text("usa filtro_spare ora")]);
}

#[tokio::test]
async fn invalidate_then_reload_reflects_only_new_set() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    assert_eq!(resolver.segment("filtro_spare").await.len(), 1);
    assert!(resolver.segment("filtro_spare").await[0].is_reference());

    catalog.seed_ids(["cinghia_spare"]).await;
    resolver.invalidate().await;
    assert_eq!(resolver.state(), ResolverState::Uninitialized);
    resolver.load().await.expect("reload");

    let segments = resolver.segment("filtro_spare cinghia_spare").await;
    let references: Vec<&str> = segments
        .iter()
        .filter(|s| s.is_reference())
        .map(Segment::content)
        .collect();
    assert_eq!(references, vec!["cinghia_spare"]);
}

#[tokio::test]
async fn invalidate_clears_metadata_cache() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    catalog.seed_info("filtro_spare", meta("Ricambi SRL", 4)).await;

    resolver.segment("filtro_spare").await;
    assert_eq!(catalog.info_calls.load(Ordering::Relaxed), 1);

    resolver.invalidate().await;
    resolver.load().await.expect("reload");
    resolver.segment("filtro_spare").await;
    assert_eq!(catalog.info_calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn metadata_failure_still_yields_reference_and_retries_later() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    catalog.seed_info("filtro_spare", meta("Ricambi SRL", 4)).await;
    catalog.fail_info.store(true, Ordering::Relaxed);

    let segments = resolver.segment("usa filtro_spare").await;
    match &segments[1] {
        Segment::Reference { metadata, .. } => assert!(metadata.is_none()),
        Segment::Text { .. } => panic!("expected reference segment"),
    }

    // nothing was cached on failure, so the next call fetches again
    catalog.fail_info.store(false, Ordering::Relaxed);
    let segments = resolver.segment("usa filtro_spare").await;
    match &segments[1] {
        Segment::Reference { metadata, .. } => assert!(metadata.is_some()),
        Segment::Text { .. } => panic!("expected reference segment"),
    }
    assert_eq!(catalog.info_calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn existence_lookup_is_exact_case() {
    let (_catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    let segments = resolver.segment("ordina FILTRO_SPARE").await;
    assert_eq!(segments, vec![Segment::text("ordina FILTRO_SPARE")]);

    let (_catalog, resolver) = ready_resolver(&["FILTRO_SPARE"]).await;
    let segments = resolver.segment("ordina FILTRO_SPARE").await;
    assert!(segments[1].is_reference());
    assert_eq!(segments[1].content(), "FILTRO_SPARE");
}

#[tokio::test]
async fn metadata_is_fetched_once_per_id() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    catalog.seed_info("filtro_spare", meta("Ricambi SRL", 4)).await;

    resolver.segment("filtro_spare qui").await;
    resolver.segment("e ancora filtro_spare").await;
    assert_eq!(catalog.info_calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn duplicate_tokens_share_one_deduplicated_batch() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    catalog.seed_info("filtro_spare", meta("Ricambi SRL", 4)).await;

    let segments = resolver.segment("filtro_spare poi filtro_spare").await;
    let references = segments.iter().filter(|s| s.is_reference()).count();
    assert_eq!(references, 2);
    assert_eq!(catalog.info_calls.load(Ordering::Relaxed), 1);
    assert_eq!(
        *catalog.last_info_request.lock().await,
        vec![SparePartId::new("filtro_spare")]
    );
}

#[tokio::test]
async fn backend_unknown_id_is_cached_as_absent() {
    // present in the existence cache but missing from the validate response:
    // benign inconsistency, rendered without metadata and not re-requested
    let (catalog, resolver) = ready_resolver(&["fantasma_spare"]).await;

    for _ in 0..2 {
        let segments = resolver.segment("fantasma_spare").await;
        match &segments[0] {
            Segment::Reference { metadata, .. } => assert!(metadata.is_none()),
            Segment::Text { .. } => panic!("expected reference segment"),
        }
    }
    assert_eq!(catalog.info_calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn failed_load_keeps_stale_cache() {
    let (catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    catalog.fail_all_ids.store(true, Ordering::Relaxed);

    assert!(resolver.load().await.is_err());
    assert_eq!(resolver.state(), ResolverState::Ready);
    assert!(resolver.segment("filtro_spare").await[0].is_reference());
}

#[tokio::test]
async fn failed_first_load_stays_uninitialized() {
    let catalog = Arc::new(FakeCatalog::default());
    catalog.fail_all_ids.store(true, Ordering::Relaxed);
    let resolver = SparePartResolver::new(catalog);

    assert!(resolver.load().await.is_err());
    assert_eq!(resolver.state(), ResolverState::Uninitialized);
    assert_eq!(resolver.known_id_count().await, 0);
}

#[tokio::test]
async fn empty_text_yields_single_empty_segment() {
    let (_catalog, resolver) = ready_resolver(&["filtro_spare"]).await;
    assert_eq!(resolver.segment("").await, vec![Segment::text("")]);
}

#[tokio::test]
async fn find_references_dedupes_in_first_seen_order() {
    let (_catalog, resolver) = ready_resolver(&["filtro_spare", "cinghia_spare"]).await;
    let ids = resolver
        .find_references("cinghia_spare, filtro_spare, di nuovo cinghia_spare e ignota_spare")
        .await;
    assert_eq!(
        ids,
        vec![
            SparePartId::new("cinghia_spare"),
            SparePartId::new("filtro_spare"),
        ]
    );
}

#[tokio::test]
async fn ensure_ready_swallows_backend_failure() {
    let catalog = Arc::new(FakeCatalog::default());
    catalog.fail_all_ids.store(true, Ordering::Relaxed);
    let resolver = SparePartResolver::new(catalog.clone());

    assert_eq!(resolver.ensure_ready().await, ResolverState::Uninitialized);

    catalog.fail_all_ids.store(false, Ordering::Relaxed);
    catalog.seed_ids(["filtro_spare"]).await;
    assert_eq!(resolver.ensure_ready().await, ResolverState::Ready);
    assert!(resolver.is_known(&SparePartId::new("filtro_spare")).await);
}
