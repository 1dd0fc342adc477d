//! Whole-document aggregation: load, upsert, persist.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use mpidx_core::{SellerAnalyticsAggregate, SellerAnalyticsRecord, SellerBatch, DATA_VERSION};

use crate::error::StoreError;
use crate::merge::compute_seller_analytics;
use crate::store::AnalyticsStore;

/// Outcome of one [`run_analytics_cycle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub sellers_processed: usize,
    pub sellers_skipped: usize,
    /// Reviews newly folded into lifetime totals this cycle.
    pub new_reviews: u64,
    pub total_sellers: usize,
}

/// Loads the persisted aggregate, starting fresh on first run.
///
/// # Errors
///
/// Returns [`StoreError`] for anything other than a missing document. A
/// corrupt or unreadable document is surfaced rather than replaced so the
/// next write cannot silently discard indexed sellers.
pub async fn load_existing_analytics<S: AnalyticsStore>(
    store: &S,
) -> Result<SellerAnalyticsAggregate, StoreError> {
    match store.read_seller_analytics().await {
        Ok(aggregate) => Ok(aggregate),
        Err(StoreError::NotFound { path }) => {
            tracing::info!(%path, "no seller analytics yet, starting empty");
            Ok(SellerAnalyticsAggregate::empty())
        }
        Err(e) => Err(e),
    }
}

/// Upserts `records` into `existing` by seller id.
///
/// Sellers absent from `records` are kept unchanged. The result is sorted
/// by lifetime review count, highest first; ties keep their prior relative
/// order with new sellers after existing ones.
#[must_use]
pub fn update_analytics_aggregate(
    existing: SellerAnalyticsAggregate,
    mut records: BTreeMap<String, SellerAnalyticsRecord>,
    now: DateTime<Utc>,
) -> SellerAnalyticsAggregate {
    let mut seen = HashSet::new();
    let mut sellers: Vec<SellerAnalyticsRecord> = existing
        .sellers
        .into_iter()
        .filter(|s| seen.insert(s.seller_id.clone()))
        .map(|s| records.remove(&s.seller_id).unwrap_or(s))
        .collect();
    sellers.extend(records.into_values());

    sellers.sort_by_key(|s| Reverse(s.total_reviews()));

    SellerAnalyticsAggregate {
        generated_at: Some(now),
        total_sellers: sellers.len(),
        data_version: DATA_VERSION,
        sellers,
    }
}

/// Runs one aggregation cycle over a crawl's seller batches.
///
/// 1. Load the existing aggregate (empty on first run).
/// 2. Compute each seller's updated record against its stored one.
/// 3. Upsert, re-sort and persist the whole document.
///
/// Batches with a blank seller id are skipped with a warning. A seller
/// appearing twice in one crawl is merged onto its in-cycle record.
///
/// # Errors
///
/// Returns [`StoreError`] if the aggregate cannot be loaded or written.
pub async fn run_analytics_cycle<S: AnalyticsStore>(
    store: &S,
    batches: Vec<SellerBatch>,
    now: DateTime<Utc>,
) -> Result<CycleSummary, StoreError> {
    let existing = load_existing_analytics(store).await?;
    let mut summary = CycleSummary::default();
    let mut records: BTreeMap<String, SellerAnalyticsRecord> = BTreeMap::new();

    for batch in batches {
        let seller_id = batch.seller_id.trim().to_string();
        if seller_id.is_empty() {
            tracing::warn!(
                reviews = batch.reviews.len(),
                "skipping seller batch without a seller id"
            );
            summary.sellers_skipped += 1;
            continue;
        }

        let batch = SellerBatch { seller_id, ..batch };
        let previous = records
            .get(&batch.seller_id)
            .or_else(|| existing.seller(&batch.seller_id));
        let before = previous.map_or(0, SellerAnalyticsRecord::total_reviews);

        let record = compute_seller_analytics(&batch, previous, now);
        summary.new_reviews += record.total_reviews().saturating_sub(before);
        summary.sellers_processed += 1;
        records.insert(batch.seller_id, record);
    }

    let updated = update_analytics_aggregate(existing, records, now);
    summary.total_sellers = updated.total_sellers;
    store.write_seller_analytics(&updated).await?;

    tracing::info!(
        processed = summary.sellers_processed,
        skipped = summary.sellers_skipped,
        new_reviews = summary.new_reviews,
        total_sellers = summary.total_sellers,
        "seller analytics cycle complete"
    );
    Ok(summary)
}
