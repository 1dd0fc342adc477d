//! End-to-end aggregation cycles against a file-backed store.
//!
//! Each test gets its own temporary directory. Crawl batches are built from
//! JSON the same way the CLI reads them, so the lenient review decoding is
//! exercised along with the merge and persistence path.

use chrono::{DateTime, Utc};
use serde_json::json;

use mpidx_analytics::{run_analytics_cycle, AnalyticsStore, FsStore, StoreError};
use mpidx_core::{SellerAnalyticsAggregate, SellerBatch};

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 fixture")
        .with_timezone(&Utc)
}

fn batches(value: serde_json::Value) -> Vec<SellerBatch> {
    serde_json::from_value(value).expect("fixture should decode as seller batches")
}

/// First crawl: two sellers with reviews, one with a malformed review list
/// and one without an id.
fn first_crawl() -> Vec<SellerBatch> {
    batches(json!([
        {
            "sellerId": "s1",
            "sellerMeta": {
                "sellerName": "Green Leaf",
                "sellerUrl": "https://market.example/green-leaf"
            },
            "reviews": [
                { "rating": 10, "reviewDate": "2024-06-20T00:00:00Z", "daysToArrive": 2 },
                { "rating": "9", "date": "2024-06-25", "daysToArrive": "3" },
                { "rating": 4, "created": 1_704_067_200 }
            ]
        },
        {
            "sellerId": "s2",
            "sellerMeta": { "sellerName": "Hilltop" },
            "reviews": [
                { "rating": 8, "reviewDate": 1_717_200_000_000_u64 }
            ]
        },
        {
            "sellerId": "s3",
            "reviews": "unavailable"
        },
        {
            "sellerId": "",
            "reviews": [{ "rating": 10 }]
        }
    ]))
}

// ---------------------------------------------------------------------------
// First run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_cycle_seeds_sellers_and_writes_sorted_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path().join("data").join("seller-analytics.json"));

    let summary = run_analytics_cycle(&store, first_crawl(), ts("2024-07-01T00:00:00Z"))
        .await
        .expect("cycle should succeed on first run");

    assert_eq!(summary.sellers_processed, 3);
    assert_eq!(summary.sellers_skipped, 1);
    assert_eq!(summary.new_reviews, 4);
    assert_eq!(summary.total_sellers, 3);

    let written = store.read_seller_analytics().await.unwrap();
    assert_eq!(written.total_sellers, written.sellers.len());
    assert_eq!(written.generated_at, Some(ts("2024-07-01T00:00:00Z")));
    let order: Vec<&str> = written.sellers.iter().map(|s| s.seller_id.as_str()).collect();
    assert_eq!(order, ["s1", "s2", "s3"]);

    let s1 = written.seller("s1").unwrap();
    let lifetime = s1.lifetime.as_ref().unwrap();
    assert_eq!(s1.seller_name, "Green Leaf");
    assert_eq!(lifetime.total_reviews, 3);
    assert_eq!(lifetime.positive_count, 2);
    assert_eq!(lifetime.negative_count, 1);
    assert_eq!(lifetime.perfect_score_count, 1);
    assert_eq!(lifetime.avg_days_to_arrive, Some(2.5));
    assert_eq!(lifetime.reviews_with_shipping_data, 2);
    assert_eq!(lifetime.oldest_review_seen, Some(ts("2024-01-01T00:00:00Z")));
    assert_eq!(lifetime.newest_review_seen, Some(ts("2024-06-25T00:00:00Z")));
    assert_eq!(lifetime.tenure_months, 6);
    assert_eq!(s1.recent_30_days.review_count, 2);
    assert_eq!(s1.recent_30_days.avg_rating, Some(9.5));
    assert_eq!(s1.recent_30_days.avg_days_to_arrive, Some(2.5));

    let s2 = written.seller("s2").unwrap();
    assert_eq!(s2.total_reviews(), 1);
    assert_eq!(
        s2.lifetime.as_ref().unwrap().newest_review_seen,
        Some(ts("2024-06-01T00:00:00Z"))
    );

    let s3 = written.seller("s3").unwrap();
    assert_eq!(s3.total_reviews(), 0);
    assert_eq!(s3.last_seen_at, Some(ts("2024-07-01T00:00:00Z")));
}

#[tokio::test]
async fn written_document_uses_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seller-analytics.json");
    let store = FsStore::new(&path);

    run_analytics_cycle(&store, first_crawl(), ts("2024-07-01T00:00:00Z"))
        .await
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["totalSellers"], json!(3));
    assert_eq!(raw["sellers"][0]["sellerId"], json!("s1"));
    assert_eq!(raw["sellers"][0]["lifetime"]["totalReviews"], json!(3));
    assert_eq!(raw["sellers"][0]["lifetime"]["reviewsWithRating"], json!(3));
    assert_eq!(raw["sellers"][0]["recent30Days"]["reviewCount"], json!(2));
}

// ---------------------------------------------------------------------------
// Incremental runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_cycle_counts_only_new_reviews_and_keeps_absent_sellers() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path().join("seller-analytics.json"));

    run_analytics_cycle(&store, first_crawl(), ts("2024-07-01T00:00:00Z"))
        .await
        .unwrap();

    let second_crawl = batches(json!([
        {
            "sellerId": "s1",
            "reviews": [
                { "rating": 10, "reviewDate": "2024-06-20T00:00:00Z", "daysToArrive": 2 },
                { "rating": "9", "date": "2024-06-25", "daysToArrive": "3" },
                { "rating": 4, "created": 1_704_067_200 },
                { "rating": 6, "reviewDate": "2024-07-05T00:00:00Z" }
            ]
        }
    ]));
    let summary = run_analytics_cycle(&store, second_crawl, ts("2024-07-10T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summary.sellers_processed, 1);
    assert_eq!(summary.new_reviews, 1);
    assert_eq!(summary.total_sellers, 3);

    let written = store.read_seller_analytics().await.unwrap();
    let s1 = written.seller("s1").unwrap();
    let lifetime = s1.lifetime.as_ref().unwrap();
    assert_eq!(lifetime.total_reviews, 4);
    assert_eq!(lifetime.positive_count, 2);
    assert_eq!(lifetime.negative_count, 1);
    let avg = lifetime.avg_rating.unwrap();
    assert!((avg - 7.25).abs() < 1e-9, "avg_rating was {avg}");
    assert_eq!(lifetime.newest_review_seen, Some(ts("2024-07-05T00:00:00Z")));
    // Metadata was not re-sent; the stored values survive.
    assert_eq!(s1.seller_name, "Green Leaf");
    assert_eq!(s1.recent_30_days.review_count, 3);
    assert_eq!(s1.last_seen_at, Some(ts("2024-07-10T00:00:00Z")));

    let s2 = written.seller("s2").unwrap();
    assert_eq!(s2.total_reviews(), 1);
    assert_eq!(s2.last_seen_at, Some(ts("2024-07-01T00:00:00Z")));
}

#[tokio::test]
async fn rerunning_the_same_crawl_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path().join("seller-analytics.json"));

    run_analytics_cycle(&store, first_crawl(), ts("2024-07-01T00:00:00Z"))
        .await
        .unwrap();
    let before = store.read_seller_analytics().await.unwrap();

    let summary = run_analytics_cycle(&store, first_crawl(), ts("2024-07-02T00:00:00Z"))
        .await
        .unwrap();
    let after = store.read_seller_analytics().await.unwrap();

    assert_eq!(summary.new_reviews, 0);
    for seller in &before.sellers {
        let current = after.seller(&seller.seller_id).unwrap();
        assert_eq!(current.total_reviews(), seller.total_reviews());
    }
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_document_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seller-analytics.json");
    std::fs::write(&path, "{\"sellers\": [oops").unwrap();
    let store = FsStore::new(&path);

    let err = run_analytics_cycle(&store, first_crawl(), ts("2024-07-01T00:00:00Z"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Deserialize { .. }), "got {err:?}");
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\"sellers\": [oops"
    );
}

#[tokio::test]
async fn empty_crawl_still_stamps_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path().join("seller-analytics.json"));

    let summary = run_analytics_cycle(&store, Vec::new(), ts("2024-07-01T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summary.total_sellers, 0);
    let written: SellerAnalyticsAggregate = store.read_seller_analytics().await.unwrap();
    assert!(written.sellers.is_empty());
    assert_eq!(written.generated_at, Some(ts("2024-07-01T00:00:00Z")));
}
