//! Seller analytics command handlers for the CLI.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use mpidx_analytics::{
    load_existing_analytics, run_analytics_cycle, CycleSummary, FsStore, MemoryStore,
};
use mpidx_core::{AppConfig, SellerAnalyticsAggregate, SellerAnalyticsRecord, SellerBatch};

/// Sub-commands available under `analytics`.
#[derive(Debug, Subcommand)]
pub enum AnalyticsCommands {
    /// Fold a crawl's seller batches into the analytics document
    Update {
        /// JSON file holding an array of seller batches
        #[arg(long)]
        input: PathBuf,

        /// Compute the update without writing the analytics document
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the sellers with the most lifetime reviews
    Show {
        /// Number of sellers to print (defaults to `MPIDX_SHOW_TOP`)
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Read and decode a crawler batch file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of
/// seller batches.
pub(crate) async fn read_batches(path: &Path) -> anyhow::Result<Vec<SellerBatch>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("batch file {} is not a seller batch array", path.display()))
}

/// Run one aggregation cycle from a batch file.
///
/// With `dry_run` the stored document is loaded into memory and the cycle
/// runs against that copy, so nothing on disk changes.
///
/// # Errors
///
/// Returns an error if the batch file is unreadable or the analytics
/// document cannot be loaded or written.
pub(crate) async fn run_analytics_update(
    config: &AppConfig,
    input: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let batches = read_batches(input).await?;
    let store = FsStore::new(&config.analytics_path);
    let now = Utc::now();

    tracing::info!(
        input = %input.display(),
        batches = batches.len(),
        dry_run,
        "starting analytics update"
    );

    let result = if dry_run {
        let existing = load_existing_analytics(&store)
            .await
            .context("failed to load seller analytics")?;
        let scratch = MemoryStore::with_aggregate(existing);
        run_analytics_cycle(&scratch, batches, now).await
    } else {
        run_analytics_cycle(&store, batches, now).await
    };
    let summary = result.with_context(|| {
        format!(
            "analytics cycle failed for {}",
            config.analytics_path.display()
        )
    })?;

    println!("{}", summary_line(&summary, dry_run));
    Ok(())
}

fn summary_line(summary: &CycleSummary, dry_run: bool) -> String {
    let prefix = if dry_run { "dry-run: would update" } else { "updated" };
    format!(
        "{prefix} {} sellers ({} new reviews, {} skipped); {} sellers indexed",
        summary.sellers_processed,
        summary.new_reviews,
        summary.sellers_skipped,
        summary.total_sellers
    )
}

/// Print the top sellers from the stored analytics document.
///
/// # Errors
///
/// Returns an error if the analytics document exists but cannot be read.
pub(crate) async fn run_analytics_show(
    config: &AppConfig,
    top: Option<usize>,
) -> anyhow::Result<()> {
    let store = FsStore::new(&config.analytics_path);
    let aggregate = load_existing_analytics(&store)
        .await
        .context("failed to load seller analytics")?;

    if aggregate.sellers.is_empty() {
        println!("no seller analytics found; run `analytics update` first");
        return Ok(());
    }

    let limit = top.unwrap_or(config.show_top_default);
    for line in render_table(&aggregate, limit) {
        println!("{line}");
    }
    Ok(())
}

fn render_table(aggregate: &SellerAnalyticsAggregate, limit: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(limit.min(aggregate.sellers.len()) + 2);
    if let Some(generated) = aggregate.generated_at {
        lines.push(format!(
            "{} sellers, generated {}",
            aggregate.total_sellers,
            generated.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    lines.push(format!(
        "{:<28}{:<10}{:<8}{:<8}{:<10}RECENT30",
        "SELLER", "REVIEWS", "AVG", "SHIP", "TENURE"
    ));
    lines.extend(aggregate.sellers.iter().take(limit).map(render_row));
    lines
}

fn render_row(seller: &SellerAnalyticsRecord) -> String {
    let label = if seller.seller_name.is_empty() {
        seller.seller_id.as_str()
    } else {
        seller.seller_name.as_str()
    };
    let lifetime = seller.lifetime.clone().unwrap_or_default();
    let tenure = format!("{}mo", lifetime.tenure_months);
    format!(
        "{:<28}{:<10}{:<8}{:<8}{:<10}{}",
        label,
        lifetime.total_reviews,
        fmt_avg(lifetime.avg_rating),
        fmt_avg(lifetime.avg_days_to_arrive),
        tenure,
        seller.recent_30_days.review_count
    )
}

fn fmt_avg(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}
