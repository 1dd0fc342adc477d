//! Persistence seam for the seller analytics document.
//!
//! The aggregate is always read and rewritten wholesale, so a backend only
//! needs to load and save one JSON document.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mpidx_core::SellerAnalyticsAggregate;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Storage backend for [`SellerAnalyticsAggregate`].
///
/// `read_seller_analytics` returns [`StoreError::NotFound`] when nothing has
/// been written yet; callers treat that as a fresh start.
pub trait AnalyticsStore: Send + Sync {
    fn read_seller_analytics(
        &self,
    ) -> impl Future<Output = Result<SellerAnalyticsAggregate, StoreError>> + Send;

    fn write_seller_analytics(
        &self,
        aggregate: &SellerAnalyticsAggregate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// JSON file on local disk.
#[derive(Debug, Clone)]
pub struct FsStore {
    path: PathBuf,
}

impl FsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.display_path(),
            source,
        }
    }
}

impl AnalyticsStore for FsStore {
    async fn read_seller_analytics(&self) -> Result<SellerAnalyticsAggregate, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.display_path(),
                });
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Deserialize {
            path: self.display_path(),
            source,
        })
    }

    /// Writes to a sibling temp file and renames it into place so readers
    /// never observe a partially written document.
    async fn write_seller_analytics(
        &self,
        aggregate: &SellerAnalyticsAggregate,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(aggregate)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(
            path = %self.path.display(),
            sellers = aggregate.sellers.len(),
            bytes = json.len(),
            "wrote seller analytics"
        );
        Ok(())
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    aggregate: Mutex<Option<SellerAnalyticsAggregate>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_aggregate(aggregate: SellerAnalyticsAggregate) -> Self {
        Self {
            aggregate: Mutex::new(Some(aggregate)),
        }
    }

    /// The last written document, if any.
    pub async fn snapshot(&self) -> Option<SellerAnalyticsAggregate> {
        self.aggregate.lock().await.clone()
    }
}

impl AnalyticsStore for MemoryStore {
    async fn read_seller_analytics(&self) -> Result<SellerAnalyticsAggregate, StoreError> {
        self.aggregate
            .lock()
            .await
            .clone()
            .ok_or_else(|| StoreError::NotFound {
                path: "memory".to_string(),
            })
    }

    async fn write_seller_analytics(
        &self,
        aggregate: &SellerAnalyticsAggregate,
    ) -> Result<(), StoreError> {
        *self.aggregate.lock().await = Some(aggregate.clone());
        Ok(())
    }
}
