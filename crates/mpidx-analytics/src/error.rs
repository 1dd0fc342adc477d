use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("analytics document not found at {path}")]
    NotFound { path: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse analytics document {path}: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize analytics document: {0}")]
    Serialize(#[from] serde_json::Error),
}
