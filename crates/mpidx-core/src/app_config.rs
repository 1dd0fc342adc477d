use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// `tracing` filter directive, e.g. `"info"` or `"mpidx_parse=trace"`.
    pub log_level: String,
    /// Location of the persisted seller analytics document.
    pub analytics_path: PathBuf,
    /// Number of sellers printed by `analytics show` when `--top` is omitted.
    pub show_top_default: usize,
}
