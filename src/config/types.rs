use serde::Deserialize;

/// Main configuration structure for Press-Ingest
///
/// Every section is optional in the TOML file and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub checkpoints: CheckpointConfig,
}

/// Document store location
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// HTTP fetcher behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops before the fetch fails
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Bulk ingestion behavior
#[derive(Debug, Clone, Deserialize)]
pub struct BulkConfig {
    /// Rows fetched concurrently; 1 keeps ingestion strictly sequential
    #[serde(rename = "max-concurrent-rows", default = "default_max_concurrent_rows")]
    pub max_concurrent_rows: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_concurrent_rows: default_max_concurrent_rows(),
        }
    }
}

/// Checkpoint snapshot location
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default = "default_checkpoint_dir")]
    pub dir: String,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            dir: default_checkpoint_dir(),
        }
    }
}

fn default_database_path() -> String {
    "./press_ingest.db".to_string()
}

fn default_user_agent() -> String {
    format!("press-ingest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_concurrent_rows() -> usize {
    1
}

fn default_checkpoint_dir() -> String {
    "./checkpoints".to_string()
}
