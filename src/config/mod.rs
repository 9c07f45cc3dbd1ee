//! Configuration module for Press-Ingest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use press_ingest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("press_ingest.toml")).unwrap();
//! println!("Documents go to: {}", config.database.path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BulkConfig, CheckpointConfig, Config, DatabaseConfig, FetcherConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, default_config, load_config, load_config_with_hash,
    DATABASE_ENV,
};
pub use validation::{MAX_CONCURRENT_ROWS, MAX_REDIRECTS};
