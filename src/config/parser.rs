use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `database.path`
pub const DATABASE_ENV: &str = "PRESS_INGEST_DB";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Builds the configuration used when no file is given
///
/// Defaults plus environment overrides, validated.
pub fn default_config() -> Result<Config, ConfigError> {
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Applies environment variable overrides to a configuration
pub fn apply_env_overrides(config: &mut Config) {
    override_from(config, |key| std::env::var(key).ok());
}

fn override_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup(DATABASE_ENV).filter(|p| !p.trim().is_empty()) {
        tracing::debug!("Database path overridden by {}", DATABASE_ENV);
        config.database.path = path.trim().to_string();
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so ingestion runs can be tied to the configuration
/// they used.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[database]
path = "./test.db"

[fetcher]
user-agent = "TestIngest/1.0"
request-timeout-secs = 5
connect-timeout-secs = 2
max-redirects = 3

[bulk]
max-concurrent-rows = 4

[checkpoints]
dir = "./snapshots"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetcher.user_agent, "TestIngest/1.0");
        assert_eq!(config.fetcher.request_timeout_secs, 5);
        assert_eq!(config.fetcher.max_redirects, 3);
        assert_eq!(config.bulk.max_concurrent_rows, 4);
        assert_eq!(config.checkpoints.dir, "./snapshots");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file = create_temp_config("[fetcher]\nuser-agent = \"Only/1\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetcher.user_agent, "Only/1");
        assert_eq!(config.fetcher.request_timeout_secs, 30);
        assert_eq!(config.bulk.max_concurrent_rows, 1);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/press_ingest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[bulk]\nmax-concurrent-rows = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_env_override_replaces_database_path() {
        let mut config = Config::default();
        override_from(&mut config, |key| {
            (key == DATABASE_ENV).then(|| " /data/press.db ".to_string())
        });
        assert_eq!(config.database.path, "/data/press.db");
    }

    #[test]
    fn test_blank_env_override_ignored() {
        let mut config = Config::default();
        override_from(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config.database.path, "./press_ingest.db");
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("[bulk]\nmax-concurrent-rows = 2\n");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }
}
