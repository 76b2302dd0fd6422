//! Configuration loader for folio.
//!
//! Reads `config.toml` from the data directory (`~/.folio/` in production)
//! and deserializes it into [`FolioConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use folio_types::config::FolioConfig;

/// Load configuration from `{data_dir}/config.toml`.
pub async fn load_config(data_dir: &Path) -> FolioConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return FolioConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return FolioConfig::default();
        }
    };

    match toml::from_str::<FolioConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            FolioConfig::default()
        }
    }
}
