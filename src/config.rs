use crate::utils::get_data_dir;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Use `status verbose` for the plain `status` command
    #[serde(default)]
    pub verbose_status: bool,
    /// Enable the audit trail of privileged operations (opt-in)
    #[serde(default = "default_true")]
    pub enable_audit_log: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose_status: false,
            enable_audit_log: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Saves the app config to disk using an atomic write pattern.
/// 1. Writes to a temporary file.
/// 2. Sets restrictive permissions (0o600).
/// 3. Atomically renames to the target path.
///
/// # Security
///
/// On Unix systems, files are created with mode 0o600 (user read/write only).
pub async fn save_config(config: &AppConfig) -> std::io::Result<()> {
    if let Some(dir) = get_data_dir() {
        save_config_to(&dir, config).await?;
    }
    Ok(())
}

/// Saves the config into a specific directory. See [`save_config`].
pub async fn save_config_to(dir: &Path, config: &AppConfig) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;

    let temp_path = dir.join("config.json.tmp");
    let path = dir.join("config.json");

    // Create file with restrictive permissions from the start to prevent
    // race condition where file is briefly world-readable
    #[cfg(unix)]
    {
        use tokio::fs::OpenOptions;
        use tokio::io::AsyncWriteExt;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600) // Set permissions BEFORE any data is written
            .open(&temp_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?; // Ensure data is flushed to physical media
    }

    #[cfg(not(unix))]
    {
        use tokio::io::AsyncWriteExt;

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    // Atomic rename
    tokio::fs::rename(temp_path, path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::StorageFull {
            std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot save configuration. Free up space and try again.",
            )
        } else {
            e
        }
    })?;

    Ok(())
}

/// Loads the app config from disk, or returns default if not found.
pub async fn load_config() -> AppConfig {
    if let Some(dir) = get_data_dir()
        && let Some(config) = load_config_from(&dir).await
    {
        return config;
    }
    AppConfig::default()
}

/// Loads the config from a specific directory, or `None` if the file is
/// missing or unparseable.
pub async fn load_config_from(dir: &Path) -> Option<AppConfig> {
    let json = tokio::fs::read_to_string(dir.join("config.json")).await.ok()?;
    serde_json::from_str::<AppConfig>(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.verbose_status);
        assert!(config.enable_audit_log);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig {
            verbose_status: true,
            enable_audit_log: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.verbose_status);
        assert!(!parsed.enable_audit_log);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(!parsed.verbose_status);
        assert!(parsed.enable_audit_log);
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            verbose_status: true,
            enable_audit_log: false,
        };

        save_config_to(dir.path(), &config).await.unwrap();

        // The temporary file was renamed away
        assert!(!dir.path().join("config.json.tmp").exists());
        assert!(dir.path().join("config.json").exists());

        let loaded = load_config_from(dir.path()).await.unwrap();
        assert!(loaded.verbose_status);
        assert!(!loaded.enable_audit_log);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_config() {
        let dir = tempfile::tempdir().unwrap();

        save_config_to(dir.path(), &AppConfig::default()).await.unwrap();
        save_config_to(
            dir.path(),
            &AppConfig {
                verbose_status: true,
                enable_audit_log: true,
            },
        )
        .await
        .unwrap();

        let loaded = load_config_from(dir.path()).await.unwrap();
        assert!(loaded.verbose_status);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_config_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        save_config_to(dir.path(), &AppConfig::default()).await.unwrap();

        let mode = std::fs::metadata(dir.path().join("config.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_load_from_empty_dir_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(dir.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "not json").unwrap();
        assert!(load_config_from(dir.path()).await.is_none());
    }
}
