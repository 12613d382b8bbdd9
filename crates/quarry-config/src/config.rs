use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
    path::{resolve_path, xdg_config_home, xdg_data_home},
};

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Configuration of the quarry command line.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Path of the SQLite database file.
    /// Default: $XDG_DATA_HOME/quarry/quarry.db
    pub db_path: Option<String>,

    /// Rows per page when paginating a select.
    /// Default: 15
    pub per_page: Option<u32>,

    /// Include last page, item range and navigation flags in paginated output.
    /// Default: true
    pub include_page_meta: Option<bool>,

    /// Allow UPDATE and DELETE without a where clause, as if --all was passed.
    /// Default: false
    pub allow_unfiltered_mutations: Option<bool>,

    /// Milliseconds to wait on a locked database before giving up.
    /// Default: 5000
    pub busy_timeout_ms: Option<u64>,
}

/// Location of the configuration file: `$QUARRY_CONFIG`, or
/// `$XDG_CONFIG_HOME/quarry/config.toml`.
pub fn config_path() -> PathBuf {
    match std::env::var("QUARRY_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("quarry").join("config.toml"),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            db_path: Some(format!("{}/quarry/quarry.db", xdg_data_home().display())),
            per_page: Some(DEFAULT_PER_PAGE),
            include_page_meta: Some(true),
            allow_unfiltered_mutations: Some(false),
            busy_timeout_ms: Some(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Loads the configuration from `path`.
    /// A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    /// Validates the values and fills in defaults for unset keys.
    pub fn resolve(&mut self) -> Result<()> {
        if let Some(0) = self.per_page {
            return Err(ConfigError::InvalidPerPage(0));
        }

        self.per_page.get_or_insert(DEFAULT_PER_PAGE);
        self.include_page_meta.get_or_insert(true);
        self.allow_unfiltered_mutations.get_or_insert(false);
        self.busy_timeout_ms.get_or_insert(DEFAULT_BUSY_TIMEOUT_MS);

        Ok(())
    }

    /// Database path: `$QUARRY_DB` if set, then `db_path`, then the default
    /// location under the XDG data directory.
    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("QUARRY_DB") {
            return resolve_path(&env_path);
        }
        if let Some(db_path) = &self.db_path {
            return resolve_path(db_path);
        }
        Ok(xdg_data_home().join("quarry").join("quarry.db"))
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }

    pub fn include_page_meta(&self) -> bool {
        self.include_page_meta.unwrap_or(true)
    }

    pub fn allow_unfiltered_mutations(&self) -> bool {
        self.allow_unfiltered_mutations.unwrap_or(false)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS))
    }

    /// Writes the configuration to `path`, annotated with field docs.
    pub fn save(&self, path: &Path) -> Result<()> {
        let annotated_doc = self.to_annotated_document()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, annotated_doc.to_string())?;
        debug!("configuration saved to {}", path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;
        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;
        Ok(doc)
    }
}

/// Writes the default configuration, annotated with field docs, to `path`.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.display().to_string()));
    }

    Config::default_config().save(path)?;
    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    #[serial]
    fn test_default_config_values() {
        let config = Config::default_config();
        assert_eq!(config.per_page(), 15);
        assert!(config.include_page_meta());
        assert!(!config.allow_unfiltered_mutations());
        assert_eq!(config.busy_timeout(), Duration::from_millis(5000));
        assert!(config.db_path.unwrap().ends_with("quarry/quarry.db"));
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.per_page, Some(15));
    }

    #[test]
    fn test_partial_file_is_resolved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "per_page = 50\nallow_unfiltered_mutations = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.per_page(), 50);
        assert!(config.allow_unfiltered_mutations());
        assert_eq!(config.busy_timeout_ms, Some(5000));
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_zero_per_page_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "per_page = 0\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidPerPage(0))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "per_page = \"many\"\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_db_path_env_override() {
        let config = Config {
            db_path: Some("/srv/app.db".into()),
            ..Config::default_config()
        };

        with_env(vec![("QUARRY_DB", "/tmp/override.db")], || {
            assert_eq!(
                config.get_db_path().unwrap(),
                PathBuf::from("/tmp/override.db")
            );
        });

        with_env(vec![("QUARRY_DB", "")], || {
            assert_eq!(config.get_db_path().unwrap(), PathBuf::from("/srv/app.db"));
        });
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        with_env(vec![("QUARRY_CONFIG", "/etc/quarry.toml")], || {
            assert_eq!(config_path(), PathBuf::from("/etc/quarry.toml"));
        });

        with_env(
            vec![("QUARRY_CONFIG", ""), ("XDG_CONFIG_HOME", "/cfg")],
            || {
                assert_eq!(config_path(), PathBuf::from("/cfg/quarry/config.toml"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_generate_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        generate_default_config(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Milliseconds to wait"));

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default_config());

        assert!(matches!(
            generate_default_config(&path),
            Err(ConfigError::ConfigAlreadyExists(_))
        ));
    }

    #[test]
    #[serial]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            per_page: Some(30),
            ..Config::default_config()
        };

        config.save(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("per_page = 30"));
        assert!(content.contains("# Milliseconds to wait"));
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
