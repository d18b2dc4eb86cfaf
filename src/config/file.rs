//! Configuration file loading
//!
//! Handles loading configuration from JSON files and locating the file
//! when no path was given.

use crate::config::Config;
use crate::error::ConfigError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name looked up in every search location
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load and validate configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::ParseError(format!("{}: {}", path.display(), e)),
        })?;

        Config::from_json(&content)
    }

    /// Pick the file to load
    ///
    /// An explicit path is used as given. Otherwise the first existing
    /// default location wins, falling back to `config.json` so the
    /// not-found error names the conventional file.
    pub fn resolve(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        Self::default_paths()
            .into_iter()
            .find(|p| p.is_file())
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Get default configuration file paths, highest priority first
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

        // User config
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("trapmon").join(CONFIG_FILE_NAME));
        }

        // System-wide config
        paths.push(PathBuf::from("/etc/trapmon").join(CONFIG_FILE_NAME));

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_paths_order() {
        let paths = ConfigFile::default_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("config.json")));
        assert_eq!(
            paths.last(),
            Some(&PathBuf::from("/etc/trapmon/config.json"))
        );
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/srv/custom.json");
        assert_eq!(ConfigFile::resolve(Some(path)), PathBuf::from("/srv/custom.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"config\": ").unwrap();

        let result = ConfigFile::load(file.path());
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"config": {{"interval": 5, "snmp": {{"community": "public", "targets": ["localhost"], "port": 9162}}}},
               "metrics": []}}"#
        )
        .unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.trap_port(), 9162);
        assert_eq!(config.to_targets()[0].host, "localhost");
    }
}
