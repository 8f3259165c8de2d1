//! Analyzer configuration
//!
//! A small JSON configuration surface: which paths to collect, which to
//! exclude, and whether to seed the registry with platform classes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::logging;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for an analysis run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Paths (files or directories) to analyze
    pub paths: Vec<PathBuf>,
    /// Path prefixes or glob patterns to skip during discovery
    pub exclude_paths: Vec<PathBuf>,
    /// File extension to collect
    pub extension: String,
    /// Seed the registry with well-known platform classes
    pub seed_builtins: bool,
    /// Optional log file for collect/analysis tracing
    pub log_file: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            exclude_paths: Vec::new(),
            extension: "php".to_string(),
            seed_builtins: true,
            log_file: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Check if a path should be excluded from discovery
    ///
    /// An exclude entry matches as a path prefix, or as a glob pattern when
    /// it contains a wildcard.
    pub fn is_excluded(&self, path: &Path) -> bool {
        for exclude in &self.exclude_paths {
            if path.starts_with(exclude) {
                logging::log_excluded(path, &exclude.to_string_lossy());
                return true;
            }
            let exclude_str = exclude.to_string_lossy();
            if exclude_str.contains('*') {
                if let Ok(pattern) = glob::Pattern::new(&exclude_str) {
                    if pattern.matches_path(path) {
                        logging::log_excluded(path, &exclude_str);
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Check if a file carries the configured extension
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e == self.extension.as_str())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.extension, "php");
        assert!(config.seed_builtins);
        assert!(config.paths.is_empty());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "paths": ["src", "lib"],
            "exclude_paths": ["src/generated", "**/vendor/**"],
            "seed_builtins": false
        }"#;
        let config: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.paths.len(), 2);
        assert!(!config.seed_builtins);
        assert_eq!(config.extension, "php");
    }

    #[test]
    fn test_exclusion_by_prefix_and_glob() {
        let config = AnalyzerConfig {
            exclude_paths: vec![PathBuf::from("src/generated"), PathBuf::from("**/vendor/**")],
            ..AnalyzerConfig::default()
        };

        assert!(config.is_excluded(Path::new("src/generated/model.php")));
        assert!(config.is_excluded(Path::new("project/vendor/pkg/file.php")));
        assert!(!config.is_excluded(Path::new("src/app/model.php")));
    }

    #[test]
    fn test_extension_matching() {
        let config = AnalyzerConfig::default();
        assert!(config.matches_extension(Path::new("a.php")));
        assert!(!config.matches_extension(Path::new("a.phtml")));
        assert!(!config.matches_extension(Path::new("php")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phpsema.json");
        fs::write(&path, r#"{"paths": ["src"]}"#).unwrap();

        let config = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(config.paths, vec![PathBuf::from("src")]);
    }
}
