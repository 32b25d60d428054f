//! Pipeline configuration.
//!
//! Usually built in code, but can also be read from TOML:
//!
//! ```toml
//! extension = "proto"
//! include_paths = ["third_party/protos"]
//! nesting = "nested"        # or "flatten"
//! batch_mode = "fail_fast"  # or "best_effort"
//! max_errors = 10
//! ```

use crate::error::DescError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where closed nested definitions are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingMode {
    /// Into the innermost enclosing message.
    #[default]
    Nested,
    /// Always at file level, regardless of where they were declared.
    Flatten,
}

/// How the batch driver treats a failing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Return the first error; no partial aggregate.
    #[default]
    FailFast,
    /// Skip failing files and report their errors beside the aggregate.
    BestEffort,
}

/// Default maximum number of errors collected in best-effort mode before aborting.
pub const DEFAULT_MAX_ERRORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// File extension (without the dot) that marks schema files in a directory scan.
    pub extension: String,
    /// Directories searched for imports after the root's own directory.
    pub include_paths: Vec<PathBuf>,
    pub nesting: NestingMode,
    pub batch_mode: BatchMode,
    pub max_errors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            extension: "proto".to_owned(),
            include_paths: Vec::new(),
            nesting: NestingMode::Nested,
            batch_mode: BatchMode::FailFast,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Config, DescError> {
        let config: Config = toml::from_str(s).map_err(|e| DescError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file from `path`.
    pub fn load(path: &Path) -> Result<Config, DescError> {
        let content = std::fs::read_to_string(path).map_err(|e| DescError::Config {
            message: format!("could not read '{}': {}", path.display(), e),
        })?;
        Config::from_toml_str(&content)
    }

    /// Check the settings that deserialization alone cannot. Called by
    /// [`Config::from_toml_str`] and by the batch driver for code-built configs.
    pub fn validate(&self) -> Result<(), DescError> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(DescError::Config {
                message: format!(
                    "extension must be non-empty and given without a leading dot, got '{}'",
                    self.extension
                ),
            });
        }
        if self.max_errors == 0 {
            return Err(DescError::Config {
                message: "max_errors must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_include_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_paths.push(dir.into());
        self
    }

    pub fn with_nesting(mut self, nesting: NestingMode) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn with_batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    /// True if `path` carries the configured extension.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension().is_some_and(|e| e == self.extension.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.extension, "proto");
        assert_eq!(c.nesting, NestingMode::Nested);
        assert_eq!(c.batch_mode, BatchMode::FailFast);
        assert!(c.matches_extension(Path::new("a/b.proto")));
        assert!(!c.matches_extension(Path::new("a/b.protobuf")));
        assert!(!c.matches_extension(Path::new("proto")));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = Config::from_toml_str(
            r#"
nesting = "flatten"
include_paths = ["vendor", "third_party"]
"#,
        )
        .unwrap();
        assert_eq!(c.nesting, NestingMode::Flatten);
        assert_eq!(
            c.include_paths,
            vec![PathBuf::from("vendor"), PathBuf::from("third_party")]
        );
        assert_eq!(c.extension, "proto");
        assert_eq!(c.max_errors, DEFAULT_MAX_ERRORS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("extention = \"proto\"").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn extension_with_dot_is_rejected() {
        let err = Config::from_toml_str("extension = \".proto\"").unwrap_err();
        assert!(err.to_string().contains("leading dot"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protodesc.toml");
        std::fs::write(&path, "batch_mode = \"best_effort\"\nmax_errors = 3\n").unwrap();
        let c = Config::load(&path).unwrap();
        assert_eq!(c.batch_mode, BatchMode::BestEffort);
        assert_eq!(c.max_errors, 3);
    }

    #[test]
    fn builder_setters() {
        let c = Config::default()
            .with_extension("idl")
            .with_include_path("inc")
            .with_nesting(NestingMode::Flatten)
            .with_batch_mode(BatchMode::BestEffort);
        assert!(c.matches_extension(Path::new("x.idl")));
        assert_eq!(c.include_paths, vec![PathBuf::from("inc")]);
        assert_eq!(c.nesting, NestingMode::Flatten);
        assert_eq!(c.batch_mode, BatchMode::BestEffort);
    }
}
