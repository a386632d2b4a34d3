//! Project configuration for covtrack.
//!
//! A project config describes where sources and tests live, how test files
//! are named, and how the external test harness is invoked. Every field is
//! optional; an absent config file means "use the defaults".

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Config file names searched for in the project root.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["covtrack.yaml", ".covtrack.yaml"];

pub const DEFAULT_SOURCE_DIR: &str = "lib";
pub const DEFAULT_TEST_DIR: &str = "test";
pub const DEFAULT_SOURCE_EXTENSION: &str = "dart";
pub const DEFAULT_TEST_SUFFIX: &str = "test";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Top-level project configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProjectConfig {
    /// Directory holding source files, relative to the project root
    #[serde(default)]
    pub source_dir: Option<String>,
    /// Directory holding test files, relative to the project root
    #[serde(default)]
    pub test_dir: Option<String>,
    /// Extension shared by source and test files (without the dot)
    #[serde(default)]
    pub source_extension: Option<String>,
    /// Suffix appended to a source stem to name its test file
    #[serde(default)]
    pub test_suffix: Option<String>,
    /// Harness command, program first (default: `dart test`)
    #[serde(default)]
    pub test_command: Option<Vec<String>>,
    /// Arguments appended after the subject file
    #[serde(default)]
    pub reporter_args: Option<Vec<String>>,
    /// Wall-clock limit for one harness invocation
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Glob patterns for source file names to leave out (e.g. "*.g.dart")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub parser: Option<ParserSettings>,
}

impl ProjectConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look for a config file in the project root.
    pub fn discover(project_root: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(|p| p.is_file())
    }

    /// Load the config for a project: explicit path, then discovery, then defaults.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None => match Self::discover(project_root) {
                Some(path) => Self::parse_file(path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn source_dir(&self) -> &str {
        self.source_dir.as_deref().unwrap_or(DEFAULT_SOURCE_DIR)
    }

    pub fn test_dir(&self) -> &str {
        self.test_dir.as_deref().unwrap_or(DEFAULT_TEST_DIR)
    }

    pub fn source_extension(&self) -> &str {
        self.source_extension
            .as_deref()
            .unwrap_or(DEFAULT_SOURCE_EXTENSION)
    }

    pub fn test_suffix(&self) -> &str {
        self.test_suffix.as_deref().unwrap_or(DEFAULT_TEST_SUFFIX)
    }

    /// Returns the harness command (defaults to `dart test`).
    pub fn test_command(&self) -> Vec<String> {
        self.test_command
            .clone()
            .unwrap_or_else(|| vec!["dart".to_string(), "test".to_string()])
    }

    /// Returns the reporter arguments (defaults to `--reporter expanded`).
    pub fn reporter_args(&self) -> Vec<String> {
        self.reporter_args
            .clone()
            .unwrap_or_else(|| vec!["--reporter".to_string(), "expanded".to_string()])
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Parser overrides, or the defaults.
    pub fn parser_settings(&self) -> ParserSettings {
        self.parser.clone().unwrap_or_default()
    }

    /// Name of the test file expected for `source_name`.
    ///
    /// `math_utils.dart` becomes `math_utils_test.dart`.
    pub fn expected_test_name(&self, source_name: &str) -> String {
        let ext = self.source_extension();
        let dotted = format!(".{}", ext);
        let stem = source_name.strip_suffix(&dotted).unwrap_or(source_name);
        format!("{}_{}.{}", stem, self.test_suffix(), ext)
    }

    /// Whether a file name follows the test naming convention.
    pub fn is_test_file_name(&self, name: &str) -> bool {
        name.ends_with(&format!("_{}.{}", self.test_suffix(), self.source_extension()))
    }

    /// Compile `excluded_paths` into a matcher.
    pub fn excluded_matcher(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::Glob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Check the config for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let command = self.test_command();
        if command.is_empty() || command[0].trim().is_empty() {
            return Err(ConfigError::Invalid("test_command must not be empty".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        for (field, value) in [
            ("source_dir", self.source_dir()),
            ("test_dir", self.test_dir()),
            ("source_extension", self.source_extension()),
            ("test_suffix", self.test_suffix()),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }
        self.excluded_matcher()?;
        Ok(())
    }
}

/// Overrides for the parser name sets. Unset lists keep their defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ParserSettings {
    /// Words never used as an inferred test target
    #[serde(default)]
    pub stopwords: Option<Vec<String>>,
    /// Entry-point names that are never units (e.g. "main")
    #[serde(default)]
    pub entry_points: Option<Vec<String>>,
    /// Method names every type overrides (e.g. "toString")
    #[serde(default)]
    pub universal_overrides: Option<Vec<String>>,
    /// Call names that open a test declaration (e.g. "test")
    #[serde(default)]
    pub test_markers: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.source_dir(), "lib");
        assert_eq!(config.test_dir(), "test");
        assert_eq!(config.test_command(), vec!["dart", "test"]);
        assert_eq!(config.reporter_args(), vec!["--reporter", "expanded"]);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expected_test_name() {
        let config = ProjectConfig::default();
        assert_eq!(
            config.expected_test_name("math_utils.dart"),
            "math_utils_test.dart"
        );
        assert!(config.is_test_file_name("math_utils_test.dart"));
        assert!(!config.is_test_file_name("math_utils.dart"));
    }

    #[test]
    fn test_expected_test_name_custom_suffix() {
        let config = ProjectConfig {
            source_extension: Some("src".to_string()),
            test_suffix: Some("spec".to_string()),
            ..Default::default()
        };
        assert_eq!(config.expected_test_name("Foo.src"), "Foo_spec.src");
    }

    #[test]
    fn test_parse_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("covtrack.yaml");
        std::fs::write(
            &path,
            r#"
source_dir: src
test_command: ["flutter", "test"]
timeout_secs: 120
excluded_paths:
  - "*.g.dart"
parser:
  stopwords: ["should", "works"]
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(temp.path(), None).unwrap();
        assert_eq!(config.source_dir(), "src");
        assert_eq!(config.test_dir(), "test");
        assert_eq!(config.test_command(), vec!["flutter", "test"]);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(config.excluded_matcher().unwrap().is_match("model.g.dart"));
        assert_eq!(
            config.parser_settings().stopwords,
            Some(vec!["should".to_string(), "works".to_string()])
        );
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let config = ProjectConfig {
            test_command: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ProjectConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let config = ProjectConfig {
            excluded_paths: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Glob { .. })));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::load(temp.path(), None).unwrap();
        assert_eq!(config.source_extension(), "dart");
    }
}
