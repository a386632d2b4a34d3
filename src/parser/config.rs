//! Compiled patterns and name sets shared by the parsers.

use regex::Regex;
use std::collections::HashSet;

use crate::config::ParserSettings;
use crate::error::ConfigError;

/// Optional return type: `void`, `int?`, `Future<void>`, `Map<String, int>`.
const RETURN_TYPE: &str = r"\w+(?:<[\w<>?, ]*>)?\??";

/// Longest signature kept before truncating with "...".
pub const SIGNATURE_WIDTH: usize = 100;

const DEFAULT_STOPWORDS: &[&str] = &["can", "should", "test", "verify", "check"];
const DEFAULT_ENTRY_POINTS: &[&str] = &["main"];
const DEFAULT_UNIVERSAL_OVERRIDES: &[&str] = &["toString", "hashCode", "noSuchMethod"];
const DEFAULT_TEST_MARKERS: &[&str] = &["test"];

/// Words that open a control-flow block and look like a call with a body.
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "assert"];

/// Return-type tokens that mark a header as an accessor, handled separately.
const ACCESSOR_KEYWORDS: &[&str] = &["get", "set"];

/// Immutable parser configuration.
///
/// Built once per analysis and handed to every parser by reference.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub(crate) class_header: Regex,
    pub(crate) mixin_header: Regex,
    pub(crate) function_header: Regex,
    pub(crate) getter_header: Regex,
    pub(crate) setter_header: Regex,
    pub(crate) test_declaration: Regex,
    pub(crate) exclusion_marker: Regex,
    pub(crate) stopwords: HashSet<String>,
    pub(crate) entry_points: HashSet<String>,
    pub(crate) universal_overrides: HashSet<String>,
    pub(crate) control_keywords: HashSet<String>,
    pub(crate) accessor_keywords: HashSet<String>,
}

impl ParserConfig {
    /// Build a config, applying any overrides from `settings`.
    pub fn new(settings: &ParserSettings) -> Result<Self, ConfigError> {
        let markers = settings
            .test_markers
            .clone()
            .unwrap_or_else(|| to_strings(DEFAULT_TEST_MARKERS));
        if markers.is_empty() {
            return Err(ConfigError::Invalid("test_markers must not be empty".into()));
        }
        let marker_alternation = markers
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            class_header: compile(
                r"(?m)^[ \t]*(?:(?:abstract|sealed|base|final|interface|mixin)\s+)*class\s+(?P<name>\w+)",
            )?,
            mixin_header: compile(r"(?m)^[ \t]*(?:base\s+)?mixin\s+(?P<name>\w+)")?,
            function_header: compile(&format!(
                r"(?m)^[ \t]*(?:@\w+\s+)?(?:static\s+)?(?:@\w+\s+)?(?:(?P<ret>{rt})\s+)?(?P<name>\w+)\s*\([^)]*\)\s*(?:(?:async|sync)\*?\s*)?(?:=>\s*[^;]+;|\{{)",
                rt = RETURN_TYPE
            ))?,
            getter_header: compile(&format!(
                r"(?m)^[ \t]*(?:@\w+\s+)?(?:static\s+)?(?:{rt}\s+)?get\s+(?P<name>\w+)",
                rt = RETURN_TYPE
            ))?,
            setter_header: compile(
                r"(?m)^[ \t]*(?:@\w+\s+)?(?:static\s+)?(?:void\s+)?set\s+(?P<name>\w+)",
            )?,
            test_declaration: compile(&format!(
                r#"\b(?:{markers})\s*\(\s*(?:'(?P<single>[^']+)'|"(?P<double>[^"]+)")\s*,\s*\(\)\s*(?:async\s*)?\{{"#,
                markers = marker_alternation
            ))?,
            exclusion_marker: compile(r"(?i)//\s*no\s*test\b")?,
            stopwords: to_set(settings.stopwords.as_deref(), DEFAULT_STOPWORDS, true),
            entry_points: to_set(settings.entry_points.as_deref(), DEFAULT_ENTRY_POINTS, false),
            universal_overrides: to_set(
                settings.universal_overrides.as_deref(),
                DEFAULT_UNIVERSAL_OVERRIDES,
                false,
            ),
            control_keywords: to_set(None, CONTROL_KEYWORDS, false),
            accessor_keywords: to_set(None, ACCESSOR_KEYWORDS, false),
        })
    }

    /// Whether a standalone function name is never a testable unit.
    pub fn is_skipped_function_name(&self, name: &str) -> bool {
        self.entry_points.contains(name)
            || self.universal_overrides.contains(name)
            || self.control_keywords.contains(name)
            || name.chars().next().is_some_and(char::is_uppercase)
    }

    /// Whether a method name inside `owner` is never a testable unit.
    pub fn is_skipped_method_name(&self, name: &str, owner: &str) -> bool {
        name == owner
            || self.universal_overrides.contains(name)
            || self.control_keywords.contains(name)
    }

    /// Whether a getter or setter name is never a testable unit.
    pub fn is_skipped_accessor_name(&self, name: &str) -> bool {
        self.universal_overrides.contains(name)
    }

    /// Whether a header's return-type token marks it as an accessor.
    pub fn is_accessor_keyword(&self, token: &str) -> bool {
        self.accessor_keywords.contains(token)
    }

    /// Whether a lowercase description word is too generic to name a target.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(&ParserSettings::default()).expect("built-in parser patterns compile")
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn to_set(overrides: Option<&[String]>, defaults: &[&str], lowercase: bool) -> HashSet<String> {
    let values = match overrides {
        Some(values) => values.to_vec(),
        None => to_strings(defaults),
    };
    values
        .into_iter()
        .map(|v| if lowercase { v.to_lowercase() } else { v })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_compiles() {
        let config = ParserConfig::default();
        assert!(config.is_stopword("should"));
        assert!(!config.is_stopword("add"));
    }

    #[test]
    fn test_function_name_rules() {
        let config = ParserConfig::default();
        assert!(config.is_skipped_function_name("main"));
        assert!(config.is_skipped_function_name("toString"));
        assert!(config.is_skipped_function_name("Point"));
        assert!(config.is_skipped_function_name("if"));
        assert!(!config.is_skipped_function_name("add"));
        assert!(!config.is_skipped_function_name("_privateHelper"));
    }

    #[test]
    fn test_method_name_rules() {
        let config = ParserConfig::default();
        assert!(config.is_skipped_method_name("Calculator", "Calculator"));
        assert!(config.is_skipped_method_name("toString", "Calculator"));
        assert!(!config.is_skipped_method_name("add", "Calculator"));
        // Uppercase methods are kept; only the constructor name is dropped.
        assert!(!config.is_skipped_method_name("Other", "Calculator"));
    }

    #[test]
    fn test_override_stopwords_are_lowercased() {
        let settings = ParserSettings {
            stopwords: Some(vec!["Works".to_string()]),
            ..Default::default()
        };
        let config = ParserConfig::new(&settings).unwrap();
        assert!(config.is_stopword("works"));
        assert!(!config.is_stopword("should"));
    }

    #[test]
    fn test_empty_markers_rejected() {
        let settings = ParserSettings {
            test_markers: Some(vec![]),
            ..Default::default()
        };
        assert!(ParserConfig::new(&settings).is_err());
    }

    #[test]
    fn test_function_header_captures_return_type() {
        let config = ParserConfig::default();
        let caps = config
            .function_header
            .captures("Future<void> load(String path) async {")
            .unwrap();
        assert_eq!(&caps["ret"], "Future<void>");
        assert_eq!(&caps["name"], "load");
    }

    #[test]
    fn test_function_header_arrow_form() {
        let config = ParserConfig::default();
        let caps = config
            .function_header
            .captures("int square(int x) => x * x;")
            .unwrap();
        assert_eq!(&caps["name"], "square");
    }

    #[test]
    fn test_function_header_ignores_calls() {
        let config = ParserConfig::default();
        assert!(!config.function_header.is_match("  print('hello');"));
        assert!(!config.function_header.is_match("  items.forEach((x) {"));
    }
}
