//! Heuristic structure recovery for source and test files.
//!
//! This module provides:
//! - `StructureParser`: recovers functions, methods, getters and setters
//!   from a source file, together with the class/mixin scopes that own them
//! - `TestDeclarationParser`: recovers declared test cases from a test file
//!   and guesses which unit each one exercises
//! - `ParserConfig`: the compiled patterns and name sets both parsers share
//!
//! Neither parser is a real grammar. They match declaration shapes line by
//! line and use brace counting to decide nesting, so unusual syntax can be
//! misclassified.

mod config;
mod declarations;
mod exclusion;
mod scan;
mod structure;

pub use config::ParserConfig;
pub use declarations::TestDeclarationParser;
pub use exclusion::has_exclusion_marker;
pub use scan::{block_end, is_open_at, scan_braces, BraceScan, LineIndex};
pub use structure::{SourceStructure, StructureParser};

use serde::{Deserialize, Serialize};

/// Kind of code unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Function,
    Method,
    Getter,
    Setter,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Function => write!(f, "function"),
            UnitKind::Method => write!(f, "method"),
            UnitKind::Getter => write!(f, "getter"),
            UnitKind::Setter => write!(f, "setter"),
        }
    }
}

/// A declared function, method, getter or setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// The declared name (e.g., "add", "total")
    pub name: String,
    pub kind: UnitKind,
    /// The class or mixin the unit is declared in, if any
    pub enclosing_type: Option<String>,
    /// Line number (1-indexed)
    pub declared_at_line: usize,
    /// The declaration line, trimmed and truncated
    pub signature: String,
    /// Whether a "no test" marker exempts this unit from coverage
    pub excluded: bool,
}

impl CodeUnit {
    /// Identity within one source file. Not guaranteed unique.
    pub fn key(&self) -> (Option<&str>, &str, UnitKind) {
        (self.enclosing_type.as_deref(), self.name.as_str(), self.kind)
    }

    /// `Type.name` for members, `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.enclosing_type {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

/// Kind of type scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Class,
    Mixin,
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeKind::Class => write!(f, "class"),
            ScopeKind::Mixin => write!(f, "mixin"),
        }
    }
}

/// Byte span of a class or mixin, from its header to its closing brace.
///
/// When the closing brace is missing the scope runs to the end of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeScope {
    pub name: String,
    pub kind: ScopeKind,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl TypeScope {
    /// Whether `offset` falls inside the span, both ends inclusive.
    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset <= self.end_offset
    }
}

/// A declared test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub description: String,
    /// Line number (1-indexed)
    pub declared_at_line: usize,
    /// Best guess at the unit name this test exercises
    pub inferred_target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let unit = CodeUnit {
            name: "add".to_string(),
            kind: UnitKind::Method,
            enclosing_type: Some("Calculator".to_string()),
            declared_at_line: 3,
            signature: "int add(int a) {".to_string(),
            excluded: false,
        };
        assert_eq!(unit.qualified_name(), "Calculator.add");
        assert_eq!(unit.key(), (Some("Calculator"), "add", UnitKind::Method));
    }

    #[test]
    fn test_scope_contains_is_inclusive() {
        let scope = TypeScope {
            name: "A".to_string(),
            kind: ScopeKind::Class,
            start_offset: 10,
            end_offset: 20,
        };
        assert!(scope.contains(10));
        assert!(scope.contains(20));
        assert!(!scope.contains(21));
        assert!(!scope.contains(9));
    }

    #[test]
    fn test_unit_kind_serializes_lowercase() {
        let json = serde_json::to_string(&UnitKind::Getter).unwrap();
        assert_eq!(json, "\"getter\"");
    }
}
