//! Test skeleton generation.
//!
//! A skeleton has one commented-out test stub per testable unit, grouped by
//! the class or mixin that declares it, followed by integration and edge
//! case sections and a list of the units marked "no test". Because every
//! declaration is commented out, a fresh skeleton parses to zero test cases
//! and adds no coverage until its stubs are filled in.

use globset::GlobSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyze::{discover_sources, discover_tests};
use crate::config::ProjectConfig;
use crate::error::{ConfigError, ScaffoldError};
use crate::parser::{CodeUnit, ParserConfig, StructureParser};

/// Group name for units outside any class or mixin.
pub const FREE_FUNCTIONS_GROUP: &str = "Functions";

/// Decides whether an existing test file may be replaced.
pub trait ConfirmOverwrite {
    fn confirm(&mut self, path: &Path) -> bool;
}

/// Overwrites without asking.
pub struct AlwaysOverwrite;

impl ConfirmOverwrite for AlwaysOverwrite {
    fn confirm(&mut self, _path: &Path) -> bool {
        true
    }
}

/// Never overwrites.
pub struct NeverOverwrite;

impl ConfirmOverwrite for NeverOverwrite {
    fn confirm(&mut self, _path: &Path) -> bool {
        false
    }
}

/// What happened to one skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    Created(PathBuf),
    /// The test file existed and overwriting was declined
    Skipped(PathBuf),
}

/// Describe what a unit's stub should check, from its name.
///
/// `fetchUser` becomes "fetchUser should return correct value".
pub fn describe_stub(name: &str) -> String {
    let words = split_camel_case(name);
    let has = |needles: &[&str]| contains_any(&words, needles);

    let expectation = if has(&["example"][..]) {
        "should demonstrate functionality correctly"
    } else if has(&["get", "fetch"][..]) {
        "should return correct value"
    } else if has(&["set", "update"][..]) {
        "should update value correctly"
    } else if has(&["create", "build"][..]) {
        "should create object correctly"
    } else if has(&["validate", "check"][..]) {
        "should validate input correctly"
    } else {
        "should work correctly"
    };
    format!("{} {}", name, expectation)
}

fn contains_any(words: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| words.contains(n))
}

/// `calculateTotal` -> `calculate total`.
fn split_camel_case(name: &str) -> String {
    let mut words = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() && !words.is_empty() {
            words.push(' ');
        }
        words.extend(c.to_lowercase());
    }
    words
}

/// Render a skeleton test file for `source_file`.
///
/// `units` should be the file's units in declaration order.
pub fn render_skeleton(source_file: &str, source_dir: &str, units: &[CodeUnit]) -> String {
    let mut out = vec![
        "import 'package:test/test.dart';".to_string(),
        format!("import '../{}/{}';", source_dir, source_file),
        String::new(),
        format!("// Test skeleton for {}.", source_file),
        "// Uncomment each stub and fill in its body.".to_string(),
        String::new(),
        "void main() {".to_string(),
    ];

    let testable: Vec<&CodeUnit> = units.iter().filter(|u| !u.excluded).collect();
    for (group, members) in group_by_owner(&testable) {
        out.push(format!("  group('{}', () {{", group));
        for unit in members {
            out.push(format!("    // test('{}', () {{", describe_stub(&unit.name)));
            out.push(format!("    //   // Call {} and check the result.", unit.qualified_name()));
            out.push("    // });".to_string());
        }
        out.push("  });".to_string());
        out.push(String::new());
    }

    out.extend(
        [
            "  group('Integration Tests', () {",
            "    // test('all functions should work together', () {",
            "    //   // Combine several functions and check the overall result.",
            "    // });",
            "  });",
            "",
            "  group('Edge Cases', () {",
            "    // test('functions should handle edge cases gracefully', () {",
            "    //   // Empty inputs, null values, very large numbers, special characters.",
            "    // });",
            "  });",
        ]
        .map(String::from),
    );

    let excluded: Vec<&CodeUnit> = units.iter().filter(|u| u.excluded).collect();
    if !excluded.is_empty() {
        out.push(String::new());
        out.push("  // Marked \"no test\" and left out of coverage:".to_string());
        for unit in excluded {
            out.push(format!(
                "  //   {} ({}, line {})",
                unit.qualified_name(),
                unit.kind,
                unit.declared_at_line
            ));
        }
    }

    out.push("}".to_string());
    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Group units by enclosing type, in order of first appearance.
fn group_by_owner<'u>(units: &[&'u CodeUnit]) -> Vec<(String, Vec<&'u CodeUnit>)> {
    let mut groups: Vec<(String, Vec<&CodeUnit>)> = Vec::new();
    for &unit in units {
        let owner = unit
            .enclosing_type
            .clone()
            .unwrap_or_else(|| FREE_FUNCTIONS_GROUP.to_string());
        match groups.iter_mut().find(|(name, _)| *name == owner) {
            Some((_, members)) => members.push(unit),
            None => groups.push((owner, vec![unit])),
        }
    }
    groups
}

/// Writes skeleton test files for a project.
pub struct Scaffolder {
    root: PathBuf,
    config: ProjectConfig,
    parser_config: ParserConfig,
    excluded: GlobSet,
}

impl Scaffolder {
    pub fn new<P: AsRef<Path>>(root: P, config: ProjectConfig) -> Result<Self, ConfigError> {
        let parser_config = ParserConfig::new(&config.parser_settings())?;
        let excluded = config.excluded_matcher()?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            config,
            parser_config,
            excluded,
        })
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(self.config.source_dir())
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root.join(self.config.test_dir())
    }

    /// Source files without their conventional test file, in discovery order.
    pub fn pending_sources(&self) -> Result<Vec<String>, ScaffoldError> {
        let source_dir = self.source_dir();
        if !source_dir.is_dir() {
            return Err(ScaffoldError::SourceNotFound(source_dir));
        }
        let sources = discover_sources(&self.root, &self.config, &self.excluded);
        let tests: Vec<String> = discover_tests(&self.root, &self.config)
            .files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();

        Ok(sources
            .files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|name| !tests.contains(&self.config.expected_test_name(name)))
            .collect())
    }

    /// Write the skeleton for one source file, named relative to the source directory.
    pub fn scaffold_file(
        &self,
        source_name: &str,
        confirm: &mut dyn ConfirmOverwrite,
    ) -> Result<ScaffoldOutcome, ScaffoldError> {
        let source_path = self.source_dir().join(source_name);
        if !source_path.is_file() {
            return Err(ScaffoldError::SourceNotFound(source_path));
        }

        let target = self.test_dir().join(self.config.expected_test_name(source_name));
        if target.exists() && !confirm.confirm(&target) {
            info!(file = %target.display(), "skipped existing test file");
            return Ok(ScaffoldOutcome::Skipped(target));
        }

        let structure = StructureParser::new(&self.parser_config)
            .parse_file(&source_path)
            .map_err(|source| ScaffoldError::Read {
                path: source_path.clone(),
                source,
            })?;
        debug!(file = %source_name, units = structure.units.len(), "parsed source for skeleton");

        let test_dir = self.test_dir();
        fs::create_dir_all(&test_dir).map_err(|source| ScaffoldError::CreateDir {
            path: test_dir.clone(),
            source,
        })?;

        let content = render_skeleton(source_name, self.config.source_dir(), &structure.units);
        fs::write(&target, content).map_err(|source| ScaffoldError::Write {
            path: target.clone(),
            source,
        })?;
        info!(file = %target.display(), "created test skeleton");
        Ok(ScaffoldOutcome::Created(target))
    }

    /// Write skeletons for every source file that lacks a test file.
    ///
    /// One failure does not stop the rest; each file gets its own result.
    pub fn scaffold_missing(
        &self,
        confirm: &mut dyn ConfirmOverwrite,
    ) -> Result<Vec<(String, Result<ScaffoldOutcome, ScaffoldError>)>, ScaffoldError> {
        let mut results = Vec::new();
        for name in self.pending_sources()? {
            let result = self.scaffold_file(&name, confirm);
            results.push((name, result));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{TestDeclarationParser, UnitKind};
    use tempfile::TempDir;

    const CALCULATOR: &str = r#"class Calculator {
  int add(int a, int b) {
    return a + b;
  }

  int get lastResult => _last;

  void reset() { //no test
  }
}

String fetchGreeting(String name) {
  return 'Hello $name';
}
"#;

    fn unit(name: &str, owner: Option<&str>, excluded: bool) -> CodeUnit {
        CodeUnit {
            name: name.to_string(),
            kind: UnitKind::Function,
            enclosing_type: owner.map(str::to_string),
            declared_at_line: 1,
            signature: String::new(),
            excluded,
        }
    }

    #[test]
    fn test_describe_stub() {
        assert_eq!(describe_stub("runExample"), "runExample should demonstrate functionality correctly");
        assert_eq!(describe_stub("fetchUser"), "fetchUser should return correct value");
        assert_eq!(describe_stub("updateName"), "updateName should update value correctly");
        assert_eq!(describe_stub("buildWidget"), "buildWidget should create object correctly");
        assert_eq!(describe_stub("validateEmail"), "validateEmail should validate input correctly");
        assert_eq!(describe_stub("add"), "add should work correctly");
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("calculateTotal"), "calculate total");
        assert_eq!(split_camel_case("add"), "add");
    }

    #[test]
    fn test_skeleton_layout() {
        let units = vec![
            unit("add", Some("Calculator"), false),
            unit("helper", None, true),
            unit("greet", None, false),
        ];
        let text = render_skeleton("calc.dart", "lib", &units);
        assert!(text.starts_with("import 'package:test/test.dart';\nimport '../lib/calc.dart';\n"));
        assert!(text.contains("  group('Calculator', () {\n    // test('add should work correctly', () {"));
        assert!(text.contains("  group('Functions', () {\n    // test('greet should work correctly', () {"));
        assert!(text.contains("  //   helper (function, line 1)"));
        assert!(!text.contains("test('helper"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_skeleton_adds_no_test_cases() {
        let config = ParserConfig::default();
        let units = StructureParser::new(&config).parse_units(CALCULATOR);
        let text = render_skeleton("calculator.dart", "lib", &units);
        let cases = TestDeclarationParser::new(&config).parse(&text);
        assert!(cases.iter().all(|c| c.inferred_target.is_none()));
        assert!(cases.is_empty());
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("lib")).unwrap();
        fs::write(temp.path().join("lib").join("calculator.dart"), CALCULATOR).unwrap();
        fs::write(temp.path().join("lib").join("done.dart"), "void done() {\n}\n").unwrap();
        fs::create_dir(temp.path().join("test")).unwrap();
        fs::write(temp.path().join("test").join("done_test.dart"), "").unwrap();
        temp
    }

    #[test]
    fn test_scaffold_file_creates_skeleton() {
        let temp = project();
        let scaffolder = Scaffolder::new(temp.path(), ProjectConfig::default()).unwrap();
        let outcome = scaffolder
            .scaffold_file("calculator.dart", &mut NeverOverwrite)
            .unwrap();
        let target = temp.path().join("test").join("calculator_test.dart");
        assert_eq!(outcome, ScaffoldOutcome::Created(target.clone()));
        let written = fs::read_to_string(target).unwrap();
        assert!(written.contains("group('Calculator', () {"));
        assert!(written.contains("lastResult should work correctly"));
        assert!(written.contains("fetchGreeting should return correct value"));
        assert!(written.contains("//   Calculator.reset (method, line"));
    }

    #[test]
    fn test_existing_file_needs_confirmation() {
        let temp = project();
        let scaffolder = Scaffolder::new(temp.path(), ProjectConfig::default()).unwrap();
        let target = temp.path().join("test").join("done_test.dart");

        let outcome = scaffolder.scaffold_file("done.dart", &mut NeverOverwrite).unwrap();
        assert_eq!(outcome, ScaffoldOutcome::Skipped(target.clone()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "");

        let outcome = scaffolder.scaffold_file("done.dart", &mut AlwaysOverwrite).unwrap();
        assert_eq!(outcome, ScaffoldOutcome::Created(target.clone()));
        assert!(fs::read_to_string(&target).unwrap().contains("done should work correctly"));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp = project();
        let scaffolder = Scaffolder::new(temp.path(), ProjectConfig::default()).unwrap();
        let err = scaffolder
            .scaffold_file("nope.dart", &mut AlwaysOverwrite)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::SourceNotFound(_)));
    }

    #[test]
    fn test_scaffold_missing_creates_test_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("lib")).unwrap();
        fs::write(temp.path().join("lib").join("a.dart"), "void a() {\n}\n").unwrap();

        let scaffolder = Scaffolder::new(temp.path(), ProjectConfig::default()).unwrap();
        let results = scaffolder.scaffold_missing(&mut NeverOverwrite).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "a.dart");
        assert!(matches!(results[0].1, Ok(ScaffoldOutcome::Created(_))));
        assert!(temp.path().join("test").join("a_test.dart").is_file());
    }

    #[test]
    fn test_pending_sources() {
        let temp = project();
        let scaffolder = Scaffolder::new(temp.path(), ProjectConfig::default()).unwrap();
        assert_eq!(scaffolder.pending_sources().unwrap(), vec!["calculator.dart"]);
    }
}
