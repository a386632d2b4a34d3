//! File-level and function-level coverage computation.

use std::collections::{HashMap, HashSet};

use super::{FileCoverage, MissingTestFile, MissingUnitTest, SourceInventory, TestInventory, UnitCoverage};
use crate::config::ProjectConfig;

/// Pair every source file with its conventional test file.
///
/// A source file is covered iff a test file with exactly the expected name
/// was discovered.
pub fn file_coverage(source_files: &[String], test_files: &[String], config: &ProjectConfig) -> FileCoverage {
    let present: HashSet<&str> = test_files.iter().map(String::as_str).collect();
    let mut coverage = FileCoverage {
        source_files: source_files.to_vec(),
        test_files: test_files.to_vec(),
        ..Default::default()
    };

    for source in source_files {
        let expected = config.expected_test_name(source);
        if present.contains(expected.as_str()) {
            coverage.covered_files.push(source.clone());
        } else {
            coverage.missing_test_files.push(MissingTestFile {
                source_file: source.clone(),
                expected_test_file: expected,
            });
        }
    }

    coverage
}

/// Find the testable units no test case appears to target.
///
/// For a source with a test file, a non-excluded unit is missing when its
/// lowercase name is not among that file's inferred targets. A source
/// without a test file has all of its non-excluded units missing.
pub fn unit_coverage(sources: &[SourceInventory], tests: &[TestInventory], config: &ProjectConfig) -> UnitCoverage {
    let targets_by_file: HashMap<&str, HashSet<String>> = tests
        .iter()
        .map(|inventory| {
            let targets = inventory
                .cases
                .iter()
                .filter_map(|case| case.inferred_target.as_deref())
                .map(str::to_lowercase)
                .collect();
            (inventory.file.as_str(), targets)
        })
        .collect();

    let mut coverage = UnitCoverage::default();

    for source in sources {
        let expected = config.expected_test_name(&source.file);
        let targets = targets_by_file.get(expected.as_str());

        for unit in &source.units {
            coverage.total_units += 1;
            if unit.excluded {
                coverage.excluded_units += 1;
                continue;
            }
            let tested = targets.is_some_and(|t| t.contains(&unit.name.to_lowercase()));
            if !tested {
                coverage.missing_unit_tests.push(MissingUnitTest {
                    source_file: source.file.clone(),
                    unit: unit.clone(),
                });
            }
        }
    }

    coverage.testable_units = coverage.total_units - coverage.excluded_units;
    coverage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CodeUnit, TestCase, UnitKind};

    fn unit(name: &str, excluded: bool) -> CodeUnit {
        CodeUnit {
            name: name.to_string(),
            kind: UnitKind::Function,
            enclosing_type: None,
            declared_at_line: 1,
            signature: String::new(),
            excluded,
        }
    }

    fn case(target: Option<&str>) -> TestCase {
        TestCase {
            description: "desc".to_string(),
            declared_at_line: 1,
            inferred_target: target.map(str::to_string),
        }
    }

    #[test]
    fn test_file_coverage_partitions_sources() {
        let sources = vec!["a.dart".to_string(), "b.dart".to_string()];
        let tests = vec!["a_test.dart".to_string(), "other_test.dart".to_string()];
        let coverage = file_coverage(&sources, &tests, &ProjectConfig::default());
        assert_eq!(coverage.covered_files, vec!["a.dart"]);
        assert_eq!(coverage.missing_test_files.len(), 1);
        assert_eq!(coverage.missing_test_files[0].source_file, "b.dart");
        assert_eq!(coverage.missing_test_files[0].expected_test_file, "b_test.dart");
        assert_eq!(
            coverage.covered_files.len() + coverage.missing_test_files.len(),
            coverage.source_files.len()
        );
    }

    #[test]
    fn test_untested_source_contributes_all_testable_units() {
        let sources = vec![SourceInventory {
            file: "math_utils.dart".to_string(),
            units: vec![unit("add", false), unit("helper", true)],
        }];
        let coverage = unit_coverage(&sources, &[], &ProjectConfig::default());
        assert_eq!(coverage.total_units, 2);
        assert_eq!(coverage.excluded_units, 1);
        assert_eq!(coverage.testable_units, 1);
        assert_eq!(coverage.missing_unit_tests.len(), 1);
        assert_eq!(coverage.missing_unit_tests[0].unit.name, "add");
    }

    #[test]
    fn test_inferred_targets_match_case_insensitively() {
        let sources = vec![SourceInventory {
            file: "calc.dart".to_string(),
            units: vec![unit("calculateTotal", false), unit("reset", false)],
        }];
        let tests = vec![TestInventory {
            file: "calc_test.dart".to_string(),
            cases: vec![case(Some("calculatetotal")), case(None)],
        }];
        let coverage = unit_coverage(&sources, &tests, &ProjectConfig::default());
        let missing: Vec<_> = coverage
            .missing_unit_tests
            .iter()
            .map(|m| m.unit.name.as_str())
            .collect();
        assert_eq!(missing, vec!["reset"]);
    }

    #[test]
    fn test_targets_only_count_from_corresponding_file() {
        let sources = vec![SourceInventory {
            file: "a.dart".to_string(),
            units: vec![unit("shared", false)],
        }];
        let tests = vec![TestInventory {
            file: "b_test.dart".to_string(),
            cases: vec![case(Some("shared"))],
        }];
        let coverage = unit_coverage(&sources, &tests, &ProjectConfig::default());
        assert_eq!(coverage.missing_unit_tests.len(), 1);
    }

    #[test]
    fn test_excluded_units_never_missing() {
        let sources = vec![SourceInventory {
            file: "a.dart".to_string(),
            units: vec![unit("skipMe", true)],
        }];
        let tests = vec![TestInventory {
            file: "a_test.dart".to_string(),
            cases: vec![case(Some("other"))],
        }];
        let coverage = unit_coverage(&sources, &tests, &ProjectConfig::default());
        assert!(coverage.missing_unit_tests.is_empty());
        assert_eq!(coverage.testable_units, 0);
    }
}
