//! Source and test file discovery.

use globset::GlobSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{AnalysisWarning, WarningKind};
use crate::config::ProjectConfig;

/// Files found in one directory, plus a warning if the directory was unusable.
#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub warning: Option<AnalysisWarning>,
}

/// Source files directly inside the source directory, minus excluded names.
pub fn discover_sources(root: &Path, config: &ProjectConfig, excluded: &GlobSet) -> Discovered {
    let suffix = format!(".{}", config.source_extension());
    list_dir(root, config.source_dir(), |name| {
        name.ends_with(&suffix) && !excluded.is_match(name)
    })
}

/// Test files directly inside the test directory.
pub fn discover_tests(root: &Path, config: &ProjectConfig) -> Discovered {
    list_dir(root, config.test_dir(), |name| config.is_test_file_name(name))
}

/// List regular files in `root/dir` whose names satisfy `accept`, sorted by name.
fn list_dir<F>(root: &Path, dir: &str, accept: F) -> Discovered
where
    F: Fn(&str) -> bool,
{
    let path = root.join(dir);
    if !path.is_dir() {
        warn!(dir = %path.display(), "directory not found");
        return Discovered {
            files: Vec::new(),
            warning: Some(AnalysisWarning {
                kind: WarningKind::InputNotFound,
                path: dir.to_string(),
                message: format!("{} directory not found", dir),
            }),
        };
    }

    let mut files = Vec::new();
    let mut warning = None;

    for entry in WalkDir::new(&path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %path.display(), error = %e, "skipping unreadable entry");
                if warning.is_none() {
                    warning = Some(AnalysisWarning {
                        kind: WarningKind::UnreadableFile,
                        path: dir.to_string(),
                        message: e.to_string(),
                    });
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if accept(&name) {
            files.push(entry.into_path());
        }
    }

    debug!(dir = %path.display(), count = files.len(), "discovered files");
    Discovered { files, warning }
}

/// File name of `path` as a string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|p| file_name(p)).collect()
    }

    #[test]
    fn test_discovers_sorted_sources() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("zeta.dart"), "").unwrap();
        fs::write(lib.join("alpha.dart"), "").unwrap();
        fs::write(lib.join("notes.txt"), "").unwrap();
        fs::create_dir(lib.join("src")).unwrap();
        fs::write(lib.join("src").join("nested.dart"), "").unwrap();

        let config = ProjectConfig::default();
        let found = discover_sources(temp.path(), &config, &GlobSet::empty());
        assert!(found.warning.is_none());
        assert_eq!(names(&found.files), vec!["alpha.dart", "zeta.dart"]);
    }

    #[test]
    fn test_test_named_sources_are_kept() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("fixture_test.dart"), "").unwrap();
        fs::write(lib.join("model.dart"), "").unwrap();

        let config = ProjectConfig::default();
        let found = discover_sources(temp.path(), &config, &GlobSet::empty());
        assert_eq!(names(&found.files), vec!["fixture_test.dart", "model.dart"]);
    }

    #[test]
    fn test_excluded_globs() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("model.dart"), "").unwrap();
        fs::write(lib.join("model.g.dart"), "").unwrap();

        let config = ProjectConfig {
            excluded_paths: vec!["*.g.dart".to_string()],
            ..Default::default()
        };
        let matcher = config.excluded_matcher().unwrap();
        let found = discover_sources(temp.path(), &config, &matcher);
        assert_eq!(names(&found.files), vec!["model.dart"]);
    }

    #[test]
    fn test_only_conventional_test_names() {
        let temp = TempDir::new().unwrap();
        let test = temp.path().join("test");
        fs::create_dir(&test).unwrap();
        fs::write(test.join("math_test.dart"), "").unwrap();
        fs::write(test.join("helpers.dart"), "").unwrap();

        let found = discover_tests(temp.path(), &ProjectConfig::default());
        assert_eq!(names(&found.files), vec!["math_test.dart"]);
    }

    #[test]
    fn test_missing_directory_warns() {
        let temp = TempDir::new().unwrap();
        let found = discover_tests(temp.path(), &ProjectConfig::default());
        assert!(found.files.is_empty());
        let warning = found.warning.unwrap();
        assert_eq!(warning.kind, WarningKind::InputNotFound);
        assert_eq!(warning.path, "test");
    }
}
