use std::path::Path;

use glob::Pattern;

use crate::error::Result;

use super::exclusion::ExclusionMatcher;

/// File whose presence turns a directory into a package.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Extension of documentable module files.
pub const MODULE_SUFFIX: &str = "py";

/// Files at or below this size count as empty (nothing, `\n` or `\r\n`).
pub const TRIVIAL_MODULE_BYTES: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    Package,
    Plain,
    Excluded,
}

/// Decides what a single filesystem entry means for the walk.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    exclusions: ExclusionMatcher,
    excluded_files: Vec<(String, Pattern)>,
}

impl PathClassifier {
    pub fn new<S: AsRef<str>>(exclusions: ExclusionMatcher, excluded_files: &[S]) -> Result<Self> {
        let excluded_files = excluded_files
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                Ok((raw.to_string(), Pattern::new(raw)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            exclusions,
            excluded_files,
        })
    }

    pub fn exclusions(&self) -> &ExclusionMatcher {
        &self.exclusions
    }

    pub fn classify_dir(&self, dir: &Path) -> DirectoryKind {
        if self.exclusions.is_excluded(dir) {
            DirectoryKind::Excluded
        } else if dir.join(PACKAGE_MARKER).is_file() {
            DirectoryKind::Package
        } else {
            DirectoryKind::Plain
        }
    }

    pub fn is_module_file(&self, file_name: &str) -> bool {
        let has_suffix = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == MODULE_SUFFIX);

        has_suffix
            && !self
                .excluded_files
                .iter()
                .any(|(raw, pattern)| raw == file_name || pattern.matches(file_name))
    }

    /// Hidden (`.`) and private (`_`) directories are never descended into.
    pub fn is_visible_dir(name: &str) -> bool {
        !name.starts_with('.') && !name.starts_with('_')
    }

    pub fn is_trivial(len: u64) -> bool {
        len <= TRIVIAL_MODULE_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn classifier(files: &[&str]) -> PathClassifier {
        PathClassifier::new(ExclusionMatcher::default(), files).unwrap()
    }

    #[test]
    fn test_module_suffix() {
        let classifier = classifier(&[]);
        assert!(classifier.is_module_file("core.py"));
        assert!(classifier.is_module_file(PACKAGE_MARKER));
        assert!(!classifier.is_module_file("core.pyc"));
        assert!(!classifier.is_module_file("README.md"));
        assert!(!classifier.is_module_file("py"));
    }

    #[test]
    fn test_excluded_file_names() {
        let classifier = classifier(&["setup.py", "*_test.py"]);
        assert!(!classifier.is_module_file("setup.py"));
        assert!(!classifier.is_module_file("units_test.py"));
        assert!(classifier.is_module_file("units.py"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = PathClassifier::new(ExclusionMatcher::default(), &["[broken"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_visible_dirs() {
        assert!(PathClassifier::is_visible_dir("units"));
        assert!(!PathClassifier::is_visible_dir(".git"));
        assert!(!PathClassifier::is_visible_dir("__pycache__"));
        assert!(!PathClassifier::is_visible_dir("_private"));
    }

    #[test]
    fn test_trivial_threshold() {
        assert!(PathClassifier::is_trivial(0));
        assert!(PathClassifier::is_trivial(2));
        assert!(!PathClassifier::is_trivial(3));
    }

    #[test]
    fn test_classify_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("pkg").join(PACKAGE_MARKER), "").unwrap();
        fs::create_dir_all(root.join("plain")).unwrap();
        fs::create_dir_all(root.join("skipped")).unwrap();
        fs::write(root.join("skipped").join(PACKAGE_MARKER), "").unwrap();

        let exclusions = ExclusionMatcher::normalize(&root, &["skipped"]);
        let classifier = PathClassifier::new::<&str>(exclusions, &[]).unwrap();

        assert_eq!(classifier.classify_dir(&root.join("pkg")), DirectoryKind::Package);
        assert_eq!(classifier.classify_dir(&root.join("plain")), DirectoryKind::Plain);
        assert_eq!(classifier.classify_dir(&root.join("skipped")), DirectoryKind::Excluded);
    }
}
