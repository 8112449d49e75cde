//! Path-prefix exclusion rules.
//!
//! Rules are stored as absolute paths with a trailing separator so that
//! an exclusion of `foo` never matches a sibling named `foobar`.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    rules: Vec<String>,
}

impl ExclusionMatcher {
    /// Normalizes raw exclusion paths against `root`.
    ///
    /// A raw path that is neither absolute nor already spelled out under `root`
    /// is joined with `root`. Existing directories are canonicalized, missing
    /// ones are normalized lexically.
    pub fn normalize<S: AsRef<str>>(root: &Path, excludes: &[S]) -> Self {
        let root_str = root.to_string_lossy();
        let rules = excludes
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                let path = Path::new(raw);
                let joined = if !path.is_absolute() && !raw.starts_with(root_str.as_ref()) {
                    root.join(path)
                } else {
                    path.to_path_buf()
                };
                let normalized = joined
                    .canonicalize()
                    .unwrap_or_else(|_| normalize_path(&joined));
                with_trailing_separator(&normalized)
            })
            .collect();

        Self { rules }
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_excluded(&self, candidate: &Path) -> bool {
        let candidate = with_trailing_separator(candidate);
        self.rules.iter().any(|rule| candidate.starts_with(rule.as_str()))
    }
}

/// Collapses `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn with_trailing_separator(path: &Path) -> String {
    let mut text = path.to_string_lossy().into_owned();
    if !text.ends_with(MAIN_SEPARATOR) {
        text.push(MAIN_SEPARATOR);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/nonexistent-refgen-root/pkg")
    }

    #[test]
    fn test_relative_exclude_joined_with_root() {
        let matcher = ExclusionMatcher::normalize(&root(), &["tests"]);
        let expected = format!("/nonexistent-refgen-root/pkg/tests{}", MAIN_SEPARATOR);
        assert_eq!(matcher.rules(), &[expected]);
    }

    #[test]
    fn test_absolute_exclude_kept() {
        let matcher = ExclusionMatcher::normalize(&root(), &["/elsewhere/build/"]);
        let expected = format!("/elsewhere/build{}", MAIN_SEPARATOR);
        assert_eq!(matcher.rules(), &[expected]);
    }

    #[test]
    fn test_exclude_already_under_root_not_joined_twice() {
        let matcher =
            ExclusionMatcher::normalize(&root(), &["/nonexistent-refgen-root/pkg/sandbox"]);
        assert!(matcher.is_excluded(Path::new("/nonexistent-refgen-root/pkg/sandbox")));
        assert!(!matcher.is_excluded(Path::new(
            "/nonexistent-refgen-root/pkg/nonexistent-refgen-root/pkg/sandbox"
        )));
    }

    #[test]
    fn test_prefix_sibling_not_excluded() {
        let matcher = ExclusionMatcher::normalize(&root(), &["foo"]);
        assert!(matcher.is_excluded(&root().join("foo")));
        assert!(!matcher.is_excluded(&root().join("foobar")));
    }

    #[test]
    fn test_nested_directories_excluded() {
        let matcher = ExclusionMatcher::normalize(&root(), &["foo"]);
        assert!(matcher.is_excluded(&root().join("foo").join("bar").join("baz")));
        assert!(!matcher.is_excluded(&root()));
    }

    #[test]
    fn test_candidate_with_trailing_separator() {
        let matcher = ExclusionMatcher::normalize(&root(), &["foo"]);
        let candidate = format!("/nonexistent-refgen-root/pkg/foo{}", MAIN_SEPARATOR);
        assert!(matcher.is_excluded(Path::new(&candidate)));
    }

    #[test]
    fn test_dot_segments_collapsed() {
        let matcher = ExclusionMatcher::normalize(&root(), &["./sub/../foo"]);
        assert!(matcher.is_excluded(&root().join("foo")));
        assert!(!matcher.is_excluded(&root().join("sub")));
    }

    #[test]
    fn test_empty_rules_exclude_nothing() {
        let matcher = ExclusionMatcher::normalize::<&str>(&root(), &[]);
        assert!(matcher.is_empty());
        assert!(!matcher.is_excluded(&root()));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("a/b/..")), PathBuf::from("a"));
    }
}
