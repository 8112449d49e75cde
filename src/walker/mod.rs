//! Package tree traversal.
//!
//! Classifies directories as packages or plain directories, applies
//! exclusion rules and collects the packages worth documenting.

pub mod classifier;
pub mod exclusion;
pub mod tree;

pub use classifier::{
    DirectoryKind, PathClassifier, MODULE_SUFFIX, PACKAGE_MARKER, TRIVIAL_MODULE_BYTES,
};
pub use exclusion::{normalize_path, ExclusionMatcher};
pub use tree::{ModuleFile, PackageNode, TreeWalker};

/// Joins a package and a module name with a dot. Either may be empty.
pub fn join_dotted(package: &str, module: &str) -> String {
    match (package.is_empty(), module.is_empty()) {
        (true, _) => module.to_string(),
        (false, true) => package.to_string(),
        (false, false) => format!("{}.{}", package, module),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_dotted() {
        assert_eq!(join_dotted("pkg", "core"), "pkg.core");
        assert_eq!(join_dotted("", "core"), "core");
        assert_eq!(join_dotted("pkg", ""), "pkg");
        assert_eq!(join_dotted("", ""), "");
    }
}
