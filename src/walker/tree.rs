use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

use super::classifier::{DirectoryKind, PathClassifier, PACKAGE_MARKER};
use super::join_dotted;

/// A module file directly inside a package directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleFile {
    pub file_name: String,
    pub len: u64,
}

impl ModuleFile {
    pub fn new(file_name: impl Into<String>, len: u64) -> Self {
        Self {
            file_name: file_name.into(),
            len,
        }
    }

    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.file_name)
    }

    pub fn is_marker(&self) -> bool {
        self.file_name == PACKAGE_MARKER
    }

    pub fn is_trivial(&self) -> bool {
        PathClassifier::is_trivial(self.len)
    }
}

/// A directory recognized as a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageNode {
    /// Dotted package name
    pub name: String,
    pub path: PathBuf,
    /// Module files, marker first, then lexicographic
    pub modules: Vec<ModuleFile>,
    /// Qualifying child package directory names, lexicographic
    pub subpackages: Vec<String>,
}

impl PackageNode {
    pub fn dir_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.name)
    }

    /// Dotted module name of a file in this package. The marker file stands
    /// for the package itself.
    pub fn module_name(&self, module: &ModuleFile) -> String {
        if module.is_marker() {
            self.name.clone()
        } else {
            join_dotted(&self.name, module.stem())
        }
    }

    pub fn subpackage_name(&self, sub: &str) -> String {
        join_dotted(&self.name, sub)
    }

    /// Packages with no subpackages, no module besides the marker and an
    /// empty marker have nothing to document.
    pub fn is_empty(&self) -> bool {
        let has_other_modules = self.modules.iter().any(|m| !m.is_marker());
        let marker_trivial = self
            .modules
            .iter()
            .find(|m| m.is_marker())
            .map_or(true, |m| m.is_trivial());

        self.subpackages.is_empty() && !has_other_modules && marker_trivial
    }
}

/// Depth-first walk over a package tree.
pub struct TreeWalker {
    root: PathBuf,
    classifier: PathClassifier,
}

impl TreeWalker {
    /// `root` is expected to be absolute and canonical.
    pub fn new(root: impl Into<PathBuf>, classifier: PathClassifier) -> Self {
        Self {
            root: root.into(),
            classifier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top-level package name when the root itself is a package.
    pub fn root_package(&self) -> Option<String> {
        if self.root.join(PACKAGE_MARKER).is_file() {
            self.root
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        } else {
            None
        }
    }

    /// Packages below the root in depth-first order. A root without
    /// `__init__.py` only holds packages; its own `.py` files are never
    /// documented.
    pub fn walk(&self) -> Result<Vec<PackageNode>> {
        let root_package = self.root_package().unwrap_or_default();
        let mut packages = Vec::new();

        let entries = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.should_descend(entry));

        for entry in entries {
            let entry = entry?;
            let dir = entry.path();

            if self.classifier.classify_dir(dir) != DirectoryKind::Package {
                // Only a plain root gets here; it is a container, not a package.
                tracing::debug!("Root {} is not a package", dir.display());
                continue;
            }

            let relative = dir
                .strip_prefix(&self.root)
                .unwrap_or(dir)
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(".");
            let name = join_dotted(&root_package, &relative);

            let node = self.read_package(dir, name)?;
            if node.is_empty() {
                tracing::debug!("Skipping empty package {}", node.name);
                continue;
            }
            packages.push(node);
        }

        Ok(packages)
    }

    fn should_descend(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }

        let path = entry.path();
        if entry.depth() == 0 {
            return !self.classifier.exclusions().is_excluded(path);
        }

        let name = entry.file_name().to_string_lossy();
        if !PathClassifier::is_visible_dir(&name) {
            return false;
        }

        match self.classifier.classify_dir(path) {
            DirectoryKind::Package => true,
            DirectoryKind::Plain => {
                tracing::debug!("Pruning non-package directory {}", path.display());
                false
            }
            DirectoryKind::Excluded => {
                tracing::debug!("Pruning excluded directory {}", path.display());
                false
            }
        }
    }

    fn read_package(&self, dir: &Path, name: String) -> Result<PackageNode> {
        let mut modules = Vec::new();
        let mut subpackages = Vec::new();

        // Symlinked modules and packages count like regular ones, matching
        // what the loader resolves.
        let children = WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for child in children {
            let child = child?;
            let file_name = child.file_name().to_string_lossy().into_owned();

            if child.file_type().is_dir() {
                if PathClassifier::is_visible_dir(&file_name)
                    && self.classifier.classify_dir(child.path()) == DirectoryKind::Package
                {
                    subpackages.push(file_name);
                }
            } else if child.file_type().is_file() && self.classifier.is_module_file(&file_name) {
                modules.push(ModuleFile::new(file_name, child.metadata()?.len()));
            }
        }

        if let Some(pos) = modules.iter().position(ModuleFile::is_marker) {
            let marker = modules.remove(pos);
            modules.insert(0, marker);
        }

        Ok(PackageNode {
            name,
            path: dir.to_path_buf(),
            modules,
            subpackages,
        })
    }
}
