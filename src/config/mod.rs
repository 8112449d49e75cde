//! Generator configuration.
//!
//! Settings can come from a `refgen.toml` file; command-line flags take
//! precedence over file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::docs::DEFAULT_AUTOMODULE_OPTIONS;
use crate::error::{RefgenError, Result};

pub const CONFIG_FILENAME: &str = "refgen.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Package tree to document
    pub root: PathBuf,
    /// Directory receiving the stub files
    pub destination: PathBuf,
    /// Directories to prune, relative to `root` or absolute
    pub exclude_dirs: Vec<String>,
    /// Module file names or glob patterns to leave out
    pub exclude_files: Vec<String>,
    /// Extension of generated files
    pub suffix: String,
    /// Options emitted under every automodule directive
    pub automodule_options: Vec<String>,
    /// Example scripts referenced from class stubs
    pub examples_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            destination: PathBuf::from("reference"),
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            suffix: "rst".to_string(),
            automodule_options: DEFAULT_AUTOMODULE_OPTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            examples_dir: None,
        }
    }
}

impl GeneratorConfig {
    pub fn new(root: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file. Relative paths inside it are taken relative to
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RefgenError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let anchor = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };
        self.root = anchor(self.root);
        self.destination = anchor(self.destination);
        self.examples_dir = self.examples_dir.map(anchor);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() || self.suffix.contains(['/', '\\']) {
            return Err(RefgenError::Config(format!(
                "invalid output suffix '{}'",
                self.suffix
            )));
        }
        Ok(())
    }
}
