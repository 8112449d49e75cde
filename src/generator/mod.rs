//! One full documentation run.
//!
//! Every run regenerates all stub files from the current source tree; no
//! state is kept between runs.

pub mod stats;

use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::docs::{DocumentWriter, ExampleIndex};
use crate::error::{RefgenError, Result};
use crate::loader::{Loader, SourceLoader};
use crate::walker::{ExclusionMatcher, PackageNode, PathClassifier, TreeWalker};

pub use stats::{GenerationProgress, GenerationStats};

pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Absolute, canonical root directory.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        let root = &self.config.root;
        if !root.exists() {
            return Err(RefgenError::Config(format!(
                "root path {} does not exist",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(RefgenError::Config(format!(
                "root path {} is not a directory",
                root.display()
            )));
        }
        Ok(root.canonicalize()?)
    }

    pub fn walker(&self) -> Result<TreeWalker> {
        let root = self.resolve_root()?;
        let exclusions = ExclusionMatcher::normalize(&root, &self.config.exclude_dirs);
        let classifier = PathClassifier::new(exclusions, &self.config.exclude_files)?;
        Ok(TreeWalker::new(root, classifier))
    }

    /// Packages that will be documented, in output order.
    pub fn packages(&self) -> Result<Vec<PackageNode>> {
        let walker = self.walker()?;
        let packages = walker.walk()?;
        if packages.is_empty() {
            return Err(RefgenError::Config(format!(
                "no package to document below {}",
                walker.root().display()
            )));
        }
        Ok(packages)
    }

    pub fn loader(&self) -> Result<SourceLoader> {
        Ok(SourceLoader::for_tree(&self.resolve_root()?))
    }

    pub fn run(&self) -> Result<GenerationStats> {
        let loader = self.loader()?;
        self.run_with(&loader, |_, _| {})
    }

    /// Documents every package using `loader`; `on_package` is called after
    /// each package's files are written.
    pub fn run_with(
        &self,
        loader: &dyn Loader,
        mut on_package: impl FnMut(&PackageNode, &GenerationProgress),
    ) -> Result<GenerationStats> {
        let packages = self.packages()?;
        let examples = self.examples()?;

        let mut writer = DocumentWriter::new(loader, &self.config.destination)
            .with_suffix(self.config.suffix.clone())
            .with_options(self.config.automodule_options.clone());
        if let Some(examples) = examples {
            writer = writer.with_examples(examples);
        }

        let mut progress = GenerationProgress::start(packages.len());
        for package in &packages {
            let report = writer.document_package(package)?;
            progress.inc(&package.name, report.symbol_stubs.len());
            on_package(package, &progress);
        }

        let stats = progress.finish();
        tracing::info!(
            "Documented {} packages and {} symbols in {}",
            stats.package_pages,
            stats.symbol_stubs,
            writer.destination().display()
        );
        Ok(stats)
    }

    fn examples(&self) -> Result<Option<ExampleIndex>> {
        let Some(dir) = &self.config.examples_dir else {
            return Ok(None);
        };
        if !dir.is_dir() {
            return Err(RefgenError::Config(format!(
                "examples directory {} does not exist",
                dir.display()
            )));
        }
        ExampleIndex::scan(dir).map(Some)
    }
}
