use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::loader::Loader;
use crate::symbols::{ImportResolver, SymbolClassifier, SymbolKind};
use crate::walker::{join_dotted, PackageNode};

use super::examples::ExampleIndex;
use super::render::{
    format_heading, format_module_section, format_subpackages, format_symbol,
    DEFAULT_AUTOMODULE_OPTIONS,
};

/// A symbol that gets its own stub file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolStub {
    pub module: String,
    pub name: String,
    pub kind: SymbolKind,
}

impl SymbolStub {
    pub fn file_name(&self) -> String {
        join_dotted(&self.module, &self.name)
    }
}

/// Rendered package page plus the symbols it links to.
#[derive(Debug, Clone)]
pub struct PackagePage {
    pub name: String,
    pub text: String,
    pub symbols: Vec<SymbolStub>,
}

/// Files written for one package.
#[derive(Debug, Clone, Default)]
pub struct PackageReport {
    pub page: PathBuf,
    pub symbol_stubs: Vec<PathBuf>,
}

/// Renders and writes stub files for packages and their symbols.
pub struct DocumentWriter<'a> {
    loader: &'a dyn Loader,
    destination: PathBuf,
    suffix: String,
    options: Vec<String>,
    examples: Option<ExampleIndex>,
}

impl<'a> DocumentWriter<'a> {
    pub fn new(loader: &'a dyn Loader, destination: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            destination: destination.into(),
            suffix: "rst".to_string(),
            options: DEFAULT_AUTOMODULE_OPTIONS.iter().map(|s| s.to_string()).collect(),
            examples: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_examples(mut self, examples: ExampleIndex) -> Self {
        self.examples = Some(examples);
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Writes the symbol stubs of a package, then the package page.
    pub fn document_package(&self, node: &PackageNode) -> Result<PackageReport> {
        let page = self.render_package(node)?;

        let mut report = PackageReport::default();
        for stub in &page.symbols {
            let text = self.render_symbol(&stub.module, &stub.name, stub.kind)?;
            report.symbol_stubs.push(self.write(&stub.file_name(), &text)?);
        }
        report.page = self.write(&page.name, &page.text)?;

        Ok(report)
    }

    pub fn render_package(&self, node: &PackageNode) -> Result<PackagePage> {
        let classifier = SymbolClassifier::new(self.loader);
        let mut text = format_heading(1, &format!("{} package", node.dir_name()));
        let mut symbols = Vec::new();

        for module in &node.modules {
            if module.is_trivial() {
                continue;
            }

            let module_name = node.module_name(module);
            let members = classifier.members(&module_name)?;
            let heading = (!module.is_marker()).then(|| module.stem());
            text.push_str(&format_module_section(heading, &members, &self.options));

            for kind in SymbolKind::ALL {
                symbols.extend(members.of_kind(kind).iter().map(|name| SymbolStub {
                    module: module_name.clone(),
                    name: name.clone(),
                    kind,
                }));
            }
        }

        text.push_str(&format_subpackages(&node.name, &node.subpackages));

        Ok(PackagePage {
            name: node.name.clone(),
            text,
            symbols,
        })
    }

    pub fn render_symbol(&self, module: &str, name: &str, kind: SymbolKind) -> Result<String> {
        let shortest = ImportResolver::new(self.loader).find_shortest(module, name)?;
        let examples = match (&self.examples, kind) {
            (Some(examples), SymbolKind::Class) => examples.render(name),
            _ => String::new(),
        };

        Ok(format_symbol(module, name, kind, &shortest, &examples))
    }

    pub fn write(&self, name: &str, text: &str) -> Result<PathBuf> {
        write_file(name, text, &self.destination, &self.suffix)
    }
}

/// Writes `<name>.<suffix>` under `destination`, creating the directory if
/// needed and replacing any previous file.
pub fn write_file(name: &str, text: &str, destination: &Path, suffix: &str) -> Result<PathBuf> {
    fs::create_dir_all(destination)?;
    let path = destination.join(format!("{}.{}", name, suffix));
    tracing::info!("Creating file {}", path.display());
    fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{Binding, ModuleRegistry};
    use crate::walker::ModuleFile;
    use tempfile::TempDir;

    fn registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry
            .define("pkg")
            .define_function("version")
            .bind("Engine", Binding::class("pkg.core"));
        registry
            .define("pkg.core")
            .define_class("Engine")
            .define_object("default_engine")
            .bind("helper", Binding::function("pkg.util"));
        registry.define("pkg.util").define_function("helper");
        registry
    }

    fn node() -> PackageNode {
        PackageNode {
            name: "pkg".to_string(),
            path: PathBuf::from("/src/pkg"),
            modules: vec![
                ModuleFile::new("__init__.py", 40),
                ModuleFile::new("core.py", 120),
                ModuleFile::new("empty.py", 1),
            ],
            subpackages: vec!["sub".to_string()],
        }
    }

    #[test]
    fn test_render_package_page() {
        let registry = registry();
        let writer = DocumentWriter::new(&registry, "/unused");
        let page = writer.render_package(&node()).unwrap();

        let expected = concat!(
            "pkg package\n",
            "===========\n\n",
            ".. automodule:: pkg\n",
            "    :show-inheritance:\n\n",
            "**Functions**\n\n",
            ".. autosummary:: version\n",
            "    :toctree:\n\n",
            "\n",
            ":mod:`core` module\n",
            "------------------\n\n",
            ".. automodule:: pkg.core\n",
            "    :show-inheritance:\n\n",
            "**Classes**\n\n",
            ".. autosummary:: Engine\n",
            "    :toctree:\n\n",
            "**Objects**\n\n",
            ".. autosummary:: default_engine\n",
            "    :toctree:\n\n",
            "\n",
            "Subpackages\n",
            "-----------\n\n",
            ".. toctree::\n",
            "    :maxdepth: 2\n\n",
            "    pkg.sub\n",
            "\n",
        );
        assert_eq!(page.text, expected);

        let stubs: Vec<_> = page.symbols.iter().map(SymbolStub::file_name).collect();
        assert_eq!(stubs, vec!["pkg.version", "pkg.core.Engine", "pkg.core.default_engine"]);
    }

    #[test]
    fn test_render_symbol_uses_shortest_import() {
        let registry = registry();
        let writer = DocumentWriter::new(&registry, "/unused");
        let text = writer
            .render_symbol("pkg.core", "Engine", SymbolKind::Class)
            .unwrap();
        assert!(text.contains("(*Shortest import*: ``from pkg import Engine)``"));
    }

    #[test]
    fn test_class_stub_lists_examples() {
        let registry = registry();
        let mut examples = ExampleIndex::new();
        examples.insert_source("demo", "Engine().start()\n").unwrap();

        let writer = DocumentWriter::new(&registry, "/unused").with_examples(examples);
        let text = writer
            .render_symbol("pkg.core", "Engine", SymbolKind::Class)
            .unwrap();
        assert!(text.ends_with("* Example :doc:`demo </examples/demo>`\n\n"));
    }

    #[test]
    fn test_document_package_writes_files() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        let registry = registry();
        let writer = DocumentWriter::new(&registry, &destination).with_suffix("txt");

        let report = writer.document_package(&node()).unwrap();

        assert_eq!(report.page, destination.join("pkg.txt"));
        assert_eq!(report.symbol_stubs.len(), 3);
        assert!(destination.join("pkg.core.Engine.txt").is_file());
        assert!(destination.join("pkg.version.txt").is_file());
        assert!(!destination.join("pkg.util.helper.txt").exists());
    }

    #[test]
    fn test_custom_options() {
        let registry = registry();
        let writer = DocumentWriter::new(&registry, "/unused")
            .with_options(vec!["members".to_string(), "undoc-members".to_string()]);
        let page = writer.render_package(&node()).unwrap();
        assert!(page
            .text
            .starts_with("pkg package\n===========\n\n.. automodule:: pkg\n    :members:\n    :undoc-members:\n\n"));
    }

    #[test]
    fn test_write_file_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("nested").join("out");

        let path = write_file("pkg", "first", &destination, "rst").unwrap();
        write_file("pkg", "second", &destination, "rst").unwrap();

        assert_eq!(path, destination.join("pkg.rst"));
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }
}
