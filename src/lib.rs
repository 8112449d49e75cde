pub mod config;
pub mod docs;
pub mod error;
pub mod generator;
pub mod loader;
pub mod symbols;
pub mod walker;

pub use config::{GeneratorConfig, CONFIG_FILENAME};
pub use docs::{DocumentWriter, ExampleIndex, PackagePage, PackageReport, SymbolStub};
pub use error::{RefgenError, Result};
pub use generator::{GenerationProgress, GenerationStats, Generator};
pub use loader::{
    is_public, Binding, BindingKind, Loader, Module, ModuleRegistry, PythonParser, SourceLoader,
};
pub use symbols::{ImportResolver, ModuleMembers, SymbolClassifier, SymbolKind};
pub use walker::{
    DirectoryKind, ExclusionMatcher, ModuleFile, PackageNode, PathClassifier, TreeWalker,
};
