//! Stub file generation.
//!
//! Renders one page per package and one stub per documented symbol in the
//! directive format consumed by the downstream site renderer.

pub mod examples;
pub mod render;
pub mod writer;

pub use examples::ExampleIndex;
pub use render::{format_heading, format_symbol, DEFAULT_AUTOMODULE_OPTIONS};
pub use writer::{write_file, DocumentWriter, PackagePage, PackageReport, SymbolStub};
