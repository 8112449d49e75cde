//! Symbol ownership.
//!
//! A module documents only the names it defines itself. Names imported or
//! re-exported into it belong to the module recorded as their origin.

pub mod resolver;

use serde::Serialize;

use crate::error::Result;
use crate::loader::{BindingKind, Loader};

pub use resolver::ImportResolver;

/// Documented kinds of symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Function,
    Object,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 3] = [SymbolKind::Class, SymbolKind::Function, SymbolKind::Object];

    pub fn from_binding(kind: BindingKind) -> Option<Self> {
        match kind {
            BindingKind::Class => Some(SymbolKind::Class),
            BindingKind::Function => Some(SymbolKind::Function),
            BindingKind::Value => Some(SymbolKind::Object),
            BindingKind::Module => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Object => "object",
        }
    }

    /// Title of the summary group listing symbols of this kind.
    pub fn group_title(&self) -> &'static str {
        match self {
            SymbolKind::Class => "Classes",
            SymbolKind::Function => "Functions",
            SymbolKind::Object => "Objects",
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            SymbolKind::Class => "autoclass",
            SymbolKind::Function => "autofunction",
            SymbolKind::Object => "autodata",
        }
    }
}

/// Symbols owned by one module, each group in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleMembers {
    pub module: String,
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub objects: Vec<String>,
}

impl ModuleMembers {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Default::default()
        }
    }

    pub fn of_kind(&self, kind: SymbolKind) -> &[String] {
        match kind {
            SymbolKind::Class => &self.classes,
            SymbolKind::Function => &self.functions,
            SymbolKind::Object => &self.objects,
        }
    }

    fn push(&mut self, kind: SymbolKind, name: String) {
        match kind {
            SymbolKind::Class => self.classes.push(name),
            SymbolKind::Function => self.functions.push(name),
            SymbolKind::Object => self.objects.push(name),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.functions.len() + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts the symbols a module truly owns.
pub struct SymbolClassifier<'a> {
    loader: &'a dyn Loader,
}

impl<'a> SymbolClassifier<'a> {
    pub fn new(loader: &'a dyn Loader) -> Self {
        Self { loader }
    }

    pub fn members(&self, module_name: &str) -> Result<ModuleMembers> {
        let module = self.loader.load(module_name)?;
        let mut members = ModuleMembers::new(module_name);

        for (name, binding) in module.public_bindings() {
            if !binding.is_defined_in(module_name) {
                continue;
            }
            if let Some(kind) = SymbolKind::from_binding(binding.kind) {
                members.push(kind, name.to_string());
            }
        }

        tracing::debug!("{}: {} documented symbols", module_name, members.len());
        Ok(members)
    }
}
