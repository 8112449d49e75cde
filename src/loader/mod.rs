//! Module loading.
//!
//! A [`Loader`] turns a dotted module name into the module's symbol table.
//! Every binding records the module it was originally defined in, which is
//! the only authority for deciding where a symbol gets documented.

pub mod parser;
pub mod registry;
pub mod source;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;

pub use parser::{ParsedSource, PythonParser};
pub use registry::ModuleRegistry;
pub use source::SourceLoader;

/// Capability to load a module by its dotted name.
pub trait Loader {
    /// Loads a module, failing with an import error if it cannot be found
    /// or cannot be analyzed.
    fn load(&self, name: &str) -> Result<Arc<Module>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Class,
    Function,
    Module,
    Value,
}

/// What a name in a module is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub kind: BindingKind,
    /// Module that defined the bound object. `None` for modules and for
    /// values that carry no defining module (literals, builtins).
    pub origin: Option<String>,
}

impl Binding {
    pub fn class(origin: impl Into<String>) -> Self {
        Self {
            kind: BindingKind::Class,
            origin: Some(origin.into()),
        }
    }

    pub fn function(origin: impl Into<String>) -> Self {
        Self {
            kind: BindingKind::Function,
            origin: Some(origin.into()),
        }
    }

    pub fn object(origin: impl Into<String>) -> Self {
        Self {
            kind: BindingKind::Value,
            origin: Some(origin.into()),
        }
    }

    pub fn value() -> Self {
        Self {
            kind: BindingKind::Value,
            origin: None,
        }
    }

    pub fn module() -> Self {
        Self {
            kind: BindingKind::Module,
            origin: None,
        }
    }

    pub fn is_defined_in(&self, module: &str) -> bool {
        self.origin.as_deref() == Some(module)
    }
}

/// Symbol table of one loaded module.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Module {
    pub name: String,
    bindings: BTreeMap<String, Binding>,
    /// Explicit export list (`__all__`), if the module declares one
    exports: Option<Vec<String>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: BTreeMap::new(),
            exports: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// All bindings in lexicographic name order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    pub fn public_bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings().filter(|(name, _)| is_public(name))
    }

    pub fn exports(&self) -> Option<&[String]> {
        self.exports.as_deref()
    }

    pub fn set_exports(&mut self, exports: Vec<String>) {
        self.exports = Some(exports);
    }

    pub fn extend_exports(&mut self, extra: Vec<String>) {
        self.exports.get_or_insert_with(Vec::new).extend(extra);
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) -> &mut Self {
        self.bindings.insert(name.into(), binding);
        self
    }

    pub fn unbind(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    pub fn define_class(&mut self, name: impl Into<String>) -> &mut Self {
        let origin = self.name.clone();
        self.bind(name, Binding::class(origin))
    }

    pub fn define_function(&mut self, name: impl Into<String>) -> &mut Self {
        let origin = self.name.clone();
        self.bind(name, Binding::function(origin))
    }

    pub fn define_object(&mut self, name: impl Into<String>) -> &mut Self {
        let origin = self.name.clone();
        self.bind(name, Binding::object(origin))
    }
}

/// Names starting with an underscore are implementation details.
pub fn is_public(name: &str) -> bool {
    !name.starts_with('_')
}
