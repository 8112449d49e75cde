//! Registration-time symbol tables.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RefgenError, Result};

use super::{Loader, Module};

/// A loader backed by explicitly registered modules.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Module) {
        self.modules.insert(module.name.clone(), Arc::new(module));
    }

    /// Returns the module registered under `name`, creating it if needed.
    pub fn define(&mut self, name: &str) -> &mut Module {
        let entry = self
            .modules
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Module::new(name)));
        Arc::make_mut(entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Loader for ModuleRegistry {
    fn load(&self, name: &str) -> Result<Arc<Module>> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| RefgenError::import(name, format!("No module named '{}'", name)))
    }
}
