//! Shortest import path resolution.
//!
//! Symbols defined deep inside a package are commonly re-exported by one
//! of its ancestors. The shallowest ancestor that still hands out the same
//! symbol is the import path users should see.

use crate::error::{RefgenError, Result};
use crate::loader::Loader;

pub struct ImportResolver<'a> {
    loader: &'a dyn Loader,
}

impl<'a> ImportResolver<'a> {
    pub fn new(loader: &'a dyn Loader) -> Self {
        Self { loader }
    }

    /// Returns the shallowest dotted prefix of `module_name` from which
    /// `symbol` resolves to a binding defined in `module_name`.
    pub fn find_shortest(&self, module_name: &str, symbol: &str) -> Result<String> {
        let parts: Vec<&str> = module_name.split('.').collect();

        for depth in 1..=parts.len() {
            let candidate = parts[..depth].join(".");
            let module = match self.loader.load(&candidate) {
                Ok(module) => module,
                Err(e) => {
                    tracing::debug!("{} not importable from {}: {}", symbol, candidate, e);
                    continue;
                }
            };

            if module
                .get(symbol)
                .is_some_and(|binding| binding.is_defined_in(module_name))
            {
                return Ok(candidate);
            }
        }

        Err(RefgenError::Resolution {
            module: module_name.to_string(),
            symbol: symbol.to_string(),
        })
    }
}
