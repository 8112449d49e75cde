//! Static symbol tables built from Python sources.
//!
//! Module-level statements are replayed in order: definitions, assignments,
//! imports and `del` update the namespace the same way executing the module
//! would, without running any code. Imports from modules inside the search
//! root are followed so re-exported names keep the origin of the module that
//! defined them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tree_sitter::Node;

use crate::error::{RefgenError, Result};
use crate::walker::{join_dotted, MODULE_SUFFIX, PACKAGE_MARKER};

use super::parser::{ParsedSource, PythonParser};
use super::{Binding, BindingKind, Loader, Module};

/// Loads modules from `.py` files below a search root.
pub struct SourceLoader {
    search_root: PathBuf,
    parser: PythonParser,
    loaded: RefCell<HashMap<String, Arc<Module>>>,
    /// Modules whose body is being replayed; visible to import cycles
    loading: RefCell<HashMap<String, Module>>,
}

/// Where a dotted module name lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    pub path: PathBuf,
    pub is_package: bool,
}

struct Scope<'a> {
    module: &'a str,
    /// Package used to anchor relative imports
    package: &'a str,
    parsed: &'a ParsedSource,
}

impl<'a> Scope<'a> {
    fn text(&self, node: &Node) -> &'a str {
        self.parsed.node_text(node)
    }
}

impl SourceLoader {
    pub fn new(search_root: impl Into<PathBuf>) -> Self {
        Self {
            search_root: search_root.into(),
            parser: PythonParser::new(),
            loaded: RefCell::new(HashMap::new()),
            loading: RefCell::new(HashMap::new()),
        }
    }

    /// Loader for a documented tree: a package root is imported from its
    /// parent directory, a plain root holds its packages directly.
    pub fn for_tree(root: &Path) -> Self {
        let search_root = if root.join(PACKAGE_MARKER).is_file() {
            root.parent().unwrap_or(root)
        } else {
            root
        };
        Self::new(search_root)
    }

    pub fn search_root(&self) -> &Path {
        &self.search_root
    }

    /// Finds the source file of a module; packages take precedence over
    /// plain modules of the same name.
    pub fn locate(&self, name: &str) -> Option<ModuleLocation> {
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return None;
        }

        let dir = name
            .split('.')
            .fold(self.search_root.clone(), |path, part| path.join(part));

        let marker = dir.join(PACKAGE_MARKER);
        if marker.is_file() {
            return Some(ModuleLocation {
                path: marker,
                is_package: true,
            });
        }

        let file = dir.with_extension(MODULE_SUFFIX);
        if file.is_file() {
            return Some(ModuleLocation {
                path: file,
                is_package: false,
            });
        }

        None
    }

    /// Modules whose top-level package is not below the search root are
    /// third-party or standard library modules.
    fn is_external(&self, name: &str) -> bool {
        let top = name.split('.').next().unwrap_or(name);
        self.locate(top).is_none()
    }

    fn execute_module(&self, name: &str, location: &ModuleLocation) -> Result<()> {
        let source = std::fs::read_to_string(&location.path)
            .map_err(|e| RefgenError::import(name, format!("{}: {}", location.path.display(), e)))?;
        let parsed = self
            .parser
            .parse_source(&source)
            .map_err(|e| RefgenError::import(name, e.to_string()))?;

        if parsed.has_syntax_error() {
            return Err(RefgenError::import(
                name,
                format!("invalid syntax in {}", location.path.display()),
            ));
        }

        let package = if location.is_package {
            name
        } else {
            name.rsplit_once('.').map_or("", |(parent, _)| parent)
        };
        let scope = Scope {
            module: name,
            package,
            parsed: &parsed,
        };

        let root = parsed.root_node();
        let mut cursor = root.walk();
        let statements: Vec<Node> = root.named_children(&mut cursor).collect();
        for statement in statements {
            self.execute(&scope, statement)?;
        }

        Ok(())
    }

    fn execute(&self, scope: &Scope, node: Node) -> Result<()> {
        match node.kind() {
            "class_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bind(scope, scope.text(&name), Binding::class(scope.module));
                }
            }
            "function_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bind(scope, scope.text(&name), Binding::function(scope.module));
                }
            }
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.execute(scope, definition)?;
                }
            }
            "expression_statement" => {
                let mut cursor = node.walk();
                let expressions: Vec<Node> = node.named_children(&mut cursor).collect();
                for expression in expressions {
                    match expression.kind() {
                        "assignment" => {
                            self.assign(scope, expression);
                        }
                        "augmented_assignment" => self.augment(scope, expression),
                        _ => {}
                    }
                }
            }
            "import_statement" => self.import(scope, node)?,
            "import_from_statement" => self.import_from(scope, node)?,
            "delete_statement" => self.delete(scope, node),
            "if_statement" => {
                if let Some(consequence) = node.child_by_field_name("consequence") {
                    self.execute_block(scope, consequence)?;
                }
                let mut cursor = node.walk();
                let alternatives: Vec<Node> =
                    node.children_by_field_name("alternative", &mut cursor).collect();
                for alternative in alternatives {
                    let body = match alternative.kind() {
                        "elif_clause" => alternative.child_by_field_name("consequence"),
                        _ => alternative.child_by_field_name("body"),
                    };
                    if let Some(body) = body {
                        self.execute_block(scope, body)?;
                    }
                }
            }
            "try_statement" => self.execute_try(scope, node)?,
            _ => {}
        }

        Ok(())
    }

    /// Replays a `try` statement. A failed import in the body runs the first
    /// handler that catches import errors, as executing the module would;
    /// any other failure propagates.
    fn execute_try(&self, scope: &Scope, node: Node) -> Result<()> {
        let mut cursor = node.walk();
        let clauses: Vec<Node> = node.named_children(&mut cursor).collect();

        let outcome = match node.child_by_field_name("body") {
            Some(body) => self.execute_block(scope, body),
            None => Ok(()),
        };

        match outcome {
            Ok(()) => {
                for clause in clauses.iter().filter(|c| c.kind() == "else_clause") {
                    if let Some(body) = clause.child_by_field_name("body") {
                        self.execute_block(scope, body)?;
                    }
                }
            }
            Err(err @ RefgenError::Import { .. }) => {
                let handler = clauses
                    .iter()
                    .find(|c| c.kind() == "except_clause" && catches_import_error(scope, **c));
                let Some(handler) = handler else {
                    return Err(err);
                };
                tracing::debug!("{}: handled {}", scope.module, err);
                for block in blocks_of(*handler) {
                    self.execute_block(scope, block)?;
                }
            }
            Err(err) => return Err(err),
        }

        for clause in clauses.iter().filter(|c| c.kind() == "finally_clause") {
            for block in blocks_of(*clause) {
                self.execute_block(scope, block)?;
            }
        }

        Ok(())
    }

    fn execute_block(&self, scope: &Scope, block: Node) -> Result<()> {
        let mut cursor = block.walk();
        let statements: Vec<Node> = block.named_children(&mut cursor).collect();
        for statement in statements {
            self.execute(scope, statement)?;
        }
        Ok(())
    }

    /// Binds every target of an assignment and returns the assigned value.
    fn assign(&self, scope: &Scope, node: Node) -> Option<Binding> {
        // `x: int` without a value binds nothing
        let right = node.child_by_field_name("right")?;
        let value = if right.kind() == "assignment" {
            self.assign(scope, right)?
        } else {
            self.evaluate(scope, right)
        };

        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() == "identifier" && scope.text(&left) == "__all__" {
                if let Some(names) = string_sequence(scope, right) {
                    self.with_module(scope, |module| module.set_exports(names));
                }
            }
            self.bind_targets(scope, left, value.clone());
        }

        Some(value)
    }

    fn augment(&self, scope: &Scope, node: Node) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };

        if left.kind() == "identifier" && scope.text(&left) == "__all__" {
            if let Some(names) = string_sequence(scope, right) {
                self.with_module(scope, |module| module.extend_exports(names));
            }
        }
    }

    fn evaluate(&self, scope: &Scope, node: Node) -> Binding {
        match node.kind() {
            "lambda" => Binding::function(scope.module),
            "identifier" => self
                .lookup(scope, scope.text(&node))
                .unwrap_or_else(Binding::value),
            "call" => {
                let class = node
                    .child_by_field_name("function")
                    .filter(|callee| callee.kind() == "identifier")
                    .and_then(|callee| self.lookup(scope, scope.text(&callee)))
                    .filter(|binding| binding.kind == BindingKind::Class);
                match class.and_then(|binding| binding.origin) {
                    Some(origin) => Binding::object(origin),
                    None => Binding::value(),
                }
            }
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                inner.map_or_else(Binding::value, |inner| self.evaluate(scope, inner))
            }
            _ => Binding::value(),
        }
    }

    fn bind_targets(&self, scope: &Scope, target: Node, value: Binding) {
        match target.kind() {
            "identifier" => self.bind(scope, scope.text(&target), value),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
            | "list" => {
                // Unpacked values are unknown
                let mut cursor = target.walk();
                let parts: Vec<Node> = target.named_children(&mut cursor).collect();
                for part in parts {
                    self.bind_targets(scope, part, Binding::value());
                }
            }
            _ => {}
        }
    }

    /// `import a.b` loads `a` and `a.b` when they live below the search root
    /// and binds `a`; `import a.b as c` binds `c`.
    fn import(&self, scope: &Scope, node: Node) -> Result<()> {
        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let (dotted, target) = match name.kind() {
                "dotted_name" => {
                    let dotted = scope.text(&name);
                    (dotted, dotted.split('.').next().unwrap_or(dotted))
                }
                "aliased_import" => {
                    let (Some(module), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) else {
                        continue;
                    };
                    (scope.text(&module), scope.text(&alias))
                }
                _ => continue,
            };

            if !self.is_external(dotted) {
                self.load(dotted)?;
            }
            self.bind(scope, target, Binding::module());
        }

        Ok(())
    }

    fn import_from(&self, scope: &Scope, node: Node) -> Result<()> {
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return Ok(());
        };
        let source = self.resolve_module_name(scope, module_node)?;

        let mut cursor = node.walk();
        let is_wildcard = node
            .named_children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import");
        if is_wildcard {
            return self.import_star(scope, &source);
        }

        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let (imported, target) = match name.kind() {
                "aliased_import" => {
                    let (Some(imported), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) else {
                        continue;
                    };
                    (scope.text(&imported), scope.text(&alias))
                }
                _ => {
                    let text = scope.text(&name);
                    (text, text)
                }
            };

            let binding = self.import_name(scope, &source, imported)?;
            self.bind(scope, target, binding);
        }

        Ok(())
    }

    /// Turns the module part of a `from` import into an absolute name.
    fn resolve_module_name(&self, scope: &Scope, node: Node) -> Result<String> {
        if node.kind() != "relative_import" {
            return Ok(scope.text(&node).to_string());
        }

        let mut cursor = node.walk();
        let mut level = 0;
        let mut relative = "";
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_prefix" => level = scope.text(&child).matches('.').count(),
                "dotted_name" => relative = scope.text(&child),
                _ => {}
            }
        }

        let mut base: Vec<&str> = if scope.package.is_empty() {
            Vec::new()
        } else {
            scope.package.split('.').collect()
        };
        for _ in 1..level {
            if base.pop().is_none() {
                break;
            }
        }
        if base.is_empty() {
            return Err(RefgenError::import(
                scope.module,
                "attempted relative import beyond top-level package",
            ));
        }

        Ok(join_dotted(&base.join("."), relative))
    }

    fn import_name(&self, scope: &Scope, source: &str, name: &str) -> Result<Binding> {
        if self.is_external(source) {
            return Ok(Binding::object(source));
        }

        let module = self.load(source)?;
        if let Some(binding) = module.get(name) {
            return Ok(binding.clone());
        }

        let submodule = join_dotted(source, name);
        if self.locate(&submodule).is_some() {
            return Ok(Binding::module());
        }

        Err(RefgenError::import(
            scope.module,
            format!("cannot import name '{}' from '{}'", name, source),
        ))
    }

    fn import_star(&self, scope: &Scope, source: &str) -> Result<()> {
        if self.is_external(source) {
            tracing::debug!("{}: ignoring star import from external {}", scope.module, source);
            return Ok(());
        }

        let module = self.load(source)?;
        let imported: Vec<(String, Binding)> = match module.exports() {
            Some(exports) => exports
                .iter()
                .filter_map(|name| match module.get(name) {
                    Some(binding) => Some((name.clone(), binding.clone())),
                    None => {
                        tracing::warn!("{}: '{}' listed in __all__ but not bound", source, name);
                        None
                    }
                })
                .collect(),
            None => module
                .public_bindings()
                .map(|(name, binding)| (name.to_string(), binding.clone()))
                .collect(),
        };

        for (name, binding) in imported {
            self.bind(scope, &name, binding);
        }

        Ok(())
    }

    fn delete(&self, scope: &Scope, node: Node) {
        let mut targets = Vec::new();
        collect_identifiers(node, &mut targets);
        for target in targets {
            let name = scope.text(&target);
            self.with_module(scope, |module| {
                module.unbind(name);
            });
        }
    }

    fn lookup(&self, scope: &Scope, name: &str) -> Option<Binding> {
        self.loading
            .borrow()
            .get(scope.module)
            .and_then(|module| module.get(name).cloned())
    }

    fn bind(&self, scope: &Scope, name: &str, binding: Binding) {
        self.with_module(scope, |module| {
            module.bind(name, binding);
        });
    }

    fn with_module(&self, scope: &Scope, f: impl FnOnce(&mut Module)) {
        if let Some(module) = self.loading.borrow_mut().get_mut(scope.module) {
            f(module);
        }
    }
}

impl Loader for SourceLoader {
    fn load(&self, name: &str) -> Result<Arc<Module>> {
        if let Some(module) = self.loaded.borrow().get(name) {
            return Ok(Arc::clone(module));
        }

        // Import cycle: hand out what has been bound so far
        if let Some(partial) = self.loading.borrow().get(name) {
            return Ok(Arc::new(partial.clone()));
        }

        // A submodule import runs its parent package first
        if let Some((parent, _)) = name.rsplit_once('.') {
            if self.locate(parent).is_some() {
                self.load(parent)?;
                if let Some(module) = self.loaded.borrow().get(name) {
                    return Ok(Arc::clone(module));
                }
            }
        }

        let location = self
            .locate(name)
            .ok_or_else(|| RefgenError::import(name, format!("No module named '{}'", name)))?;

        tracing::debug!("Loading {} from {}", name, location.path.display());
        self.loading
            .borrow_mut()
            .insert(name.to_string(), Module::new(name));

        let outcome = self.execute_module(name, &location);
        let module = self.loading.borrow_mut().remove(name);

        outcome?;
        let module = Arc::new(module.unwrap_or_else(|| Module::new(name)));
        self.loaded
            .borrow_mut()
            .insert(name.to_string(), Arc::clone(&module));

        Ok(module)
    }
}

/// Reads a list or tuple of string literals, e.g. the value of `__all__`.
fn string_sequence(scope: &Scope, node: Node) -> Option<Vec<String>> {
    if !matches!(node.kind(), "list" | "tuple") {
        return None;
    }

    let mut cursor = node.walk();
    let items: Vec<Node> = node
        .named_children(&mut cursor)
        .filter(|item| item.kind() != "comment")
        .collect();
    items
        .iter()
        .map(|item| (item.kind() == "string").then(|| unquote(scope.text(item))))
        .collect()
}

fn unquote(literal: &str) -> String {
    literal
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// Exception names whose handlers catch a failed import.
const IMPORT_ERROR_TYPES: [&str; 4] = [
    "ImportError",
    "ModuleNotFoundError",
    "Exception",
    "BaseException",
];

/// True for a bare `except:` or one naming an import error type.
fn catches_import_error(scope: &Scope, clause: Node) -> bool {
    let mut cursor = clause.walk();
    let types: Vec<Node> = clause
        .named_children(&mut cursor)
        .filter(|child| !matches!(child.kind(), "block" | "comment"))
        .collect();
    types.is_empty() || types.into_iter().any(|node| names_import_error(scope, node))
}

fn names_import_error(scope: &Scope, node: Node) -> bool {
    if node.kind() == "identifier" {
        let name = scope.text(&node);
        return IMPORT_ERROR_TYPES.iter().any(|candidate| *candidate == name);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().any(|child| names_import_error(scope, child))
}

fn blocks_of(clause: Node) -> Vec<Node> {
    let mut cursor = clause.walk();
    let blocks: Vec<Node> = clause
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "block")
        .collect();
    blocks
}

fn collect_identifiers<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => out.push(child),
            "expression_list" | "tuple" | "list" | "parenthesized_expression" => {
                collect_identifiers(child, out)
            }
            _ => {}
        }
    }
}
