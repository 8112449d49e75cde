use std::path::Path;

use crate::error::{RefgenError, Result};

/// Tree-sitter parser for Python sources.
pub struct PythonParser;

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    pub fn language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedSource> {
        let source = std::fs::read_to_string(path)?;
        self.parse_source(&source)
    }

    pub fn parse_source(&self, source: &str) -> Result<ParsedSource> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language())
            .map_err(|e| RefgenError::Parse(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| RefgenError::Parse("Failed to parse source".to_string()))?;

        Ok(ParsedSource {
            tree,
            source: source.to_string(),
        })
    }
}

pub struct ParsedSource {
    pub tree: tree_sitter::Tree,
    pub source: String,
}

impl ParsedSource {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }

    pub fn has_syntax_error(&self) -> bool {
        self.root_node().has_error()
    }
}
