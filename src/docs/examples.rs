//! Cross-references from class stubs to the example scripts using them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use once_cell::sync::OnceCell;
use tree_sitter::{Query, QueryCursor, StreamingIterator};
use walkdir::WalkDir;

use crate::error::{RefgenError, Result};
use crate::loader::{ParsedSource, PythonParser};
use crate::walker::{PathClassifier, MODULE_SUFFIX};

use super::render::format_heading;

static IDENTIFIERS_QUERY: OnceCell<Query> = OnceCell::new();

pub const EXAMPLES_HEADING: &str = "Tutorials and examples using this";

/// Identifiers referenced by each example script.
#[derive(Debug, Default)]
pub struct ExampleIndex {
    /// Script path relative to the examples directory, `/`-separated and
    /// without suffix
    examples: BTreeMap<String, HashSet<String>>,
}

impl ExampleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every `.py` script below `dir`.
    pub fn scan(dir: &Path) -> Result<Self> {
        let parser = PythonParser::new();
        let mut index = Self::new();

        let entries = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || PathClassifier::is_visible_dir(&entry.file_name().to_string_lossy())
            });

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_script = entry.file_type().is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(MODULE_SUFFIX);
            if !is_script {
                continue;
            }

            let relative = path
                .strip_prefix(dir)
                .unwrap_or(path)
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");

            let parsed = parser.parse_file(path)?;
            index.insert_parsed(relative, &parsed)?;
        }

        tracing::debug!("Indexed {} example scripts in {}", index.len(), dir.display());
        Ok(index)
    }

    pub fn insert_source(&mut self, name: impl Into<String>, source: &str) -> Result<()> {
        let parsed = PythonParser::new().parse_source(source)?;
        self.insert_parsed(name.into(), &parsed)
    }

    fn insert_parsed(&mut self, name: String, parsed: &ParsedSource) -> Result<()> {
        let query = identifiers_query()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.root_node(), parsed.source_bytes());

        let mut identifiers = HashSet::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                identifiers.insert(parsed.node_text(&capture.node).to_string());
            }
        }

        self.examples.insert(name, identifiers);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Example scripts referencing `symbol`, in path order.
    pub fn examples_using(&self, symbol: &str) -> Vec<&str> {
        self.examples
            .iter()
            .filter(|(_, identifiers)| identifiers.contains(symbol))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Listing appended to a class stub; empty when no script uses it.
    pub fn render(&self, symbol: &str) -> String {
        let examples = self.examples_using(symbol);
        if examples.is_empty() {
            return String::new();
        }

        let mut text = format_heading(2, EXAMPLES_HEADING);
        for example in examples {
            text.push_str(&format!(
                "* Example :doc:`{} </examples/{}>`\n",
                example,
                example.replace('/', ".")
            ));
        }
        text.push('\n');
        text
    }
}

fn identifiers_query() -> Result<&'static Query> {
    IDENTIFIERS_QUERY.get_or_try_init(|| {
        Query::new(&PythonParser::new().language(), "(identifier) @name")
            .map_err(|e| RefgenError::Parse(format!("Invalid identifiers query: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_examples_using_symbol() {
        let mut index = ExampleIndex::new();
        index
            .insert_source("synapses/stdp", "from pkg import *\ns = Synapses(group)\n")
            .unwrap();
        index
            .insert_source("basic", "import pkg\ng = pkg.NeuronGroup(10)\n")
            .unwrap();

        assert_eq!(index.examples_using("NeuronGroup"), vec!["basic"]);
        assert_eq!(index.examples_using("Synapses"), vec!["synapses/stdp"]);
        assert!(index.examples_using("Missing").is_empty());
    }

    #[test]
    fn test_render_listing() {
        let mut index = ExampleIndex::new();
        index.insert_source("b/second", "Engine()\n").unwrap();
        index.insert_source("a_first", "x = Engine\n").unwrap();

        assert_eq!(
            index.render("Engine"),
            concat!(
                "Tutorials and examples using this\n",
                "---------------------------------\n\n",
                "* Example :doc:`a_first </examples/a_first>`\n",
                "* Example :doc:`b/second </examples/b.second>`\n",
                "\n",
            )
        );
        assert_eq!(index.render("Other"), "");
    }

    #[test]
    fn test_scan_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::create_dir_all(dir.join("advanced")).unwrap();
        fs::create_dir_all(dir.join(".hidden")).unwrap();
        fs::write(dir.join("intro.py"), "net = Network()\n").unwrap();
        fs::write(dir.join("advanced").join("tuned.py"), "Network().run()\n").unwrap();
        fs::write(dir.join(".hidden").join("skip.py"), "Network()\n").unwrap();
        fs::write(dir.join("notes.txt"), "Network").unwrap();

        let index = ExampleIndex::scan(dir).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.examples_using("Network"), vec!["advanced/tuned", "intro"]);
    }
}
