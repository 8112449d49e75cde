//! Text templates for package pages and symbol stubs.
//!
//! The exact layout (underline characters, directive names, four-space
//! option indentation) is what the downstream renderer parses.

use crate::symbols::{ModuleMembers, SymbolKind};

/// Underline characters for heading levels 1, 2 and 3.
pub const HEADING_UNDERLINES: [char; 3] = ['=', '-', '~'];

pub const DEFAULT_AUTOMODULE_OPTIONS: [&str; 1] = ["show-inheritance"];

/// Creates a heading of `level` (1, 2 or 3).
pub fn format_heading(level: usize, text: &str) -> String {
    let underline = HEADING_UNDERLINES[level.clamp(1, HEADING_UNDERLINES.len()) - 1];
    let underline: String = std::iter::repeat(underline)
        .take(text.chars().count())
        .collect();
    format!("{}\n{}\n\n", text, underline)
}

pub fn format_automodule<S: AsRef<str>>(module: &str, options: &[S]) -> String {
    let mut text = format!(".. automodule:: {}\n", module);
    for option in options {
        text.push_str(&format!("    :{}:\n", option.as_ref()));
    }
    text.push('\n');
    text
}

pub fn format_member_group(kind: SymbolKind, names: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }

    let mut text = format!("**{}**\n\n", kind.group_title());
    for name in names {
        text.push_str(&format!(".. autosummary:: {}\n", name));
        text.push_str("    :toctree:\n\n");
    }
    text
}

/// One module's section of a package page. `heading` is `None` for the
/// package marker, whose content belongs directly under the page title.
pub fn format_module_section<S: AsRef<str>>(
    heading: Option<&str>,
    members: &ModuleMembers,
    options: &[S],
) -> String {
    let mut text = String::new();
    if let Some(stem) = heading {
        text.push_str(&format_heading(2, &format!(":mod:`{}` module", stem)));
    }
    text.push_str(&format_automodule(&members.module, options));
    for kind in SymbolKind::ALL {
        text.push_str(&format_member_group(kind, members.of_kind(kind)));
    }
    text.push('\n');
    text
}

pub fn format_subpackages(package: &str, subpackages: &[String]) -> String {
    if subpackages.is_empty() {
        return String::new();
    }

    let mut text = format_heading(2, "Subpackages");
    text.push_str(".. toctree::\n");
    text.push_str("    :maxdepth: 2\n\n");
    for sub in subpackages {
        text.push_str(&format!("    {}.{}\n", package, sub));
    }
    text.push('\n');
    text
}

pub fn format_import_hint(path: &str, name: &str) -> String {
    format!("(*Shortest import*: ``from {} import {})``\n\n", path, name)
}

/// Stub page for one symbol. `examples` is appended after class directives.
pub fn format_symbol(
    module: &str,
    name: &str,
    kind: SymbolKind,
    shortest_import: &str,
    examples: &str,
) -> String {
    let mut text = format!(".. currentmodule:: {}\n\n", module);
    text.push_str(&format_heading(1, &format!("{} {}", name, kind.as_str())));
    text.push_str(&format_import_hint(shortest_import, name));
    text.push_str(&format!(".. {}:: {}\n", kind.directive(), name));

    match kind {
        SymbolKind::Class => {
            text.push('\n');
            text.push_str(examples);
        }
        SymbolKind::Function => text.push('\n'),
        SymbolKind::Object => {}
    }

    text
}
