use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use refgen::config::{GeneratorConfig, CONFIG_FILENAME};
use refgen::error::Result;
use refgen::generator::Generator;
use refgen::symbols::{ImportResolver, SymbolClassifier, SymbolKind};

#[derive(Parser)]
#[command(name = "refgen")]
#[command(about = "Generate API reference stubs for a Python package tree")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Document the package in ./mypkg into ./reference
    refgen generate mypkg -o reference

    # Skip test directories and conftest files
    refgen generate mypkg --exclude-dir tests --exclude-file conftest.py

    # List the packages that would be documented
    refgen packages mypkg --format json

    # Show the documented members of one module
    refgen members mypkg.core --root mypkg

    # Print the shortest import path of a symbol
    refgen shortest mypkg.core.engine Engine --root mypkg
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./refgen.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write package pages and symbol stubs
    Generate {
        /// Root of the package tree
        root: Option<PathBuf>,

        /// Output directory
        #[arg(short = 'o', long = "output")]
        destination: Option<PathBuf>,

        /// Directory to skip, with its subtree (repeatable)
        #[arg(long = "exclude-dir")]
        exclude_dirs: Vec<String>,

        /// Module file name or glob pattern to skip (repeatable)
        #[arg(long = "exclude-file")]
        exclude_files: Vec<String>,

        /// Extension of generated files
        #[arg(long)]
        suffix: Option<String>,

        /// Directory of example scripts linked from class stubs
        #[arg(long)]
        examples: Option<PathBuf>,
    },

    /// List the packages that would be documented
    Packages {
        /// Root of the package tree
        root: Option<PathBuf>,

        /// Directory to skip, with its subtree (repeatable)
        #[arg(long = "exclude-dir")]
        exclude_dirs: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the documented members of a module
    Members {
        /// Dotted module name
        module: String,

        /// Root of the package tree
        #[arg(long)]
        root: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print the shortest import path of a symbol
    Shortest {
        /// Dotted module defining the symbol
        module: String,

        /// Symbol name
        symbol: String,

        /// Root of the package tree
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Loads the explicit config file, or `refgen.toml` from the working
/// directory if one exists.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path),
        None => {
            let default = Path::new(CONFIG_FILENAME);
            if default.is_file() {
                GeneratorConfig::load(default)
            } else {
                Ok(GeneratorConfig::default())
            }
        }
    }
}

pub struct GenerateArgs {
    pub root: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub suffix: Option<String>,
    pub examples: Option<PathBuf>,
}

impl GenerateArgs {
    /// Flags given on the command line replace the matching config values.
    pub fn apply(self, mut config: GeneratorConfig) -> Result<GeneratorConfig> {
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(destination) = self.destination {
            config.destination = destination;
        }
        if !self.exclude_dirs.is_empty() {
            config.exclude_dirs = self.exclude_dirs;
        }
        if !self.exclude_files.is_empty() {
            config.exclude_files = self.exclude_files;
        }
        if let Some(suffix) = self.suffix {
            config.suffix = suffix;
        }
        if let Some(examples) = self.examples {
            config.examples_dir = Some(examples);
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn generate(config: GeneratorConfig) -> Result<()> {
    let generator = Generator::new(config);
    let loader = generator.loader()?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let result = generator.run_with(&loader, |package, progress| {
        bar.set_length(progress.packages_total() as u64);
        bar.set_position(progress.packages_done() as u64);
        bar.set_message(package.name.clone());
    });
    bar.finish_and_clear();
    let stats = result?;

    println!(
        "Documented {} packages, {} symbol stubs ({} files) in {}ms",
        stats.package_pages,
        stats.symbol_stubs,
        stats.files_written(),
        stats.elapsed_ms
    );
    Ok(())
}

pub fn list_packages(config: GeneratorConfig, format: &str) -> Result<()> {
    let packages = Generator::new(config).packages()?;

    if format == "json" {
        let output = serde_json::to_string_pretty(&packages).unwrap_or_default();
        println!("{}", output);
        return Ok(());
    }

    println!("Found {} packages:", packages.len());
    for package in &packages {
        println!(
            "  {} ({} modules, {} subpackages)",
            package.name,
            package.modules.len(),
            package.subpackages.len()
        );
    }
    Ok(())
}

pub fn show_members(config: GeneratorConfig, module: &str, format: &str) -> Result<()> {
    let loader = Generator::new(config).loader()?;
    let members = SymbolClassifier::new(&loader).members(module)?;

    if format == "json" {
        let output = serde_json::to_string_pretty(&members).unwrap_or_default();
        println!("{}", output);
        return Ok(());
    }

    if members.is_empty() {
        println!("No documented members in {}", module);
        return Ok(());
    }

    for kind in SymbolKind::ALL {
        let names = members.of_kind(kind);
        if names.is_empty() {
            continue;
        }
        println!("{}:", kind.group_title());
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}

pub fn show_shortest(config: GeneratorConfig, module: &str, symbol: &str) -> Result<()> {
    let loader = Generator::new(config).loader()?;
    let path = ImportResolver::new(&loader).find_shortest(module, symbol)?;
    println!("from {} import {}", path, symbol);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GenerateArgs {
        GenerateArgs {
            root: None,
            destination: None,
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            suffix: None,
            examples: None,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = GeneratorConfig::new("pkg", "docs");
        config.exclude_dirs = vec!["tests".to_string()];

        let mut flags = args();
        flags.destination = Some(PathBuf::from("out"));
        flags.exclude_dirs = vec!["sandbox".to_string()];
        flags.suffix = Some("txt".to_string());

        let config = flags.apply(config).unwrap();
        assert_eq!(config.root, PathBuf::from("pkg"));
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.exclude_dirs, vec!["sandbox"]);
        assert_eq!(config.suffix, "txt");
    }

    #[test]
    fn test_invalid_suffix_flag() {
        let mut flags = args();
        flags.suffix = Some(String::new());
        assert!(flags.apply(GeneratorConfig::default()).is_err());
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "refgen",
            "generate",
            "mypkg",
            "-o",
            "out",
            "--exclude-dir",
            "tests",
            "--exclude-dir",
            "docs",
        ]);
        match cli.command {
            Commands::Generate {
                root,
                destination,
                exclude_dirs,
                ..
            } => {
                assert_eq!(root, Some(PathBuf::from("mypkg")));
                assert_eq!(destination, Some(PathBuf::from("out")));
                assert_eq!(exclude_dirs, vec!["tests", "docs"]);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["refgen", "shortest", "a.b", "C", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
