mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, GenerateArgs};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            root,
            destination,
            exclude_dirs,
            exclude_files,
            suffix,
            examples,
        } => {
            let config = GenerateArgs {
                root,
                destination,
                exclude_dirs,
                exclude_files,
                suffix,
                examples,
            }
            .apply(config)?;
            cli::generate(config)?;
        }
        Commands::Packages {
            root,
            exclude_dirs,
            format,
        } => {
            let config = GenerateArgs {
                root,
                destination: None,
                exclude_dirs,
                exclude_files: Vec::new(),
                suffix: None,
                examples: None,
            }
            .apply(config)?;
            cli::list_packages(config, &format)?;
        }
        Commands::Members {
            module,
            root,
            format,
        } => {
            let mut config = config;
            if let Some(root) = root {
                config.root = root;
            }
            cli::show_members(config, &module, &format)?;
        }
        Commands::Shortest {
            module,
            symbol,
            root,
        } => {
            let mut config = config;
            if let Some(root) = root {
                config.root = root;
            }
            cli::show_shortest(config, &module, &symbol)?;
        }
    }

    Ok(())
}
