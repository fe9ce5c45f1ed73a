//! Credit scorer entry point.

use clap::Parser;
use credit_scorer::cli::{cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_scorer=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data_dir,
            model,
            seed,
        } => {
            cmd_train(&data_dir, &model, seed)?;
        }
        Commands::Predict {
            data_dir,
            model,
            out,
        } => {
            cmd_predict(&data_dir, &model, &out)?;
        }
    }

    Ok(())
}
