//! `docmerge` - fills Word templates with one row per client

mod args;
mod generate;

use args::{CliArguments, Commands, InitConfigArgs, SheetsArgs};
use clap::Parser;
use store::{MergeSettings, SettingsManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Values from .env become defaults for the env-backed arguments
    dotenvy::dotenv().ok();
    let args = CliArguments::parse();

    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match args.command {
        Commands::Generate(generate) => generate::run(generate),
        Commands::InitConfig(init) => init_config(init),
        Commands::Sheets(sheets) => list_sheets(sheets),
    }
}

fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to replace it)", args.path.display());
    }
    let mut manager = SettingsManager::new(&args.path);
    manager.update_sync(MergeSettings::default())?;
    tracing::info!(path = %args.path.display(), "wrote default settings");
    Ok(())
}

fn list_sheets(args: SheetsArgs) -> anyhow::Result<()> {
    for name in mail_merge::get_sheet_names(&args.workbook)? {
        println!("{}", name);
    }
    Ok(())
}
