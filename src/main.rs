//! threedqc - Quality check for 3D commerce assets
//!
//! Loads a model (plus optional product info and schema), runs the glTF validator against the
//! schema and writes the report as JSON and CSV.

mod cli;
mod commands;
mod output;
mod preview;
mod settings;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use threedqc_gltf::GltfValidator;
use threedqc_session::Session;

use crate::cli::{Cli, Command};
use crate::settings::AppSettings;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().or_else(AppSettings::default_path);
    let loaded = settings_path.as_deref().map(AppSettings::load_from);
    let settings = match &loaded {
        Some(Ok(settings)) => settings.clone(),
        _ => AppSettings::default(),
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&settings.logging.level));
    match loaded {
        Some(Err(e)) => warn!("{:#}, using defaults", e),
        None => warn!("Could not determine config directory"),
        Some(Ok(_)) => {}
    }

    match cli.command {
        Command::Check(args) => {
            let json = args.json;
            let outcome = commands::check(args, &settings).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            } else {
                print!("{}", outcome.summary.render_table());
                for path in &outcome.written {
                    println!("Wrote {}", path.display());
                }
            }
            Ok(if outcome.summary.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Schema(args) => {
            let path = commands::schema(args, &settings).await?;
            println!("Wrote {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => {
            let session = Session::new(GltfValidator::new());
            println!("threedqc {}", env!("CARGO_PKG_VERSION"));
            println!("validator: {}", session.version());
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings { write } => {
            print!("{}", settings.to_toml()?);
            if write {
                let path = settings_path.context("Could not determine config directory")?;
                settings.save_to(&path)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
