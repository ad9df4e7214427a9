use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anonpy_fetch::{NoProgress, ProgressReporter, ResourceClient};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use console::style;

use crate::cli::Ctx;
use crate::cli::app::{App, Commands};
use crate::settings::{CONFIG_FILE, LOG_FILE, Settings, root_dir};
use crate::ui::BarReporter;

mod cli;
mod logging;
mod settings;
mod ui;
mod utils;

fn main() -> ExitCode {
    let app = App::parse();
    let log_file = root_dir().map(|root| root.join(LOG_FILE)).ok();

    match run(app, log_file.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error, log_file.as_deref());
            ExitCode::FAILURE
        }
    }
}

fn run(app: App, log_file: Option<&Path>) -> Result<()> {
    let global = app.global;
    let config_path = match &global.config {
        Some(path) => path.clone(),
        None => root_dir()?.join(CONFIG_FILE),
    };

    if global.reset_config {
        Settings::init(&config_path)?;
        println!("Reset configuration at {}", style(config_path.display()).blue().bold());
        return Ok(());
    }

    let settings = Settings::load_or_init(&config_path)?;
    let effective = settings.resolve(&global)?;
    logging::init(&effective.log_level, log_file.filter(|_| effective.logging))?;

    let Some(cmd) = app.cmd else {
        App::command().print_help().context("Failed to print help")?;
        return Ok(());
    };

    let reporter: Arc<dyn ProgressReporter> = if effective.verbose {
        Arc::new(BarReporter::new())
    } else {
        Arc::new(NoProgress)
    };
    let client = ResourceClient::new(settings.session_config(&effective)?, settings.endpoint()?)
        .context("Failed to create HTTP client")?
        .with_reporter(reporter)
        .with_logging(effective.logging);

    let ctx = Ctx {
        client,
        settings: effective,
    };

    match cmd {
        Commands::Upload(args) => cli::upload::run(&ctx, &args),
        Commands::Preview(args) => cli::preview::run(&ctx, &args),
        Commands::Download(args) => cli::download::run(&ctx, &args),
    }
}

fn report(error: &anyhow::Error, log_file: Option<&Path>) {
    if let Some(anonpy_fetch::Error::HttpStatus { status, body }) = error.downcast_ref() {
        tracing::error!("Request failed with HTTP status code {status} ({body})");
        eprintln!("{}", style(body).red().bold());
        return;
    }

    tracing::error!("{error:#}");
    eprintln!("{} {error:#}", style("ERROR:").red().bold());
    if let Some(path) = log_file {
        eprintln!(
            "The log file may give you more insight into what went wrong: {}",
            style(path.display()).yellow().bold()
        );
    }
}
