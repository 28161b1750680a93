//! `upright` - stands in for an upload pipeline: every file named on the
//! command line is auto-oriented and optimized in place.

mod cli;
mod report;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use upright_core::{check_dependencies, Config, Upload, UploadProcessor};

use crate::cli::{Cli, Command, ProcessArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = Config::discover(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Process(args) => process(config, args),
        Command::Check => Ok(check(config)),
    }
}

fn process(mut config: Config, args: ProcessArgs) -> anyhow::Result<ExitCode> {
    if let Some(quality) = args.quality {
        config.set_jpeg_quality(quality);
    }
    if args.no_orient {
        config.auto_orient = false;
    }
    if args.no_optimize {
        config.optimize = false;
    }

    if config.optimize {
        for missing in check_dependencies(&config) {
            tracing::warn!("{missing}; files of that type will not be optimized");
        }
    }

    let uploads: Vec<Upload> = args
        .files
        .into_iter()
        .map(|path| match &args.mime {
            Some(mime) => Upload::new(path, mime.as_str()),
            None => Upload::from_path(path),
        })
        .collect();

    let processor = UploadProcessor::new(&config);
    let results = processor.process_all(&uploads);

    let failed = report::write_results(&mut std::io::stdout().lock(), &uploads, &results)
        .context("cannot write report")?;

    if failed > 0 {
        tracing::error!(failed, total = uploads.len(), "Some uploads could not be written");
    }
    Ok(ExitCode::from(exit_status(failed)))
}

/// 1 if any upload could not be written back.
fn exit_status(failed: usize) -> u8 {
    u8::from(failed > 0)
}

fn check(mut config: Config) -> ExitCode {
    // An explicit check always probes, whatever the config toggle says
    config.check_dependencies = true;
    let missing = check_dependencies(&config);

    if missing.is_empty() {
        println!("All optimizers found");
        ExitCode::SUCCESS
    } else {
        for tool in &missing {
            println!("{tool}");
        }
        ExitCode::FAILURE
    }
}
