mod assembler;
mod cli;
mod command;
mod config;
mod error;
mod folder_structure;
mod launch;
mod runner;
mod staging;

use std::{env, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Args, LogFormat};
use config::LauncherConfig;
use error::LaunchError;
use folder_structure::WorkDir;
use launch::LaunchPlan;
use runner::ProcessExecutor;
use staging::StagingPolicy;

fn init_tracing(args: &Args) {
    let filter = match args.verbose {
        0 => "mir_seek=info",
        1 => "mir_seek=debug",
        _ => "mir_seek=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match args.log_format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn default_install_dir() -> Result<PathBuf> {
    let executable = env::current_exe().context("could not locate the mir-seek executable")?;
    let install_dir = executable
        .parent()
        .context("the mir-seek executable has no parent directory")?;
    Ok(install_dir.to_path_buf())
}

fn plan_from(args: Args, config: LauncherConfig) -> Result<LaunchPlan> {
    // config.json paths are read by the engine from the output dir, so they have to be absolute
    let current_dir = env::current_dir().context("could not determine the working directory")?;
    let work_dir = match args.work_dir {
        Some(work_dir) => current_dir.join(work_dir),
        None => current_dir,
    };

    let install_dir = match args.install_dir.or(config.install_dir) {
        Some(install_dir) => install_dir,
        None => default_install_dir()?,
    };

    let staging = if args.refresh_staging {
        StagingPolicy::Refresh
    } else {
        config.staging
    };

    Ok(LaunchPlan {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        work_dir: WorkDir::new(work_dir),
        install_dir,
        workflow_binary: config.workflow_binary,
        fragment_precedence: config.fragment_precedence,
        staging,
        dry_run: args.dry_run,
        unlock: args.unlock,
    })
}

fn run(args: Args) -> Result<()> {
    let config = LauncherConfig::load(args.launcher_config.as_deref())?;
    let plan = plan_from(args, config)?;

    plan.launch(&ProcessExecutor)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // the engine already reported its own failure, only its exit code is forwarded
            match err.downcast_ref::<LaunchError>() {
                Some(launch_error)
                    if matches!(launch_error, LaunchError::ExternalProcessFailure { .. }) =>
                {
                    tracing::error!("{launch_error}");
                    ExitCode::from(launch_error.exit_code())
                }
                _ => {
                    eprintln!("Error: {err:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
