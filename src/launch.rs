use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    assembler::{self, FragmentFile},
    command::{self, EngineCommand},
    folder_structure::WorkDir,
    runner::{self, Executor},
    staging::{self, StagingPolicy},
};

// everything one launcher invocation needs, resolved from the cli and the launcher config
#[derive(Debug)]
pub struct LaunchPlan {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub work_dir: WorkDir,
    pub install_dir: PathBuf,
    pub workflow_binary: PathBuf,
    pub fragment_precedence: Vec<FragmentFile>,
    pub staging: StagingPolicy,
    pub dry_run: bool,
    pub unlock: bool,
}

impl LaunchPlan {
    // stage, write config.json and construct the engine command without running it
    pub fn prepare(&self) -> Result<EngineCommand> {
        staging::stage(&self.install_dir, &self.work_dir, self.staging)
            .context("failed to stage the workflow templates")?;

        let record = assembler::assemble(
            &self.input_dir,
            &self.output_dir,
            &self.work_dir,
            &self.work_dir.fragment_dir(),
            &self.fragment_precedence,
        )?;
        debug!(keys = ?record.keys().collect::<Vec<_>>(), "assembled workflow config");

        let config_path = self.work_dir.config_json();
        assembler::serialize(&record, &config_path)?;
        info!(
            "wrote workflow config with {} top-level keys to {}",
            record.len(),
            config_path.display()
        );

        let cluster_spec = self.work_dir.cluster_spec();
        if let Some(cluster_spec) = &cluster_spec {
            info!("submitting jobs with cluster spec {}", cluster_spec.display());
        }

        Ok(command::build_command(
            &self.workflow_binary,
            &self.output_dir,
            &self.work_dir.snakefile(),
            &config_path,
            cluster_spec.as_deref(),
            self.dry_run,
            self.unlock,
        ))
    }

    pub fn launch<E: Executor>(&self, executor: &E) -> Result<()> {
        let command = self.prepare()?;

        println!("{}", command.render());
        runner::run_engine(executor, &command)?;

        Ok(())
    }
}
