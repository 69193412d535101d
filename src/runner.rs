use crate::{
    command::EngineCommand,
    error::{LaunchError, Result},
};

// the workflow engine is opaque to the launcher: it only gets a command and hands back an exit code
pub trait Executor {
    fn run(&self, command: &EngineCommand) -> Result<Option<i32>>;
}

// runs the engine as a child process that shares the launcher's stdio
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn run(&self, command: &EngineCommand) -> Result<Option<i32>> {
        let status = command
            .to_command()
            .status()
            .map_err(|source| LaunchError::EngineSpawn {
                program: command.program().to_string_lossy().into_owned(),
                source,
            })?;

        Ok(status.code())
    }
}

pub fn run_engine<E: Executor>(executor: &E, command: &EngineCommand) -> Result<()> {
    let code = executor.run(command)?;

    if code != Some(0) {
        return Err(LaunchError::ExternalProcessFailure {
            program: command.program().to_string_lossy().into_owned(),
            code,
        });
    }

    Ok(())
}
