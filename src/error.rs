use std::path::PathBuf;

// every failure the launcher can hit before or while handing off to the workflow engine
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("malformed config fragment {path:?}: {reason}")]
    MalformedFragment { path: PathBuf, reason: String },

    #[error("fragment directory {path:?} is unavailable: {source}")]
    FragmentDirectoryUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not stage {path:?}: {source}")]
    Staging {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not read launcher config {path:?}: {reason}")]
    LauncherConfig { path: PathBuf, reason: String },

    #[error("could not start {program}: {source}")]
    EngineSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited unsuccessfully ({})", describe_exit(.code))]
    ExternalProcessFailure { program: String, code: Option<i32> },
}

pub type Result<T> = std::result::Result<T, LaunchError>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl LaunchError {
    pub fn malformed_fragment(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedFragment {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }

    // the exit code the launcher itself should terminate with
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ExternalProcessFailure {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}
