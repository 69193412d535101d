use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    assembler::FragmentFile,
    error::{LaunchError, Result},
    staging::StagingPolicy,
};

// optional launcher settings read from a toml file.
// these rarely change between runs of the same installation and therefore
// don't need to be passed in every cli invocation
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherConfig {
    #[serde(default = "default_workflow_binary")]
    pub workflow_binary: PathBuf,
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    // merge order of the config fragments, the last one wins on key collisions
    #[serde(default = "FragmentFile::default_precedence")]
    pub fragment_precedence: Vec<FragmentFile>,
    #[serde(default)]
    pub staging: StagingPolicy,
}

fn default_workflow_binary() -> PathBuf {
    PathBuf::from("snakemake")
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            workflow_binary: default_workflow_binary(),
            install_dir: None,
            fragment_precedence: FragmentFile::default_precedence(),
            staging: StagingPolicy::default(),
        }
    }
}

impl LauncherConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_error = |reason: String| LaunchError::LauncherConfig {
            path: path.to_path_buf(),
            reason,
        };

        let config_file_str = fs::read_to_string(path).map_err(|err| config_error(err.to_string()))?;
        toml::from_str(&config_file_str).map_err(|err| config_error(err.to_string()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
