use std::{fs, io, path::Path, time::SystemTime};

use jiff::Timestamp;
use serde::Deserialize;
use strum::IntoEnumIterator;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    error::{LaunchError, Result},
    folder_structure::{StagedDir, WorkDir},
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagingPolicy {
    // an already staged directory is never touched
    #[default]
    KeepExisting,
    Refresh,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Copied,
    Refreshed,
    KeptExisting,
    MissingSource,
}

// symlinks are followed so linked reference data ends up as real copies in the work dir
fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn newest_modification(path: &Path) -> io::Result<SystemTime> {
    let mut newest = fs::metadata(path)?.modified()?;

    for entry in WalkDir::new(path).follow_links(true) {
        newest = newest.max(entry?.metadata()?.modified()?);
    }

    Ok(newest)
}

fn format_time(time: SystemTime) -> String {
    match Timestamp::try_from(time) {
        Ok(timestamp) => timestamp.strftime("%F %T").to_string(),
        Err(_) => "unknown time".to_string(),
    }
}

// a kept directory whose template changed since it was staged is reported, not replaced
fn warn_if_stale(source: &Path, destination: &Path) {
    let (Ok(template_time), Ok(staged_time)) = (
        newest_modification(source),
        newest_modification(destination),
    ) else {
        return;
    };

    if template_time > staged_time {
        warn!(
            "staged {} was last changed {} but its template changed {}, rerun with --refresh-staging to update it",
            destination.display(),
            format_time(staged_time),
            format_time(template_time),
        );
    }
}

pub fn stage_dir(source: &Path, destination: &Path, policy: StagingPolicy) -> Result<StageOutcome> {
    if !source.exists() {
        return Ok(StageOutcome::MissingSource);
    }

    let outcome = if destination.exists() {
        match policy {
            StagingPolicy::KeepExisting => {
                warn_if_stale(source, destination);
                return Ok(StageOutcome::KeptExisting);
            }
            StagingPolicy::Refresh => {
                fs::remove_dir_all(destination)
                    .map_err(|err| LaunchError::staging(destination, err))?;
                StageOutcome::Refreshed
            }
        }
    } else {
        StageOutcome::Copied
    };

    copy_dir_recursive(source, destination).map_err(|err| LaunchError::staging(destination, err))?;

    Ok(outcome)
}

pub fn stage(install_dir: &Path, work_dir: &WorkDir, policy: StagingPolicy) -> Result<()> {
    for dir in StagedDir::iter() {
        let mut source = install_dir.to_path_buf();
        source.push(dir.to_string());
        let destination = work_dir.staged_dir(dir);

        match stage_dir(&source, &destination, policy)? {
            StageOutcome::Copied => info!("staged {} into {}", dir, destination.display()),
            StageOutcome::Refreshed => info!("refreshed {} in {}", dir, destination.display()),
            StageOutcome::KeptExisting => info!("using existing {}", destination.display()),
            StageOutcome::MissingSource => {
                info!("no {} template in {}, skipping", dir, install_dir.display())
            }
        }
    }

    Ok(())
}
