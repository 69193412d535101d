//! Builds the configuration document handed to the workflow engine.
//!
//! The record starts from the run paths and the reference datasets under the
//! working directory, then takes the top-level keys of every allow-listed
//! fragment found in the fragment directory.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, warn};

use crate::{
    error::{LaunchError, Result},
    folder_structure::WorkDir,
};

pub const PATH_RAW_READS: &str = "path_raw_reads";
pub const PATH_ANALYSIS: &str = "path_analysis";
pub const PATH_ROOT: &str = "path_root";
pub const REFERENCES: &str = "references";

// the only files of the fragment directory that are merged into the record
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize)]
pub enum FragmentFile {
    #[strum(serialize = "cluster.json")]
    #[serde(rename = "cluster.json")]
    Cluster,
    #[strum(serialize = "modules.json")]
    #[serde(rename = "modules.json")]
    Modules,
}

impl FragmentFile {
    pub fn default_precedence() -> Vec<FragmentFile> {
        FragmentFile::iter().collect()
    }
}

// fragments left out of the precedence list are merged first, in default order
fn merge_order(precedence: &[FragmentFile]) -> Vec<FragmentFile> {
    let mut order: Vec<_> = FragmentFile::iter()
        .filter(|fragment| !precedence.contains(fragment))
        .collect();

    for fragment in precedence {
        if !order.contains(fragment) {
            order.push(*fragment);
        }
    }

    order
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationRecord {
    entries: Map<String, Value>,
}

impl ConfigurationRecord {
    fn fixed_entries(input_dir: &Path, output_dir: &Path, work_dir: &WorkDir) -> Map<String, Value> {
        let references: Map<String, Value> = work_dir
            .references()
            .map(|(reference, path)| (reference.to_string(), path_value(&path)))
            .collect();

        let mut entries = Map::new();
        entries.insert(PATH_RAW_READS.to_string(), path_value(input_dir));
        entries.insert(PATH_ANALYSIS.to_string(), path_value(output_dir));
        entries.insert(PATH_ROOT.to_string(), path_value(work_dir.get()));
        entries.insert(REFERENCES.to_string(), Value::Object(references));
        entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn merge(&mut self, fragment: Map<String, Value>) {
        for (key, value) in fragment {
            self.entries.insert(key, value);
        }
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn read_fragment(path: &Path) -> Result<Map<String, Value>> {
    let fragment_str =
        fs::read_to_string(path).map_err(|err| LaunchError::malformed_fragment(path, err))?;
    let fragment: Value = serde_json::from_str(&fragment_str)
        .map_err(|err| LaunchError::malformed_fragment(path, err))?;

    match fragment {
        Value::Object(map) => Ok(map),
        _ => Err(LaunchError::malformed_fragment(
            path,
            "top level is not a JSON object",
        )),
    }
}

fn discover_fragments(fragment_dir: &Path) -> Result<HashMap<FragmentFile, PathBuf>> {
    let unavailable = |source| LaunchError::FragmentDirectoryUnavailable {
        path: fragment_dir.to_path_buf(),
        source,
    };

    let mut discovered = HashMap::new();
    for entry in fs::read_dir(fragment_dir).map_err(unavailable)? {
        let entry = entry.map_err(unavailable)?;
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name();

        let Some(fragment) = file_name
            .to_str()
            .and_then(|name| name.parse::<FragmentFile>().ok())
        else {
            continue;
        };

        discovered.insert(fragment, entry.path());
    }

    Ok(discovered)
}

pub fn assemble(
    input_dir: &Path,
    output_dir: &Path,
    work_dir: &WorkDir,
    fragment_dir: &Path,
    precedence: &[FragmentFile],
) -> Result<ConfigurationRecord> {
    let fixed = ConfigurationRecord::fixed_entries(input_dir, output_dir, work_dir);
    let discovered = discover_fragments(fragment_dir)?;

    let mut record = ConfigurationRecord {
        entries: fixed.clone(),
    };

    for fragment in merge_order(precedence) {
        if let Some(path) = discovered.get(&fragment) {
            let entries = read_fragment(path)?;
            debug!(fragment = %fragment, keys = entries.len(), "merging config fragment");
            record.merge(entries);
        }
    }

    // fragments may not shadow the run paths or the reference datasets
    for (key, value) in fixed {
        if record.entries.get(&key) != Some(&value) {
            warn!(key = %key, "config fragment overrides a fixed key, keeping the launcher value");
        }
        record.entries.insert(key, value);
    }

    Ok(record)
}

pub fn serialize(record: &ConfigurationRecord, destination: &Path) -> Result<()> {
    let write_error = |source| LaunchError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let mut record_str =
        serde_json::to_string_pretty(record).map_err(|err| write_error(err.into()))?;
    record_str.push('\n');

    fs::write(destination, record_str).map_err(write_error)
}
