use std::path::{Path, PathBuf};

use strum::{Display, EnumIter, IntoEnumIterator};

pub const CONFIG_JSON_FILE_NAME: &str = "config.json";
pub const SNAKEFILE_NAME: &str = "Snakefile";
pub const CLUSTER_SPEC_FILE_NAME: &str = "cluster.json";

// directories shipped next to the launcher and copied into every working directory
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StagedDir {
    Config,
    Workflow,
    Database,
}

// reference datasets expected under the staged database directory
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceFile {
    Adapters,
    #[strum(serialize = "hg38_index")]
    Hg38Index,
    #[strum(serialize = "hg38_fasta")]
    Hg38Fasta,
    Mature,
    Hairpin,
}

impl ReferenceFile {
    fn relative_path(&self) -> &'static str {
        match self {
            Self::Adapters => "database/TruSeq_and_nextera_adapters_20210423.fa",
            Self::Hg38Index => "database/hg38_genome_processed_bowtie_index",
            Self::Hg38Fasta => "database/Homo_sapiens_assembly38_whitespace_removed_asterisk_tab_replaced_probLet_removed.fasta",
            Self::Mature => "database/mature.fa",
            Self::Hairpin => "database/hairpin_probLet_removed.fa",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn get(&self) -> &Path {
        &self.root
    }

    pub fn staged_dir(&self, dir: StagedDir) -> PathBuf {
        let mut path = self.root.clone();
        path.push(dir.to_string());
        path
    }

    pub fn fragment_dir(&self) -> PathBuf {
        self.staged_dir(StagedDir::Config)
    }

    pub fn config_json(&self) -> PathBuf {
        let mut path = self.root.clone();
        path.push(CONFIG_JSON_FILE_NAME);
        path
    }

    pub fn snakefile(&self) -> PathBuf {
        let mut path = self.staged_dir(StagedDir::Workflow);
        path.push(SNAKEFILE_NAME);
        path
    }

    // only Some if the staged config directory actually carries a cluster spec
    pub fn cluster_spec(&self) -> Option<PathBuf> {
        let mut path = self.fragment_dir();
        path.push(CLUSTER_SPEC_FILE_NAME);
        path.is_file().then_some(path)
    }

    pub fn reference(&self, reference: ReferenceFile) -> PathBuf {
        self.root.join(reference.relative_path())
    }

    pub fn references(&self) -> impl Iterator<Item = (ReferenceFile, PathBuf)> + '_ {
        ReferenceFile::iter().map(|reference| (reference, self.reference(reference)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_below_root() {
        let work_dir = WorkDir::new("/work");
        assert_eq!(work_dir.fragment_dir(), PathBuf::from("/work/config"));
        assert_eq!(work_dir.config_json(), PathBuf::from("/work/config.json"));
        assert_eq!(
            work_dir.snakefile(),
            PathBuf::from("/work/workflow/Snakefile")
        );
        assert_eq!(
            work_dir.staged_dir(StagedDir::Database),
            PathBuf::from("/work/database")
        );
    }

    #[test]
    fn reference_keys_and_paths() {
        let work_dir = WorkDir::new("/work");
        let references: Vec<_> = work_dir
            .references()
            .map(|(reference, path)| (reference.to_string(), path))
            .collect();

        let keys: Vec<_> = references.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            ["adapters", "hg38_index", "hg38_fasta", "mature", "hairpin"]
        );
        assert_eq!(
            references[0].1,
            PathBuf::from("/work/database/TruSeq_and_nextera_adapters_20210423.fa")
        );
        assert_eq!(
            references[4].1,
            PathBuf::from("/work/database/hairpin_probLet_removed.fa")
        );
    }

    #[test]
    fn cluster_spec_must_be_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::new(tmp.path());
        std::fs::create_dir_all(work_dir.fragment_dir().join("cluster.json")).unwrap();

        assert!(work_dir.cluster_spec().is_none());
    }

    #[test]
    fn cluster_spec_only_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::new(tmp.path());
        assert!(work_dir.cluster_spec().is_none());

        std::fs::create_dir_all(work_dir.fragment_dir()).unwrap();
        std::fs::write(work_dir.fragment_dir().join("cluster.json"), "{}").unwrap();
        assert_eq!(
            work_dir.cluster_spec(),
            Some(tmp.path().join("config").join("cluster.json"))
        );
    }
}
