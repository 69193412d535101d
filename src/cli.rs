use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Stage the miRNA quantification workflow into a working directory and launch it
/// with Snakemake, optionally submitting jobs to a SLURM cluster.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Directory with the raw single-end reads.
    pub input_dir: PathBuf,

    /// Directory the analysis results are written to.
    pub output_dir: PathBuf,

    /// Only show what the workflow engine would do.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Remove a stale lock left in the output directory by an interrupted run.
    #[arg(short, long)]
    pub unlock: bool,

    /// Working directory to stage into. Defaults to the current directory.
    #[arg(short, long)]
    pub work_dir: Option<PathBuf>,

    /// Location of the config, workflow and database templates.
    /// Defaults to the directory of this executable.
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// TOML file with launcher settings.
    #[arg(long)]
    pub launcher_config: Option<PathBuf>,

    /// Copy the templates again even if they were staged before.
    #[arg(long)]
    pub refresh_staging: bool,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn positional_dirs_and_switches() {
        let args = Args::try_parse_from(["mir-seek", "/data/in", "/data/out", "-d", "-u"]).unwrap();
        assert_eq!(args.input_dir, PathBuf::from("/data/in"));
        assert_eq!(args.output_dir, PathBuf::from("/data/out"));
        assert!(args.dry_run);
        assert!(args.unlock);
        assert!(!args.refresh_staging);
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn long_flags() {
        let args = Args::try_parse_from([
            "mir-seek",
            "in",
            "out",
            "--dry-run",
            "--work-dir",
            "/scratch/run1",
            "--refresh-staging",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(args.dry_run);
        assert!(!args.unlock);
        assert_eq!(args.work_dir, Some(PathBuf::from("/scratch/run1")));
        assert!(args.refresh_staging);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn output_dir_is_required() {
        assert!(Args::try_parse_from(["mir-seek", "/data/in"]).is_err());
    }
}
