use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Command,
};

// placeholders are resolved per job by the workflow engine, never by the launcher
pub const CLUSTER_SUBMIT_TEMPLATE: &str = "sbatch --gres {cluster.gres} --cpus-per-task {cluster.threads} -t {cluster.time} --mem {cluster.mem} --job-name={params.rname}";

pub const MAX_CLUSTER_JOBS: u32 = 500;

// an engine invocation as discrete tokens, rendered to a shell line only for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl EngineCommand {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    pub fn render(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.get_args())
            .map(|token| {
                let token = token.to_string_lossy();
                // tokens carrying a nul byte cannot be quoted, show them as is
                match shlex::try_quote(&token) {
                    Ok(quoted) => quoted.into_owned(),
                    Err(_) => token.into_owned(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn add_cluster_args(command: &mut EngineCommand, cluster_spec: &Path) {
    command
        .arg("--cluster-config")
        .arg(cluster_spec)
        .arg("--cluster")
        .arg(CLUSTER_SUBMIT_TEMPLATE)
        .arg("-j")
        .arg(MAX_CLUSTER_JOBS.to_string());
}

pub fn build_command(
    workflow_binary: &Path,
    output_dir: &Path,
    snakefile: &Path,
    config_path: &Path,
    cluster_spec: Option<&Path>,
    dry_run: bool,
    unlock: bool,
) -> EngineCommand {
    let mut command = EngineCommand::new(workflow_binary);
    command
        .arg("--directory")
        .arg(output_dir)
        .arg("--snakefile")
        .arg(snakefile)
        .arg("--configfile")
        .arg(config_path)
        .args(["--use-envmodules", "--rerun-incomplete", "--cores", "all"]);

    if let Some(cluster_spec) = cluster_spec {
        add_cluster_args(&mut command, cluster_spec);
    }

    if dry_run {
        command.arg("--dryrun");
    }

    if unlock {
        command.arg("--unlock");
    }

    command
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(command: &EngineCommand) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn build(cluster_spec: Option<&Path>, dry_run: bool, unlock: bool) -> EngineCommand {
        build_command(
            Path::new("snakemake"),
            Path::new("/data/out"),
            Path::new("/work/workflow/Snakefile"),
            Path::new("/work/config.json"),
            cluster_spec,
            dry_run,
            unlock,
        )
    }

    #[test]
    fn base_invocation() {
        let command = build(None, false, false);

        assert_eq!(command.program(), "snakemake");
        assert_eq!(
            tokens(&command),
            [
                "--directory",
                "/data/out",
                "--snakefile",
                "/work/workflow/Snakefile",
                "--configfile",
                "/work/config.json",
                "--use-envmodules",
                "--rerun-incomplete",
                "--cores",
                "all",
            ]
        );

        for absent in ["--cluster-config", "--cluster", "--dryrun", "--unlock", "-j"] {
            assert!(!tokens(&command).iter().any(|token| token == absent));
        }
        assert!(command.render().contains("--cores all"));
    }

    #[test]
    fn cluster_invocation_keeps_placeholders() {
        let command = build(Some(Path::new("/work/config/cluster.json")), false, false);
        let tokens = tokens(&command);

        let position = tokens
            .iter()
            .position(|token| token == "--cluster-config")
            .unwrap();
        assert_eq!(tokens[position + 1], "/work/config/cluster.json");

        let template = &tokens[tokens.iter().position(|token| token == "--cluster").unwrap() + 1];
        for placeholder in [
            "{cluster.gres}",
            "{cluster.threads}",
            "{cluster.time}",
            "{cluster.mem}",
            "{params.rname}",
        ] {
            assert!(template.contains(placeholder), "missing {placeholder}");
        }

        assert_eq!(tokens[tokens.len() - 2..], ["-j", "500"]);
    }

    #[test]
    fn dry_run_and_unlock_in_both_shapes() {
        for cluster_spec in [None, Some(Path::new("/work/config/cluster.json"))] {
            let command = build(cluster_spec, true, true);
            let tokens = tokens(&command);
            assert_eq!(tokens[tokens.len() - 2..], ["--dryrun", "--unlock"]);

            let only_unlock = build(cluster_spec, false, true);
            assert!(!self::tokens(&only_unlock).contains(&"--dryrun".to_string()));
            assert_eq!(self::tokens(&only_unlock).last().unwrap(), "--unlock");
        }
    }

    #[test]
    fn render_quotes_template_and_odd_paths() {
        let command = build_command(
            Path::new("snakemake"),
            Path::new("/data/my results"),
            Path::new("/work/workflow/Snakefile"),
            Path::new("/work/config.json"),
            Some(Path::new("/work/config/cluster.json")),
            true,
            false,
        );
        let rendered = command.render();

        let mut expected = vec!["snakemake".to_string()];
        expected.extend(tokens(&command));
        assert_eq!(shlex::split(&rendered), Some(expected));
        assert!(rendered.ends_with("--dryrun"));

        let std_command = command.to_command();
        assert_eq!(std_command.get_program(), "snakemake");
        assert_eq!(std_command.get_args().count(), tokens(&command).len());
    }
}
