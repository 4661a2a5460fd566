use crate::infra::Overrides;
use crate::services::DEFAULT_IMAGE_LIMIT;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ecsdeploy",
    version,
    about = "Build, push and roll out a container image to an ECS service"
)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct GlobalOptions {
    /// AWS region
    #[arg(short, long, global = true, env = "AWS_REGION", value_name = "REGION")]
    pub region: Option<String>,

    /// ECR repository URI (<registry-host>/<name>)
    #[arg(
        short = 'e',
        long = "ecr-repo",
        global = true,
        env = "ECSDEPLOY_ECR_REPO",
        value_name = "REPO"
    )]
    pub ecr_repo: Option<String>,

    /// ECS cluster
    #[arg(short, long, global = true, env = "ECSDEPLOY_CLUSTER", value_name = "CLUSTER")]
    pub cluster: Option<String>,

    /// ECS service
    #[arg(short, long, global = true, env = "ECSDEPLOY_SERVICE", value_name = "SERVICE")]
    pub service: Option<String>,

    /// Task definition family
    #[arg(
        short = 't',
        long,
        global = true,
        env = "ECSDEPLOY_TASK_FAMILY",
        value_name = "FAMILY"
    )]
    pub task_family: Option<String>,

    /// Restart tasks even if the task definition did not change
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Debug logging; keeps rejected task definitions on disk
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ./ecsdeploy.toml
    #[arg(long, global = true, env = "ECSDEPLOY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the service to become stable
    #[arg(long, global = true, value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    /// Return as soon as the service update is accepted
    #[arg(long, global = true)]
    pub no_wait: bool,
}

impl GlobalOptions {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            region: self.region.clone(),
            repository: self.ecr_repo.clone(),
            cluster: self.cluster.clone(),
            service: self.service.clone(),
            task_family: self.task_family.clone(),
            wait_timeout_secs: self.wait_timeout,
            force: self.force,
            verbose: self.verbose,
            no_wait: self.no_wait,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build and push the current commit, then deploy it
    Deploy,
    /// Build and push the current commit without deploying
    BuildOnly,
    /// Deploy the already pushed image of the current commit
    DeployOnly,
    /// Deploy an image tag that is still in the registry
    Rollback {
        /// Image tag to roll back to (see list-images)
        tag: String,
    },
    /// Show the most recently pushed images
    ListImages {
        /// Number of images to show
        #[arg(long, default_value_t = DEFAULT_IMAGE_LIMIT)]
        limit: usize,
    },
    /// Show the service's current deployment state
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ecsdeploy").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn options_before_and_after_command() {
        let cli = parse(&["-r", "eu-west-1", "deploy", "-f", "--cluster", "prod"]).unwrap();
        assert_eq!(cli.command, Command::Deploy);
        assert_eq!(cli.options.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.options.cluster.as_deref(), Some("prod"));
        assert!(cli.options.force);
    }

    #[test]
    fn short_flags_map_to_overrides() {
        let cli = parse(&[
            "-e",
            "registry.example.com/web",
            "-s",
            "web",
            "-t",
            "web-task",
            "-v",
            "build-only",
        ])
        .unwrap();

        let overrides = cli.options.overrides();
        assert_eq!(overrides.repository.as_deref(), Some("registry.example.com/web"));
        assert_eq!(overrides.service.as_deref(), Some("web"));
        assert_eq!(overrides.task_family.as_deref(), Some("web-task"));
        assert!(overrides.verbose);
        assert_eq!(cli.command, Command::BuildOnly);
    }

    #[test]
    fn rollback_takes_a_tag() {
        let cli = parse(&["rollback", "a1b2c3d"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Rollback {
                tag: "a1b2c3d".into()
            }
        );
        assert!(parse(&["rollback"]).is_err());
    }

    #[test]
    fn list_images_defaults_to_ten() {
        let cli = parse(&["list-images"]).unwrap();
        assert_eq!(cli.command, Command::ListImages { limit: 10 });
    }

    #[test]
    fn help_is_reported_as_display_help() {
        assert_eq!(parse(&["help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn unknown_command_and_option_are_errors() {
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["--bogus", "deploy"]).is_err());
    }
}
