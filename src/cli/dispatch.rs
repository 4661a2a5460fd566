use super::args::{Cli, Command, GlobalOptions};
use super::output::{render_images, render_status, render_summary};
use crate::error::Result;
use crate::infra::config::{
    CONFIG_FILE_NAME, default_config_dir, expand_path, load_file_config,
};
use crate::infra::{AwsCli, DeployConfig, DockerCli, GitCli, SystemHost};
use crate::services::{DeployPipeline, Toolchain};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.options)?;
    let tools = system_toolchain(&config.region);
    let pipeline = DeployPipeline::new(config, tools);
    dispatch(&pipeline, cli.command)
}

/// Defaults, then config files, then environment and flags
pub fn load_config(options: &GlobalOptions) -> Result<DeployConfig> {
    let global = default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME));
    let (local, required) = match &options.config {
        Some(path) => (expand_path(path), true),
        None => (PathBuf::from(CONFIG_FILE_NAME), false),
    };
    debug!("Config files: global {:?}, local {:?}", global, local);

    let file = load_file_config(global.as_deref(), &local, required)?;
    DeployConfig::resolve(options.overrides(), file)
}

pub fn system_toolchain(region: &str) -> Toolchain {
    let aws = Arc::new(AwsCli::new(region));
    Toolchain {
        host: Arc::new(SystemHost),
        vcs: Arc::new(GitCli::new()),
        engine: Arc::new(DockerCli::new()),
        registry: aws.clone(),
        orchestrator: aws,
    }
}

pub fn dispatch(pipeline: &DeployPipeline, command: Command) -> Result<()> {
    let config = pipeline.config();

    match command {
        Command::Deploy => {
            let summary = pipeline.full_deploy()?;
            info!("Deployment finished");
            println!("{}", render_summary(&summary, config.repository()?));
        }
        Command::BuildOnly => {
            let revision = pipeline.build_only()?;
            info!("Build finished");
            println!("{}", config.repository()?.image(revision.as_str()));
        }
        Command::DeployOnly => {
            let summary = pipeline.deploy_only()?;
            info!("Deployment finished");
            println!("{}", render_summary(&summary, config.repository()?));
        }
        Command::Rollback { tag } => {
            let summary = pipeline.rollback(&tag)?;
            info!("Rollback finished");
            println!("{}", render_summary(&summary, config.repository()?));
        }
        Command::ListImages { limit } => {
            let images = pipeline.list_images(limit)?;
            println!("{}", render_images(&images));
        }
        Command::Status => {
            let status = pipeline.status()?;
            println!("{}", render_status(&status));
        }
    }

    Ok(())
}
