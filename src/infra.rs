pub mod aws_adapter;
pub mod config;
pub mod docker_adapter;
pub mod git_adapter;
pub mod host;
pub mod process;

pub use aws_adapter::AwsCli;
pub use config::{DeployConfig, FileConfig, Overrides};
pub use docker_adapter::DockerCli;
pub use git_adapter::GitCli;
pub use host::SystemHost;
