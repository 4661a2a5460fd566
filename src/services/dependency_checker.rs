use crate::domain::{HostEnvironment, SourceControl};
use crate::error::{DeployError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const BUILD_TOOLS: &[&str] = &["docker", "aws", "git"];
pub const DEPLOY_TOOLS: &[&str] = &["aws", "git"];
pub const QUERY_TOOLS: &[&str] = &["aws"];

/// Fails fast when the environment cannot run a flow
pub struct DependencyChecker {
    host: Arc<dyn HostEnvironment>,
    vcs: Arc<dyn SourceControl>,
}

impl DependencyChecker {
    pub fn new(host: Arc<dyn HostEnvironment>, vcs: Arc<dyn SourceControl>) -> Self {
        Self { host, vcs }
    }

    /// Every tool in `tools` must be on PATH; when `work_tree` is given it
    /// must lie inside a git checkout
    pub fn check(&self, tools: &[&str], work_tree: Option<&Path>) -> Result<()> {
        for tool in tools {
            if !self.host.is_command_available(tool) {
                return Err(DeployError::MissingDependency(tool.to_string()));
            }
            debug!("{tool} available");
        }

        if let Some(dir) = work_tree {
            if !self.vcs.is_work_tree(dir) {
                return Err(DeployError::NotARepository(dir.to_path_buf()));
            }
        }

        Ok(())
    }
}
