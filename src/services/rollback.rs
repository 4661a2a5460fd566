use super::{DeploymentController, RevisionManager};
use crate::domain::{ImageRegistry, RepositoryUri, TaskDefinitionRef, WaitOutcome};
use crate::error::{DeployError, Result};
use std::sync::Arc;
use tracing::info;

/// Where a rollback lands
#[derive(Debug, Clone)]
pub struct RollbackTarget<'a> {
    pub cluster: &'a str,
    pub service: &'a str,
    pub family: &'a str,
    pub force: bool,
}

pub struct RollbackCoordinator {
    registry: Arc<dyn ImageRegistry>,
    repository: RepositoryUri,
    revisions: RevisionManager,
    controller: DeploymentController,
}

impl RollbackCoordinator {
    pub fn new(
        registry: Arc<dyn ImageRegistry>,
        repository: RepositoryUri,
        revisions: RevisionManager,
        controller: DeploymentController,
    ) -> Self {
        Self {
            registry,
            repository,
            revisions,
            controller,
        }
    }

    /// Redeploys an image that is still in the registry. Always registers a
    /// fresh revision, so rolling back twice to the same tag is safe.
    pub fn rollback(
        &self,
        tag: &str,
        target: &RollbackTarget<'_>,
    ) -> Result<(TaskDefinitionRef, WaitOutcome)> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(DeployError::EmptyRollbackTag);
        }

        let repository = self.repository.repository_name();
        if self.registry.describe_image(repository, tag)?.is_none() {
            return Err(DeployError::TagNotFound {
                tag: tag.to_string(),
                repository: repository.to_string(),
            });
        }
        info!("Rolling back {} to {tag}", target.service);

        let registered = self.revisions.create_revision(target.family, tag)?;
        let outcome =
            self.controller
                .deploy(target.cluster, target.service, &registered, target.force)?;
        Ok((registered, outcome))
    }
}
