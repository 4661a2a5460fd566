use super::dependency_checker::{BUILD_TOOLS, DEPLOY_TOOLS, QUERY_TOOLS};
use super::{
    DependencyChecker, DeploymentController, ImageBuilder, RegistryClient, RevisionManager,
    RollbackCoordinator, RollbackTarget, StabilityWait, VersionResolver,
};
use crate::domain::{
    ContainerEngine, ContainerOrchestrator, HostEnvironment, ImageDetail, ImageRegistry,
    RevisionId, ServiceStatus, SourceControl, TaskDefinitionRef, WaitOutcome, most_recent,
};
use crate::error::Result;
use crate::infra::DeployConfig;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_IMAGE_LIMIT: usize = 10;

/// External collaborators, one handle per tool
#[derive(Clone)]
pub struct Toolchain {
    pub host: Arc<dyn HostEnvironment>,
    pub vcs: Arc<dyn SourceControl>,
    pub engine: Arc<dyn ContainerEngine>,
    pub registry: Arc<dyn ImageRegistry>,
    pub orchestrator: Arc<dyn ContainerOrchestrator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub image_tag: String,
    pub task_definition: TaskDefinitionRef,
    pub outcome: WaitOutcome,
}

/// The high-level flows, composed from the individual services
pub struct DeployPipeline {
    config: DeployConfig,
    tools: Toolchain,
}

impl DeployPipeline {
    pub fn new(config: DeployConfig, tools: Toolchain) -> Self {
        Self { config, tools }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn full_deploy(&self) -> Result<DeploySummary> {
        self.ensure_tools(BUILD_TOOLS, true)?;
        let revision = self.login_and_build()?;
        self.release(revision.as_str())
    }

    pub fn build_only(&self) -> Result<RevisionId> {
        self.ensure_tools(BUILD_TOOLS, true)?;
        self.login_and_build()
    }

    /// Deploys the image of the current commit without building it. If that
    /// image was never pushed, ECS only notices when it pulls.
    pub fn deploy_only(&self) -> Result<DeploySummary> {
        self.ensure_tools(DEPLOY_TOOLS, true)?;
        let revision = self.resolver().resolve()?;
        info!("Deploying existing image {revision}");
        self.release(revision.as_str())
    }

    pub fn rollback(&self, tag: &str) -> Result<DeploySummary> {
        self.ensure_tools(QUERY_TOOLS, false)?;

        let coordinator = RollbackCoordinator::new(
            self.tools.registry.clone(),
            self.config.repository()?.clone(),
            self.revision_manager()?,
            self.controller(),
        );
        let target = RollbackTarget {
            cluster: &self.config.cluster,
            service: self.config.service()?,
            family: self.config.task_family()?,
            force: self.config.force,
        };

        let (task_definition, outcome) = coordinator.rollback(tag, &target)?;
        Ok(DeploySummary {
            image_tag: tag.trim().to_string(),
            task_definition,
            outcome,
        })
    }

    pub fn list_images(&self, limit: usize) -> Result<Vec<ImageDetail>> {
        self.ensure_tools(QUERY_TOOLS, false)?;
        let repository = self.config.repository()?;
        let images = self
            .tools
            .registry
            .list_images(repository.repository_name())?;
        Ok(most_recent(images, limit))
    }

    pub fn status(&self) -> Result<ServiceStatus> {
        self.ensure_tools(QUERY_TOOLS, false)?;
        self.tools
            .orchestrator
            .describe_service(&self.config.cluster, self.config.service()?)
    }

    fn ensure_tools(&self, tools: &[&str], needs_work_tree: bool) -> Result<()> {
        let checker = DependencyChecker::new(self.tools.host.clone(), self.tools.vcs.clone());
        let work_tree = needs_work_tree.then_some(self.config.build_context.as_path());
        checker.check(tools, work_tree)
    }

    fn login_and_build(&self) -> Result<RevisionId> {
        let registry = RegistryClient::new(
            self.tools.registry.clone(),
            self.tools.engine.clone(),
            self.config.repository()?.clone(),
        );
        registry.login()?;

        ImageBuilder::new(
            self.tools.engine.clone(),
            registry,
            self.resolver(),
            self.config.build_context.clone(),
            self.config.dockerfile.clone(),
        )
        .build()
    }

    fn release(&self, image_tag: &str) -> Result<DeploySummary> {
        let family = self.config.task_family()?;
        let service = self.config.service()?;

        let task_definition = self.revision_manager()?.create_revision(family, image_tag)?;
        let outcome = self.controller().deploy(
            &self.config.cluster,
            service,
            &task_definition,
            self.config.force,
        )?;

        Ok(DeploySummary {
            image_tag: image_tag.to_string(),
            task_definition,
            outcome,
        })
    }

    fn resolver(&self) -> VersionResolver {
        VersionResolver::new(self.tools.vcs.clone(), self.config.build_context.clone())
    }

    fn revision_manager(&self) -> Result<RevisionManager> {
        Ok(RevisionManager::new(
            self.tools.orchestrator.clone(),
            self.config.repository()?.clone(),
            self.config.scratch_dir.clone(),
            self.config.verbose,
        ))
    }

    fn controller(&self) -> DeploymentController {
        DeploymentController::new(
            self.tools.orchestrator.clone(),
            StabilityWait {
                enabled: self.config.wait_for_stable,
                timeout: self.config.stability_timeout,
                poll_interval: self.config.poll_interval,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployError;
    use crate::test_support::{MockCloud, mock_config, mock_toolchain};

    #[test]
    fn deploy_requires_task_family_before_registering() {
        let scratch = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockCloud::new());
        let mut config = mock_config(scratch.path());
        config.task_family = None;

        let pipeline = DeployPipeline::new(config, mock_toolchain(&mock));
        assert!(matches!(
            pipeline.deploy_only(),
            Err(DeployError::MissingSetting("task-family"))
        ));
        assert!(!mock.get_commands().contains(&"register_task_definition".to_string()));
    }

    #[test]
    fn build_only_never_touches_the_service() {
        let scratch = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockCloud::new());
        mock.add_task_definition("web", "old:1");

        let pipeline = DeployPipeline::new(mock_config(scratch.path()), mock_toolchain(&mock));
        let revision = pipeline.build_only().unwrap();

        assert_eq!(revision.as_str(), "a1b2c3d");
        assert!(mock.updates().is_empty());
        assert_eq!(mock.latest_revision("web"), Some(1));
    }

    #[test]
    fn list_images_returns_newest_first_with_limit() {
        use chrono::{TimeZone, Utc};

        let scratch = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockCloud::new());
        for i in 0..12 {
            mock.add_registry_image(&format!("tag{i:02}"), Utc.timestamp_opt(1_000 + i, 0).single());
        }

        let pipeline = DeployPipeline::new(mock_config(scratch.path()), mock_toolchain(&mock));
        let images = pipeline.list_images(DEFAULT_IMAGE_LIMIT).unwrap();

        assert_eq!(images.len(), 10);
        assert_eq!(images[0].tags, vec!["tag11"]);
        assert_eq!(images[9].tags, vec!["tag02"]);
    }
}
