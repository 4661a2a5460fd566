use super::{ImageDetail, ImageRef, ServiceStatus, TaskDefinition, TaskDefinitionRef};
use crate::error::Result;
use std::fmt::Debug;
use std::path::Path;

/// Facts about the machine the tool runs on
pub trait HostEnvironment: Send + Sync + Debug {
    /// Check if a command is available
    fn is_command_available(&self, cmd: &str) -> bool;
}

/// Version control operations on the source tree
pub trait SourceControl: Send + Sync + Debug {
    /// Whether `dir` lies inside a work tree
    fn is_work_tree(&self, dir: &Path) -> bool;

    /// Full id of the checked out commit
    fn head_commit(&self, dir: &Path) -> Result<String>;
}

/// Local image build tool
pub trait ContainerEngine: Send + Sync + Debug {
    /// Authenticate against a registry, password is passed on stdin
    fn login(&self, registry_host: &str, username: &str, password: &str) -> Result<()>;

    /// Build an image from a context directory
    fn build_image(&self, image: &ImageRef, context: &Path, dockerfile: Option<&Path>)
    -> Result<()>;

    /// Add a second name to a local image
    fn tag_image(&self, source: &ImageRef, target: &ImageRef) -> Result<()>;

    /// Upload a tagged image
    fn push_image(&self, image: &ImageRef) -> Result<()>;
}

/// Remote image registry queries
pub trait ImageRegistry: Send + Sync + Debug {
    /// Short-lived password for `docker login`
    fn login_password(&self) -> Result<String>;

    /// The image carrying `tag`, or None when the registry has no such tag
    fn describe_image(&self, repository: &str, tag: &str) -> Result<Option<ImageDetail>>;

    /// Every image in the repository, unordered
    fn list_images(&self, repository: &str) -> Result<Vec<ImageDetail>>;
}

/// Task definition and service operations of the orchestration service
pub trait ContainerOrchestrator: Send + Sync + Debug {
    /// Latest active revision of a family
    fn describe_task_definition(&self, family: &str) -> Result<TaskDefinition>;

    /// Register the document stored at `document` as a new revision
    fn register_task_definition(&self, document: &Path) -> Result<TaskDefinitionRef>;

    /// Point a service at a task definition revision
    fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &TaskDefinitionRef,
        force_new_deployment: bool,
    ) -> Result<()>;

    /// Current deployment state of a service
    fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceStatus>;
}
