mod dependency_checker;
mod deployment_controller;
mod image_builder;
mod pipeline;
mod registry_client;
mod revision_manager;
mod rollback;
mod version_resolver;

pub use dependency_checker::{BUILD_TOOLS, DEPLOY_TOOLS, DependencyChecker, QUERY_TOOLS};
pub use deployment_controller::{DeploymentController, StabilityWait};
pub use image_builder::ImageBuilder;
pub use pipeline::{DEFAULT_IMAGE_LIMIT, DeployPipeline, DeploySummary, Toolchain};
pub use registry_client::RegistryClient;
pub use revision_manager::RevisionManager;
pub use rollback::{RollbackCoordinator, RollbackTarget};
pub use version_resolver::VersionResolver;
