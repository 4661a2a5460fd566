pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{ImageRef, RepositoryUri, RevisionId, TaskDefinition, TaskDefinitionRef};
pub use error::{DeployError, Result};
pub use infra::DeployConfig;
pub use services::{DeployPipeline, DeploySummary, Toolchain};
