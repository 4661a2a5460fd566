mod image;
mod service;
mod task_definition;
pub mod traits;

pub use image::{
    ImageDetail, ImageRef, LATEST_TAG, REVISION_ID_LEN, RepositoryUri, RevisionId, most_recent,
};
pub use service::{ServiceStatus, TaskDefinitionRef, WaitOutcome};
pub use task_definition::{SERVER_ASSIGNED_FIELDS, TaskDefinition};
pub use traits::{
    ContainerEngine, ContainerOrchestrator, HostEnvironment, ImageRegistry, SourceControl,
};
