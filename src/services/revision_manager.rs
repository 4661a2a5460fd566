use crate::domain::{ContainerOrchestrator, RepositoryUri, TaskDefinitionRef};
use crate::error::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registers new task definition revisions derived from the active one
pub struct RevisionManager {
    orchestrator: Arc<dyn ContainerOrchestrator>,
    repository: RepositoryUri,
    scratch_dir: PathBuf,
    keep_failed_documents: bool,
}

impl RevisionManager {
    pub fn new(
        orchestrator: Arc<dyn ContainerOrchestrator>,
        repository: RepositoryUri,
        scratch_dir: PathBuf,
        keep_failed_documents: bool,
    ) -> Self {
        Self {
            orchestrator,
            repository,
            scratch_dir,
            keep_failed_documents,
        }
    }

    /// Registers a copy of the active `family` revision running `image_tag`.
    /// Never edits an existing revision.
    pub fn create_revision(&self, family: &str, image_tag: &str) -> Result<TaskDefinitionRef> {
        let image = self.repository.image(image_tag);
        info!("Creating task definition revision of {family} for {image}");

        let current = self.orchestrator.describe_task_definition(family)?;
        if let Some(revision) = current.revision() {
            debug!("Active revision is {family}:{revision}");
        }
        let derived = current.for_registration(&image)?;

        let path = self.document_path(family);
        fs::write(&path, serde_json::to_vec_pretty(&derived).map_err(std::io::Error::from)?)?;
        debug!("Wrote task definition to {:?}", path);

        match self.orchestrator.register_task_definition(&path) {
            Ok(registered) => {
                remove_document(&path);
                info!("Registered {registered}");
                Ok(registered)
            }
            Err(e) => {
                if self.keep_failed_documents {
                    warn!("Keeping rejected task definition at {:?}", path);
                } else {
                    remove_document(&path);
                }
                Err(e)
            }
        }
    }

    /// Unique per family, millisecond and process
    fn document_path(&self, family: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
        self.scratch_dir.join(format!(
            "task-definition-{family}-{stamp}-{}.json",
            std::process::id()
        ))
    }
}

fn remove_document(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove {:?}: {}", path, e);
    }
}
