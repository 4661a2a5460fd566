use super::{RegistryClient, VersionResolver};
use crate::domain::{ContainerEngine, RevisionId};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builds `REPO:latest`, tags it with the commit revision and pushes both
pub struct ImageBuilder {
    engine: Arc<dyn ContainerEngine>,
    registry: RegistryClient,
    resolver: VersionResolver,
    context: PathBuf,
    dockerfile: Option<PathBuf>,
}

impl ImageBuilder {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        registry: RegistryClient,
        resolver: VersionResolver,
        context: PathBuf,
        dockerfile: Option<PathBuf>,
    ) -> Self {
        Self {
            engine,
            registry,
            resolver,
            context,
            dockerfile,
        }
    }

    pub fn build(&self) -> Result<RevisionId> {
        let repository = self.registry.repository();
        let latest = repository.latest();

        info!("Building {latest} from {:?}", self.context);
        self.engine
            .build_image(&latest, &self.context, self.dockerfile.as_deref())?;

        let revision = self.resolver.resolve()?;
        let versioned = repository.image(revision.as_str());
        self.engine.tag_image(&latest, &versioned)?;

        self.registry.push(&latest)?;
        self.registry.push(&versioned)?;

        info!("Pushed {versioned}");
        Ok(revision)
    }
}
