use crate::domain::{ContainerEngine, ImageRef, ImageRegistry, RepositoryUri};
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

const REGISTRY_USERNAME: &str = "AWS";

/// Registry authentication and uploads for one repository
pub struct RegistryClient {
    registry: Arc<dyn ImageRegistry>,
    engine: Arc<dyn ContainerEngine>,
    repository: RepositoryUri,
}

impl RegistryClient {
    pub fn new(
        registry: Arc<dyn ImageRegistry>,
        engine: Arc<dyn ContainerEngine>,
        repository: RepositoryUri,
    ) -> Self {
        Self {
            registry,
            engine,
            repository,
        }
    }

    pub fn login(&self) -> Result<()> {
        let host = self.repository.registry_host();
        info!("Logging in to {host}");

        let password = self.registry.login_password()?;
        self.engine.login(host, REGISTRY_USERNAME, &password)
    }

    pub fn push(&self, image: &ImageRef) -> Result<()> {
        info!("Pushing {image}");
        self.engine.push_image(image)
    }

    pub fn repository(&self) -> &RepositoryUri {
        &self.repository
    }
}
