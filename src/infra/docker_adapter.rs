use super::process::Program;
use crate::domain::{ContainerEngine, ImageRef};
use crate::error::Result;
use std::ffi::OsString;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DockerCli {
    docker: Program,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            docker: Program::new("docker"),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngine for DockerCli {
    fn login(&self, registry_host: &str, username: &str, password: &str) -> Result<()> {
        self.docker.run_with_stdin(
            [
                "login",
                "--username",
                username,
                "--password-stdin",
                registry_host,
            ],
            password,
            &format!("logging in to {registry_host}"),
        )
    }

    fn build_image(
        &self,
        image: &ImageRef,
        context: &Path,
        dockerfile: Option<&Path>,
    ) -> Result<()> {
        let mut args: Vec<OsString> = vec!["build".into(), "-t".into(), image.as_str().into()];

        if let Some(file) = dockerfile {
            args.push("-f".into());
            args.push(file.as_os_str().to_os_string());
        }
        args.push(context.as_os_str().to_os_string());

        self.docker.run(
            args,
            &format!("building image {image} from {:?}", context),
        )
    }

    fn tag_image(&self, source: &ImageRef, target: &ImageRef) -> Result<()> {
        self.docker.run(
            ["tag", source.as_str(), target.as_str()],
            &format!("tagging {source} as {target}"),
        )
    }

    fn push_image(&self, image: &ImageRef) -> Result<()> {
        self.docker
            .run(["push", image.as_str()], &format!("pushing image {image}"))
    }
}
