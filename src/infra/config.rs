use crate::domain::RepositoryUri;
use crate::error::{DeployError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "ecsdeploy.toml";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_CLUSTER: &str = "default";
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// `None` when `HOME` is unset, so no global file is read
pub fn default_config_dir() -> Option<PathBuf> {
    config_dir_under(std::env::var_os("HOME"))
}

fn config_dir_under(home: Option<OsString>) -> Option<PathBuf> {
    home.filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".config/ecsdeploy"))
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub repository: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub cluster: Option<String>,
    pub name: Option<String>,
    pub task_family: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub context: Option<PathBuf>,
    pub dockerfile: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WaitConfig {
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

/// Contents of an `ecsdeploy.toml`
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub region: Option<String>,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub wait: WaitConfig,
}

impl FileConfig {
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: FileConfig) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.region, other.region);
        take(&mut self.registry.repository, other.registry.repository);
        take(&mut self.service.cluster, other.service.cluster);
        take(&mut self.service.name, other.service.name);
        take(&mut self.service.task_family, other.service.task_family);
        take(&mut self.build.context, other.build.context);
        take(&mut self.build.dockerfile, other.build.dockerfile);
        take(&mut self.wait.timeout_secs, other.wait.timeout_secs);
        take(&mut self.wait.poll_interval_secs, other.wait.poll_interval_secs);
    }
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("parsing {:?}", path))
}

/// Global file first, then the local one on top. A missing global file is
/// ignored; a missing local file is ignored unless `local_required`.
pub fn load_file_config(
    global: Option<&Path>,
    local: &Path,
    local_required: bool,
) -> Result<FileConfig> {
    let mut config = FileConfig::default();

    if let Some(global) = global.filter(|path| path.exists()) {
        config = read_file_config(global)?;
    }

    if local.exists() {
        config.merge(read_file_config(local)?);
    } else if local_required {
        return Err(anyhow::anyhow!("config file {:?} does not exist", local).into());
    }

    Ok(config)
}

/// Values taken from flags and environment variables
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub region: Option<String>,
    pub repository: Option<String>,
    pub cluster: Option<String>,
    pub service: Option<String>,
    pub task_family: Option<String>,
    pub wait_timeout_secs: Option<u64>,
    pub force: bool,
    pub verbose: bool,
    pub no_wait: bool,
}

/// Resolved runtime configuration, read-only once built
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub region: String,
    pub repository: Option<RepositoryUri>,
    pub cluster: String,
    pub service: Option<String>,
    pub task_family: Option<String>,
    pub force: bool,
    pub verbose: bool,
    pub wait_for_stable: bool,
    pub build_context: PathBuf,
    pub dockerfile: Option<PathBuf>,
    pub stability_timeout: Duration,
    pub poll_interval: Duration,
    /// Where derived task definitions are written before registration
    pub scratch_dir: PathBuf,
}

impl DeployConfig {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let repository = overrides
            .repository
            .or(file.registry.repository)
            .map(|uri| RepositoryUri::parse(&uri))
            .transpose()?;

        let build_context = file
            .build
            .context
            .map(|p| expand_path(&p))
            .unwrap_or_else(|| PathBuf::from("."));

        let timeout_secs = overrides
            .wait_timeout_secs
            .or(file.wait.timeout_secs)
            .unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS);
        let poll_secs = file
            .wait
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(1);

        Ok(Self {
            region: non_empty(overrides.region.or(file.region))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            repository,
            cluster: non_empty(overrides.cluster.or(file.service.cluster))
                .unwrap_or_else(|| DEFAULT_CLUSTER.to_string()),
            service: non_empty(overrides.service.or(file.service.name)),
            task_family: non_empty(overrides.task_family.or(file.service.task_family)),
            force: overrides.force,
            verbose: overrides.verbose,
            wait_for_stable: !overrides.no_wait,
            build_context,
            dockerfile: file.build.dockerfile.map(|p| expand_path(&p)),
            stability_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_secs(poll_secs),
            scratch_dir: std::env::temp_dir(),
        })
    }

    pub fn repository(&self) -> Result<&RepositoryUri> {
        self.repository
            .as_ref()
            .ok_or(DeployError::MissingSetting("ecr-repo"))
    }

    pub fn service(&self) -> Result<&str> {
        self.service
            .as_deref()
            .ok_or(DeployError::MissingSetting("service"))
    }

    pub fn task_family(&self) -> Result<&str> {
        self.task_family
            .as_deref()
            .ok_or(DeployError::MissingSetting("task-family"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.to_string_lossy().as_ref()).into_owned())
}
