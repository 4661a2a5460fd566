use crate::domain::{
    ContainerEngine, ContainerOrchestrator, HostEnvironment, ImageDetail, ImageRef,
    ImageRegistry, RepositoryUri, ServiceStatus, SourceControl, TaskDefinition, TaskDefinitionRef,
};
use crate::error::{DeployError, Result};
use crate::infra::DeployConfig;
use crate::services::Toolchain;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

pub const MOCK_COMMIT: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678";
pub const MOCK_REPOSITORY: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/web";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub cluster: String,
    pub service: String,
    pub task_definition: TaskDefinitionRef,
    pub force: bool,
}

/// In-memory stand-in for git, docker, ECR and ECS
#[derive(Debug)]
pub struct MockCloud {
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
    missing_tools: RwLock<HashSet<String>>,
    work_tree: RwLock<bool>,
    head: RwLock<String>,
    local_images: RwLock<HashSet<String>>,
    registry: RwLock<Vec<ImageDetail>>,
    task_definitions: RwLock<HashMap<String, Vec<Value>>>,
    submitted: RwLock<Vec<Value>>,
    updates: RwLock<Vec<UpdateCall>>,
    service_states: RwLock<VecDeque<ServiceStatus>>,
    always_unstable: RwLock<bool>,
}

impl MockCloud {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
            missing_tools: RwLock::new(HashSet::new()),
            work_tree: RwLock::new(true),
            head: RwLock::new(MOCK_COMMIT.to_string()),
            local_images: RwLock::new(HashSet::new()),
            registry: RwLock::new(Vec::new()),
            task_definitions: RwLock::new(HashMap::new()),
            submitted: RwLock::new(Vec::new()),
            updates: RwLock::new(Vec::new()),
            service_states: RwLock::new(VecDeque::new()),
            always_unstable: RwLock::new(false),
        }
    }

    /// Seeds revision 1 of `family` running `image`
    pub fn add_task_definition(&self, family: &str, image: &str) {
        let doc = json!({
            "family": family,
            "cpu": "256",
            "memory": "512",
            "networkMode": "awsvpc",
            "containerDefinitions": [
                { "name": family, "image": image, "essential": true }
            ],
        });
        self.store_revision(family, doc);
    }

    pub fn add_registry_image(&self, tag: &str, pushed_at: Option<DateTime<Utc>>) {
        self.registry.write().unwrap().push(ImageDetail {
            tags: vec![tag.to_string()],
            digest: format!("sha256:{tag}"),
            pushed_at,
            size_bytes: Some(1024),
        });
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn set_missing_tool(&self, tool: &str) {
        self.missing_tools.write().unwrap().insert(tool.to_string());
    }

    pub fn set_work_tree(&self, inside: bool) {
        *self.work_tree.write().unwrap() = inside;
    }

    pub fn set_head(&self, commit: &str) {
        *self.head.write().unwrap() = commit.to_string();
    }

    /// Statuses returned by successive `describe_service` calls before the
    /// service settles
    pub fn queue_service_status(&self, status: ServiceStatus) {
        self.service_states.write().unwrap().push_back(status);
    }

    pub fn set_always_unstable(&self, unstable: bool) {
        *self.always_unstable.write().unwrap() = unstable;
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    /// Documents exactly as they were handed to `register_task_definition`
    pub fn submitted_documents(&self) -> Vec<Value> {
        self.submitted.read().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.read().unwrap().clone()
    }

    pub fn latest_revision(&self, family: &str) -> Option<u64> {
        self.task_definitions
            .read()
            .unwrap()
            .get(family)
            .map(|revs| revs.len() as u64)
    }

    pub fn registry_tags(&self) -> Vec<String> {
        self.registry
            .read()
            .unwrap()
            .iter()
            .flat_map(|i| i.tags.clone())
            .collect()
    }

    fn store_revision(&self, family: &str, mut doc: Value) -> TaskDefinitionRef {
        let mut defs = self.task_definitions.write().unwrap();
        let revisions = defs.entry(family.to_string()).or_default();
        let revision = revisions.len() as u64 + 1;

        if let Some(fields) = doc.as_object_mut() {
            fields.insert(
                "taskDefinitionArn".into(),
                json!(format!(
                    "arn:aws:ecs:us-east-1:123456789012:task-definition/{family}:{revision}"
                )),
            );
            fields.insert("revision".into(), json!(revision));
            fields.insert("status".into(), json!("ACTIVE"));
            fields.insert("compatibilities".into(), json!(["EC2", "FARGATE"]));
            fields.insert(
                "requiresAttributes".into(),
                json!([{ "name": "com.amazonaws.ecs.capability.ecr-auth" }]),
            );
            fields.insert("registeredAt".into(), json!("2025-01-01T00:00:00Z"));
            fields.insert("registeredBy".into(), json!("arn:aws:iam::123456789012:user/ci"));
            fields.insert("enableFaultInjection".into(), json!(false));
        }
        revisions.push(doc);

        TaskDefinitionRef::new(family, revision)
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                return Err(DeployError::CommandFailed {
                    program: "mock".into(),
                    context: operation.to_string(),
                    status: "exit status: 1".into(),
                    stderr: format!("Mock failure on: {operation}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for MockCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEnvironment for MockCloud {
    fn is_command_available(&self, cmd: &str) -> bool {
        self.record_command(&format!("is_available:{cmd}"));
        !self.missing_tools.read().unwrap().contains(cmd)
    }
}

impl SourceControl for MockCloud {
    fn is_work_tree(&self, _dir: &Path) -> bool {
        self.record_command("is_work_tree");
        *self.work_tree.read().unwrap()
    }

    fn head_commit(&self, _dir: &Path) -> Result<String> {
        self.record_command("head_commit");
        self.check_fail("head_commit")?;
        Ok(self.head.read().unwrap().clone())
    }
}

impl ContainerEngine for MockCloud {
    fn login(&self, registry_host: &str, _username: &str, _password: &str) -> Result<()> {
        self.record_command(&format!("login:{registry_host}"));
        self.check_fail("login")
    }

    fn build_image(
        &self,
        image: &ImageRef,
        _context: &Path,
        _dockerfile: Option<&Path>,
    ) -> Result<()> {
        self.record_command(&format!("build:{image}"));
        self.check_fail("build")?;
        self.local_images
            .write()
            .unwrap()
            .insert(image.to_string());
        Ok(())
    }

    fn tag_image(&self, source: &ImageRef, target: &ImageRef) -> Result<()> {
        self.record_command(&format!("tag:{source}->{target}"));
        self.check_fail("tag")?;

        let mut local = self.local_images.write().unwrap();
        if !local.contains(source.as_str()) {
            return Err(DeployError::CommandFailed {
                program: "mock".into(),
                context: "tag".into(),
                status: "exit status: 1".into(),
                stderr: format!("No such image: {source}"),
            });
        }
        local.insert(target.to_string());
        Ok(())
    }

    fn push_image(&self, image: &ImageRef) -> Result<()> {
        self.record_command(&format!("push:{image}"));
        self.check_fail("push")?;

        let tag = image
            .as_str()
            .rsplit_once(':')
            .map(|(_, tag)| tag.to_string())
            .unwrap_or_default();
        let mut registry = self.registry.write().unwrap();
        for existing in registry.iter_mut() {
            existing.tags.retain(|t| t != &tag);
        }
        registry.push(ImageDetail {
            tags: vec![tag.clone()],
            digest: format!("sha256:{tag}"),
            pushed_at: Some(Utc::now()),
            size_bytes: Some(1024),
        });
        Ok(())
    }
}

impl ImageRegistry for MockCloud {
    fn login_password(&self) -> Result<String> {
        self.record_command("login_password");
        self.check_fail("login_password")?;
        Ok("mock-password".to_string())
    }

    fn describe_image(&self, repository: &str, tag: &str) -> Result<Option<ImageDetail>> {
        self.record_command(&format!("describe_image:{repository}:{tag}"));
        self.check_fail("describe_image")?;
        Ok(self
            .registry
            .read()
            .unwrap()
            .iter()
            .find(|i| i.has_tag(tag))
            .cloned())
    }

    fn list_images(&self, repository: &str) -> Result<Vec<ImageDetail>> {
        self.record_command(&format!("list_images:{repository}"));
        self.check_fail("list_images")?;
        Ok(self.registry.read().unwrap().clone())
    }
}

impl ContainerOrchestrator for MockCloud {
    fn describe_task_definition(&self, family: &str) -> Result<TaskDefinition> {
        self.record_command(&format!("describe_task_definition:{family}"));
        self.check_fail("describe_task_definition")?;

        let defs = self.task_definitions.read().unwrap();
        match defs.get(family).and_then(|revs| revs.last()) {
            Some(doc) => TaskDefinition::from_value(doc.clone()),
            None => Err(DeployError::CommandFailed {
                program: "mock".into(),
                context: format!("describing task definition {family}"),
                status: "exit status: 254".into(),
                stderr: "ClientException: Unable to describe task definition.".into(),
            }),
        }
    }

    fn register_task_definition(&self, document: &Path) -> Result<TaskDefinitionRef> {
        self.record_command("register_task_definition");
        let content = std::fs::read_to_string(document)?;
        let doc: Value = serde_json::from_str(&content)
            .map_err(|e| DeployError::unexpected_output("mock", e.to_string()))?;
        self.submitted.write().unwrap().push(doc.clone());
        self.check_fail("register_task_definition")?;

        let family = doc
            .get("family")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(self.store_revision(&family, doc))
    }

    fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &TaskDefinitionRef,
        force_new_deployment: bool,
    ) -> Result<()> {
        self.record_command(&format!("update_service:{service}:{task_definition}"));
        self.check_fail("update_service")?;
        self.updates.write().unwrap().push(UpdateCall {
            cluster: cluster.to_string(),
            service: service.to_string(),
            task_definition: task_definition.clone(),
            force: force_new_deployment,
        });
        Ok(())
    }

    fn describe_service(&self, _cluster: &str, service: &str) -> Result<ServiceStatus> {
        self.record_command(&format!("describe_service:{service}"));
        self.check_fail("describe_service")?;

        if let Some(status) = self.service_states.write().unwrap().pop_front() {
            return Ok(status);
        }

        let task_definition = self
            .updates
            .read()
            .unwrap()
            .last()
            .map(|u| u.task_definition.to_string())
            .unwrap_or_default();
        let deployments = if *self.always_unstable.read().unwrap() {
            2
        } else {
            1
        };

        Ok(ServiceStatus {
            name: service.to_string(),
            status: "ACTIVE".into(),
            task_definition,
            desired_count: 2,
            running_count: 2,
            deployments,
        })
    }
}

/// Every collaborator backed by the same mock
pub fn mock_toolchain(mock: &Arc<MockCloud>) -> Toolchain {
    Toolchain {
        host: mock.clone(),
        vcs: mock.clone(),
        engine: mock.clone(),
        registry: mock.clone(),
        orchestrator: mock.clone(),
    }
}

/// Fully populated configuration with fast polling, writing scratch files to `scratch_dir`
pub fn mock_config(scratch_dir: &Path) -> DeployConfig {
    DeployConfig {
        region: "us-east-1".into(),
        repository: Some(RepositoryUri::parse(MOCK_REPOSITORY).unwrap()),
        cluster: "prod".into(),
        service: Some("web".into()),
        task_family: Some("web".into()),
        force: false,
        verbose: false,
        wait_for_stable: true,
        build_context: PathBuf::from("."),
        dockerfile: None,
        stability_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(5),
        scratch_dir: scratch_dir.to_path_buf(),
    }
}
