use super::process::Program;
use crate::domain::{
    ContainerOrchestrator, ImageDetail, ImageRegistry, ServiceStatus, TaskDefinition,
    TaskDefinitionRef,
};
use crate::error::{DeployError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::process::Output;

const IMAGE_NOT_FOUND: &str = "ImageNotFoundException";

/// `aws ecr` and `aws ecs` bound to one region
#[derive(Debug, Clone)]
pub struct AwsCli {
    aws: Program,
    region: String,
}

impl AwsCli {
    pub fn new(region: &str) -> Self {
        Self {
            aws: Program::new("aws"),
            region: region.to_string(),
        }
    }

    fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = args.to_vec();
        full.extend(["--region", self.region.as_str(), "--output", "json"]);
        full
    }

    fn json(&self, args: &[&str], context: &str) -> Result<Value> {
        let stdout = self.aws.capture(self.args(args), context)?;
        serde_json::from_str(&stdout)
            .map_err(|e| DeployError::unexpected_output("aws", format!("{context}: {e}")))
    }
}

impl ImageRegistry for AwsCli {
    fn login_password(&self) -> Result<String> {
        self.aws.capture(
            ["ecr", "get-login-password", "--region", self.region.as_str()],
            "requesting registry credentials",
        )
    }

    fn describe_image(&self, repository: &str, tag: &str) -> Result<Option<ImageDetail>> {
        let image_id = format!("imageTag={tag}");
        let context = format!("looking up tag {tag} in {repository}");
        let output = self.aws.output(
            self.args(&[
                "ecr",
                "describe-images",
                "--repository-name",
                repository,
                "--image-ids",
                image_id.as_str(),
            ]),
            &context,
        )?;

        describe_image_result(&self.aws, &output, tag, &context)
    }

    fn list_images(&self, repository: &str) -> Result<Vec<ImageDetail>> {
        let stdout = self.aws.capture(
            self.args(&["ecr", "describe-images", "--repository-name", repository]),
            &format!("listing images in {repository}"),
        )?;
        parse_image_details(&stdout)
    }
}

impl ContainerOrchestrator for AwsCli {
    fn describe_task_definition(&self, family: &str) -> Result<TaskDefinition> {
        let mut response = self.json(
            &[
                "ecs",
                "describe-task-definition",
                "--task-definition",
                family,
            ],
            &format!("describing task definition {family}"),
        )?;
        TaskDefinition::from_value(take_task_definition(&mut response)?)
    }

    fn register_task_definition(&self, document: &Path) -> Result<TaskDefinitionRef> {
        let input = format!("file://{}", document.display());
        let mut response = self.json(
            &[
                "ecs",
                "register-task-definition",
                "--cli-input-json",
                input.as_str(),
            ],
            "registering task definition",
        )?;

        let registered = TaskDefinition::from_value(take_task_definition(&mut response)?)?;
        match (registered.family(), registered.revision()) {
            (Some(family), Some(revision)) => Ok(TaskDefinitionRef::new(family, revision)),
            _ => Err(DeployError::unexpected_output(
                "aws",
                "registered task definition has no family or revision",
            )),
        }
    }

    fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &TaskDefinitionRef,
        force_new_deployment: bool,
    ) -> Result<()> {
        let target = task_definition.to_string();
        let args = update_service_args(cluster, service, &target, force_new_deployment);
        self.json(&args, &format!("updating service {service} to {target}"))?;
        Ok(())
    }

    fn describe_service(&self, cluster: &str, service: &str) -> Result<ServiceStatus> {
        let stdout = self.aws.capture(
            self.args(&[
                "ecs",
                "describe-services",
                "--cluster",
                cluster,
                "--services",
                service,
            ]),
            &format!("describing service {service}"),
        )?;
        parse_service_status(&stdout, service)
    }
}

/// A missing tag is `None`; any other failure keeps its exit status
fn describe_image_result(
    aws: &Program,
    output: &Output,
    tag: &str,
    context: &str,
) -> Result<Option<ImageDetail>> {
    if !output.status.success() {
        if String::from_utf8_lossy(&output.stderr).contains(IMAGE_NOT_FOUND) {
            return Ok(None);
        }
        aws.ensure_success(output, context)?;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let images = parse_image_details(&stdout)?;
    Ok(images.into_iter().find(|image| image.has_tag(tag)))
}

fn update_service_args<'a>(
    cluster: &'a str,
    service: &'a str,
    target: &'a str,
    force_new_deployment: bool,
) -> Vec<&'a str> {
    let mut args = vec![
        "ecs",
        "update-service",
        "--cluster",
        cluster,
        "--service",
        service,
        "--task-definition",
        target,
    ];
    if force_new_deployment {
        args.push("--force-new-deployment");
    }
    args
}

fn take_task_definition(response: &mut Value) -> Result<Value> {
    match response.get_mut("taskDefinition").map(Value::take) {
        Some(def) if def.is_object() => Ok(def),
        _ => Err(DeployError::unexpected_output(
            "aws",
            "response has no taskDefinition object",
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeImagesResponse {
    #[serde(default)]
    image_details: Vec<RawImageDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImageDetail {
    #[serde(default)]
    image_digest: String,
    #[serde(default)]
    image_tags: Vec<String>,
    image_size_in_bytes: Option<u64>,
    image_pushed_at: Option<Value>,
}

pub(crate) fn parse_image_details(stdout: &str) -> Result<Vec<ImageDetail>> {
    let stdout = stdout.trim();
    if stdout.is_empty() || stdout == "None" {
        return Ok(Vec::new());
    }

    let response: DescribeImagesResponse = serde_json::from_str(stdout)
        .map_err(|e| DeployError::unexpected_output("aws", format!("describe-images: {e}")))?;

    Ok(response
        .image_details
        .into_iter()
        .map(|raw| ImageDetail {
            tags: raw.image_tags,
            digest: raw.image_digest,
            pushed_at: raw.image_pushed_at.as_ref().and_then(parse_timestamp),
            size_bytes: raw.image_size_in_bytes,
        })
        .collect())
}

/// CLI v2 prints ISO 8601, v1 prints epoch seconds
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = n.as_f64()?;
            let millis = (secs * 1000.0).round() as i64;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeServicesResponse {
    #[serde(default)]
    services: Vec<RawService>,
    #[serde(default)]
    failures: Vec<RawFailure>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawService {
    service_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    task_definition: String,
    #[serde(default)]
    desired_count: u64,
    #[serde(default)]
    running_count: u64,
    #[serde(default)]
    deployments: Vec<Value>,
}

#[derive(Deserialize)]
struct RawFailure {
    #[serde(default)]
    reason: String,
}

pub(crate) fn parse_service_status(stdout: &str, service: &str) -> Result<ServiceStatus> {
    let response: DescribeServicesResponse = serde_json::from_str(stdout)
        .map_err(|e| DeployError::unexpected_output("aws", format!("describe-services: {e}")))?;

    let Some(raw) = response.services.into_iter().next() else {
        let reason = response
            .failures
            .first()
            .map(|f| f.reason.clone())
            .unwrap_or_else(|| "no service returned".to_string());
        return Err(DeployError::unexpected_output(
            "aws",
            format!("service {service}: {reason}"),
        ));
    };

    Ok(ServiceStatus {
        name: raw.service_name,
        status: raw.status,
        task_definition: raw.task_definition,
        desired_count: raw.desired_count,
        running_count: raw.running_count,
        deployments: raw.deployments.len(),
    })
}
