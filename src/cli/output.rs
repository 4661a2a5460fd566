use crate::domain::{ImageDetail, RepositoryUri, ServiceStatus, WaitOutcome};
use crate::services::DeploySummary;
use std::fmt::Write;

pub fn render_summary(summary: &DeploySummary, repository: &RepositoryUri) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image:           {}", repository.image(&summary.image_tag));
    let _ = writeln!(out, "Task definition: {}", summary.task_definition);
    let state = match summary.outcome {
        WaitOutcome::Stable => "stable",
        WaitOutcome::TimedOut => "still rolling out (wait timed out)",
        WaitOutcome::Skipped => "update accepted (not waited)",
    };
    let _ = write!(out, "Service:         {state}");
    out
}

pub fn render_images(images: &[ImageDetail]) -> String {
    if images.is_empty() {
        return "No images found".to_string();
    }

    let width = images
        .iter()
        .map(|i| i.display_tags().len())
        .max()
        .unwrap_or(0)
        .max("TAG".len());

    let mut out = format!("{:<width$}  PUSHED AT", "TAG");
    for image in images {
        let pushed = image
            .pushed_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(out, "\n{:<width$}  {}", image.display_tags(), pushed);
    }
    out
}

pub fn render_status(status: &ServiceStatus) -> String {
    format!(
        "Service:         {} ({})\nTask definition: {}\nTasks:           {}/{} running\nDeployments:     {}",
        status.name,
        status.status,
        status.task_definition,
        status.running_count,
        status.desired_count,
        status.deployments
    )
}
