use crate::domain::{ContainerOrchestrator, TaskDefinitionRef, WaitOutcome};
use crate::error::Result;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long and how often to poll for a stable service
#[derive(Debug, Clone, Copy)]
pub struct StabilityWait {
    pub enabled: bool,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

pub struct DeploymentController {
    orchestrator: Arc<dyn ContainerOrchestrator>,
    wait: StabilityWait,
}

impl DeploymentController {
    pub fn new(orchestrator: Arc<dyn ContainerOrchestrator>, wait: StabilityWait) -> Self {
        Self { orchestrator, wait }
    }

    /// Points `service` at `task_definition`, then blocks until it is stable
    /// or the wait times out. A timeout is reported, not raised.
    pub fn deploy(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &TaskDefinitionRef,
        force: bool,
    ) -> Result<WaitOutcome> {
        info!("Updating service {service} in {cluster} to {task_definition}");
        if force {
            debug!("Forcing a new deployment");
        }
        self.orchestrator
            .update_service(cluster, service, task_definition, force)?;

        if !self.wait.enabled {
            info!("Not waiting for {service} to stabilize");
            return Ok(WaitOutcome::Skipped);
        }

        Ok(self.wait_for_stable(cluster, service))
    }

    fn wait_for_stable(&self, cluster: &str, service: &str) -> WaitOutcome {
        info!(
            "Waiting up to {}s for {service} to become stable...",
            self.wait.timeout.as_secs()
        );
        // A timeout too large for `Instant` waits without a deadline
        let deadline = Instant::now().checked_add(self.wait.timeout);

        loop {
            match self.orchestrator.describe_service(cluster, service) {
                Ok(status) if status.is_stable() => {
                    info!(
                        "{service} is stable ({}/{} tasks running)",
                        status.running_count, status.desired_count
                    );
                    return WaitOutcome::Stable;
                }
                Ok(status) => debug!(
                    "{service}: {}/{} running, {} deployment(s)",
                    status.running_count, status.desired_count, status.deployments
                ),
                Err(e) => warn!("Failed to describe {service}: {e}"),
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!(
                            "{service} did not stabilize within {}s; the deployment may still be in progress",
                            self.wait.timeout.as_secs()
                        );
                        return WaitOutcome::TimedOut;
                    }
                    self.wait.poll_interval.min(deadline - now)
                }
                None => self.wait.poll_interval,
            };

            thread::sleep(pause);
        }
    }
}
