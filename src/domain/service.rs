use std::fmt;

/// `family:revision` reference to a registered task definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinitionRef {
    pub family: String,
    pub revision: u64,
}

impl TaskDefinitionRef {
    pub fn new(family: &str, revision: u64) -> Self {
        Self {
            family: family.to_string(),
            revision,
        }
    }
}

impl fmt::Display for TaskDefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.revision)
    }
}

/// Snapshot of an ECS service as reported by `describe-services`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    pub status: String,
    pub task_definition: String,
    pub desired_count: u64,
    pub running_count: u64,
    pub deployments: usize,
}

impl ServiceStatus {
    /// Same condition as the `services-stable` waiter
    pub fn is_stable(&self) -> bool {
        self.deployments == 1 && self.running_count == self.desired_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Stable,
    TimedOut,
    Skipped,
}
