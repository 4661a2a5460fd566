use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("required command `{0}` not found in PATH")]
    MissingDependency(String),

    #[error("{0:?} is not inside a git work tree")]
    NotARepository(PathBuf),

    #[error("failed to launch `{program}` while {context}: {source}")]
    Spawn {
        program: String,
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status} while {context}{}", stderr_suffix(.stderr))]
    CommandFailed {
        program: String,
        context: String,
        status: String,
        stderr: String,
    },

    #[error("invalid commit id {0:?}")]
    InvalidCommit(String),

    #[error("invalid repository uri {0:?} (expected <registry-host>/<repository-name>)")]
    InvalidRepository(String),

    #[error("rollback tag must not be empty")]
    EmptyRollbackTag,

    #[error(
        "image tag `{tag}` not found in repository {repository}; run `ecsdeploy list-images` to see available tags"
    )]
    TagNotFound { tag: String, repository: String },

    #[error("malformed task definition: {0}")]
    MalformedDocument(String),

    #[error("unexpected output from `{program}`: {reason}")]
    UnexpectedOutput { program: String, reason: String },

    #[error("missing setting `{0}`; pass it as a flag, environment variable or in ecsdeploy.toml")]
    MissingSetting(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

impl DeployError {
    pub fn unexpected_output(program: &str, reason: impl Into<String>) -> Self {
        Self::UnexpectedOutput {
            program: program.to_string(),
            reason: reason.into(),
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
