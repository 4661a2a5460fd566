use crate::error::{DeployError, Result};
use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Thin wrapper around one external program (`git`, `docker`, `aws`)
#[derive(Debug, Clone)]
pub struct Program {
    name: String,
}

impl Program {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Runs with inherited stdout/stderr so build and push progress stays visible
    pub fn run<I, S>(&self, args: I, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(args);
        let status = cmd.status().map_err(|source| self.spawn_error(context, source))?;

        if status.success() {
            return Ok(());
        }

        Err(DeployError::CommandFailed {
            program: self.name.clone(),
            context: context.to_string(),
            status: status.to_string(),
            stderr: String::new(),
        })
    }

    /// Runs and returns trimmed stdout, failing on a non-zero exit
    pub fn capture<I, S>(&self, args: I, context: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(args, context)?;
        self.ensure_success(&output, context)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Runs and returns the raw output regardless of exit status
    pub fn output<I, S>(&self, args: I, context: &str) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| self.spawn_error(context, source))
    }

    /// Runs with `input` written to stdin, used for secrets that must not reach argv
    pub fn run_with_stdin<I, S>(&self, args: I, input: &str, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(context, source))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| self.spawn_error(context, source))?;
        self.ensure_success(&output, context)
    }

    /// `<program> --version` exits successfully
    pub fn is_available(&self) -> bool {
        Command::new(&self.name)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    pub fn ensure_success(&self, output: &Output, context: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        Err(DeployError::CommandFailed {
            program: self.name.clone(),
            context: context.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|item| item.as_ref().to_os_string())
            .collect();
        debug!("$ {} {}", self.name, render_args(&args));

        let mut cmd = Command::new(&self.name);
        cmd.args(args);
        cmd
    }

    fn spawn_error(&self, context: &str, source: std::io::Error) -> DeployError {
        DeployError::Spawn {
            program: self.name.clone(),
            context: context.to_string(),
            source,
        }
    }
}

fn render_args(args: &[std::ffi::OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
