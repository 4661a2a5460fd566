use super::process::Program;
use crate::domain::SourceControl;
use crate::error::Result;
use std::ffi::OsStr;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct GitCli {
    git: Program,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            git: Program::new("git"),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceControl for GitCli {
    fn is_work_tree(&self, dir: &Path) -> bool {
        self.git
            .capture(
                [
                    OsStr::new("-C"),
                    dir.as_os_str(),
                    OsStr::new("rev-parse"),
                    OsStr::new("--is-inside-work-tree"),
                ],
                "checking for a git work tree",
            )
            .map(|out| out == "true")
            .unwrap_or(false)
    }

    fn head_commit(&self, dir: &Path) -> Result<String> {
        self.git.capture(
            [
                OsStr::new("-C"),
                dir.as_os_str(),
                OsStr::new("rev-parse"),
                OsStr::new("HEAD"),
            ],
            "reading current commit",
        )
    }
}
