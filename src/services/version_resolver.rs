use crate::domain::{RevisionId, SourceControl};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub struct VersionResolver {
    vcs: Arc<dyn SourceControl>,
    work_tree: PathBuf,
}

impl VersionResolver {
    pub fn new(vcs: Arc<dyn SourceControl>, work_tree: PathBuf) -> Self {
        Self { vcs, work_tree }
    }

    pub fn resolve(&self) -> Result<RevisionId> {
        let commit = self.vcs.head_commit(&self.work_tree)?;
        RevisionId::from_commit(&commit)
    }
}
