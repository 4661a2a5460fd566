use crate::error::{DeployError, Result};
use chrono::{DateTime, Utc};
use std::fmt;

pub const LATEST_TAG: &str = "latest";
pub const REVISION_ID_LEN: usize = 7;

/// Short commit-derived tag identifying one built image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId(String);

impl RevisionId {
    /// Keeps the first 7 characters of a full commit id
    pub fn from_commit(commit: &str) -> Result<Self> {
        let commit = commit.trim();
        if commit.len() < REVISION_ID_LEN || !commit.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DeployError::InvalidCommit(commit.to_string()));
        }
        Ok(Self(commit[..REVISION_ID_LEN].to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `<registry-host>/<repository-name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUri {
    uri: String,
    split: usize,
}

impl RepositoryUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim().trim_end_matches('/');
        let split = uri
            .find('/')
            .ok_or_else(|| DeployError::InvalidRepository(uri.to_string()))?;

        let (host, name) = (&uri[..split], &uri[split + 1..]);
        if host.is_empty() || name.is_empty() || name.contains(':') {
            return Err(DeployError::InvalidRepository(uri.to_string()));
        }

        Ok(Self {
            uri: uri.to_string(),
            split,
        })
    }

    /// Host used for `docker login`
    pub fn registry_host(&self) -> &str {
        &self.uri[..self.split]
    }

    /// Repository name used for registry queries
    pub fn repository_name(&self) -> &str {
        &self.uri[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn image(&self, tag: &str) -> ImageRef {
        ImageRef(format!("{}:{}", self.uri, tag))
    }

    pub fn latest(&self) -> ImageRef {
        self.image(LATEST_TAG)
    }
}

impl fmt::Display for RepositoryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Fully qualified `REPOSITORY:TAG`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetail {
    pub tags: Vec<String>,
    pub digest: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub size_bytes: Option<u64>,
}

impl ImageDetail {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn display_tags(&self) -> String {
        if self.tags.is_empty() {
            "<untagged>".to_string()
        } else {
            self.tags.join(", ")
        }
    }
}

/// Newest first, images without a push time last
pub fn most_recent(mut images: Vec<ImageDetail>, limit: usize) -> Vec<ImageDetail> {
    images.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
    images.truncate(limit);
    images
}
