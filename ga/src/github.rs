//! GitHub project verification
//!
//! Only the configuration side exists today: the session reports whether a
//! repository is attached. Checking the project against the repository is
//! not implemented and never touches the network.

use tracing::{debug, info};

use crate::config::GithubConfig;

/// Message shown for every verification request
pub const NOT_AVAILABLE: &str = "Project verification is not available yet.";

/// Whether a repository is attached to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    /// Owner, repo or token missing
    Offline,
    Configured { owner: String, repo: String },
}

impl RepoStatus {
    /// Resolve the status from config and the token environment variable
    pub fn from_config(config: &GithubConfig) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let owner = non_blank(config.owner.as_deref());
        let repo = non_blank(config.repo.as_deref());

        match (owner, repo, token) {
            (Some(owner), Some(repo), Some(_)) => {
                debug!(%owner, %repo, "RepoStatus::from_config: repository configured");
                RepoStatus::Configured { owner, repo }
            }
            _ => {
                debug!("RepoStatus::from_config: offline");
                RepoStatus::Offline
            }
        }
    }

    /// One-line description for startup output
    pub fn describe(&self) -> String {
        match self {
            RepoStatus::Offline => "Offline mode (no GitHub repository)".to_string(),
            RepoStatus::Configured { owner, repo } => format!("GitHub repository: {}/{}", owner, repo),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Outcome of a verification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub status: RepoStatus,
    pub message: String,
}

/// Check the project against the configured repository
pub fn verify_project(config: &GithubConfig) -> VerificationReport {
    let status = RepoStatus::from_config(config);
    info!(status = %status.describe(), "Project verification requested");
    VerificationReport {
        status,
        message: NOT_AVAILABLE.to_string(),
    }
}
