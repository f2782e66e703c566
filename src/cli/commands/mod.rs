//! Command implementations.

pub mod list;
pub mod mv;
pub mod projects;
pub mod split;
pub mod sub;
pub mod version;

use crate::api::Client;
use crate::config::Config;
use crate::error::{PmuError, Result};
use crate::model::{Project, RepoRef};
use crate::util::issue_ref::{IssueRef, ResolvedIssueRef};
use std::path::Path;

/// Load configuration from the working directory upward.
pub(crate) fn load_config() -> Result<Config> {
    Config::discover(Path::new("."))
}

/// Resolve an issue reference string against the configured default
/// repository.
pub(crate) fn resolve_ref(config: &Config, input: &str) -> Result<ResolvedIssueRef> {
    IssueRef::parse(input)?.with_default_repo(config.default_repo().as_ref())
}

/// Parse an `owner/repo` argument.
pub(crate) fn parse_repo(input: &str) -> Result<RepoRef> {
    RepoRef::parse(input).ok_or_else(|| {
        PmuError::validation("repo", format!("invalid repository '{input}' (expected owner/repo)"))
    })
}

/// Resolve the configured project.
pub(crate) fn resolve_project(client: &Client, config: &Config) -> Result<Project> {
    client.get_project(&config.project.owner, config.project.number)
}
