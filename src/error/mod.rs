//! Error types and handling for `pmu`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for wrapped one-off errors
//! - Provides recovery hints for user-facing errors
//! - One exit-code convention: 0 on full success, 1 on any failure
//!
//! Remote failures are classified into this taxonomy by
//! [`crate::api::errors::classify`]; validation errors are always raised
//! before any remote call is made.

use thiserror::Error;

/// Primary error type for `pmu` operations.
#[derive(Error, Debug)]
pub enum PmuError {
    // === Resolution errors ===
    /// Project could not be resolved under either owner type.
    ///
    /// Both causes are retained for diagnostics: the owner login is
    /// ambiguous between a user and an organization until one lookup
    /// succeeds.
    #[error("project {owner}/{number} not found (as user: {user_cause}; as organization: {org_cause})")]
    ProjectNotFound {
        owner: String,
        number: u32,
        user_cause: String,
        org_cause: String,
    },

    /// Issue reference did not resolve to an issue.
    #[error("issue not found: {reference}")]
    IssueNotFound { reference: String },

    /// Issue exists but is not an item of the configured project.
    #[error("issue {reference} is not in the project")]
    NotInProject { reference: String },

    // === Hierarchy errors ===
    /// Child already has a parent (issues can only have one).
    #[error("issue {child} is already a sub-issue (issues can only have one parent)")]
    AlreadyLinked { child: String },

    /// No parent/child relation exists between the two issues.
    #[error("issue {child} is not a sub-issue of {parent}")]
    NotLinked { parent: String, child: String },

    // === Remote errors ===
    /// Remote API rate limit hit. Never retried by the core.
    #[error("API rate limit exceeded")]
    RateLimited,

    /// No usable credentials for the remote API.
    #[error("not authenticated: set GITHUB_TOKEN (or GH_TOKEN)")]
    AuthRequired,

    /// Unrecognized remote failure, carried verbatim.
    #[error("remote error: {message}")]
    Transport { message: String },

    // === Local errors ===
    /// Input validation failed. Raised before any remote call.
    #[error("validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A bulk operation finished with at least one failed target.
    ///
    /// Per-target outcomes are itemized by the caller before this is
    /// raised; the variant only carries the aggregate.
    #[error("{failed} of {total} targets failed")]
    PartialFailure { failed: usize, total: usize },

    /// Configuration file error.
    #[error("configuration error: {0}")]
    Config(String),

    // === Wrapped errors ===
    /// HTTP-level transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PmuError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. }
                | Self::IssueNotFound { .. }
                | Self::NotInProject { .. }
                | Self::AlreadyLinked { .. }
                | Self::NotLinked { .. }
                | Self::AuthRequired
                | Self::Validation { .. }
                | Self::Config(_)
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::AuthRequired => Some("Export GITHUB_TOKEN with a token that has project scope"),
            Self::ProjectNotFound { .. } => {
                Some("Check the owner login and project number in .pmu.yml")
            }
            Self::IssueNotFound { .. } => {
                Some("Use 'owner/repo#123' for issues outside the configured repository")
            }
            Self::AlreadyLinked { .. } => {
                Some("Remove the existing parent link first: pmu sub remove <parent> <child>")
            }
            Self::RateLimited => Some("Wait for the rate-limit window to reset and retry"),
            Self::Config(_) => Some("Check .pmu.yml in the repository root"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `PmuError`.
pub type Result<T> = std::result::Result<T, PmuError>;
