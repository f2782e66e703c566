//! Remote error classification.
//!
//! The remote reports most failures as free-text GraphQL error messages;
//! classification inspects that text for known substrings and falls back
//! to an unrecognized kind for anything else. The matching is deliberately
//! permissive and confined to this one function so it can be swapped for
//! structured error codes without touching call sites.

use crate::error::PmuError;

/// What a remote error message is understood to mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The referenced resource does not exist (or is not visible).
    NotFound,
    /// API rate limit exceeded.
    RateLimited,
    /// Missing or rejected credentials.
    AuthRequired,
    /// The relation being added already exists (child already has a parent).
    DuplicateRelation,
    /// The relation being removed does not exist.
    NoSuchRelation,
    /// Anything else.
    Unrecognized,
}

/// Classify a remote error message.
///
/// GraphQL error `type` codes (NOT_FOUND, RATE_LIMITED) arrive embedded in
/// the joined message text, so a single substring pass covers both the
/// structured and prose forms.
#[must_use]
pub fn classify(message: &str) -> RemoteErrorKind {
    let lowered = message.to_lowercase();

    if lowered.contains("rate limit") || message.contains("RATE_LIMITED") {
        return RemoteErrorKind::RateLimited;
    }
    if message.contains("401")
        || lowered.contains("authentication")
        || lowered.contains("bad credentials")
        || lowered.contains("not authenticated")
    {
        return RemoteErrorKind::AuthRequired;
    }
    if lowered.contains("duplicate") || lowered.contains("may only have one parent") {
        return RemoteErrorKind::DuplicateRelation;
    }
    if lowered.contains("not a sub-issue") || lowered.contains("sub-issue does not exist") {
        return RemoteErrorKind::NoSuchRelation;
    }
    if lowered.contains("could not resolve") || message.contains("NOT_FOUND") {
        return RemoteErrorKind::NotFound;
    }

    RemoteErrorKind::Unrecognized
}

/// Map a remote error message into the error taxonomy.
///
/// Rate-limit and auth failures map to their dedicated variants here
/// because they mean the same thing in every context; not-found and
/// relation errors stay as `Transport` so call sites can attach the
/// resource they were acting on.
#[must_use]
pub fn from_remote(message: String) -> PmuError {
    match classify(&message) {
        RemoteErrorKind::RateLimited => PmuError::RateLimited,
        RemoteErrorKind::AuthRequired => PmuError::AuthRequired,
        _ => PmuError::Transport { message },
    }
}

/// Does this error carry a remote not-found message?
#[must_use]
pub fn is_not_found(err: &PmuError) -> bool {
    match err {
        PmuError::IssueNotFound { .. } | PmuError::ProjectNotFound { .. } => true,
        PmuError::Transport { message } => classify(message) == RemoteErrorKind::NotFound,
        _ => false,
    }
}
