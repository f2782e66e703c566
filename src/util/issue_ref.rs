//! Issue reference parsing.
//!
//! Accepted forms:
//! - `123` — bare number, repository comes from configuration
//! - `#123` — same, with marker prefix
//! - `owner/repo#123` — fully qualified, cross-repo capable

use crate::error::{PmuError, Result};
use crate::model::RepoRef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static FULL_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9-]*)/([A-Za-z0-9._-]+)#(\d+)$").unwrap());

/// A parsed issue reference. The repository is absent for bare numbers
/// until [`IssueRef::with_default_repo`] fills it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub repo: Option<RepoRef>,
    pub number: u32,
}

impl IssueRef {
    /// Parse a reference string.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the input matches none of the
    /// accepted forms.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if let Some(caps) = FULL_REF.captures(trimmed) {
            let number = caps[3]
                .parse()
                .map_err(|_| invalid_reference(trimmed))?;
            return Ok(Self {
                repo: Some(RepoRef::new(&caps[1], &caps[2])),
                number,
            });
        }

        let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !bare.is_empty() && bare.chars().all(|c| c.is_ascii_digit()) {
            let number = bare.parse().map_err(|_| invalid_reference(trimmed))?;
            return Ok(Self { repo: None, number });
        }

        Err(invalid_reference(trimmed))
    }

    /// Fill in the repository from configuration when the reference was a
    /// bare number.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no repository is available from
    /// either source.
    pub fn with_default_repo(self, default: Option<&RepoRef>) -> Result<ResolvedIssueRef> {
        let repo = match self.repo {
            Some(repo) => repo,
            None => default.cloned().ok_or_else(|| {
                PmuError::validation(
                    "issue",
                    "no repository specified and none configured in .pmu.yml",
                )
            })?,
        };
        Ok(ResolvedIssueRef {
            repo,
            number: self.number,
        })
    }
}

/// A reference with the repository fully determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIssueRef {
    pub repo: RepoRef,
    pub number: u32,
}

impl fmt::Display for ResolvedIssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

fn invalid_reference(input: &str) -> PmuError {
    PmuError::validation(
        "issue",
        format!("invalid issue reference '{input}' (expected 123, #123, or owner/repo#123)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        let r = IssueRef::parse("42").unwrap();
        assert_eq!(r.repo, None);
        assert_eq!(r.number, 42);
    }

    #[test]
    fn test_parse_hash_prefix() {
        let r = IssueRef::parse("#42").unwrap();
        assert_eq!(r.repo, None);
        assert_eq!(r.number, 42);
    }

    #[test]
    fn test_parse_full_reference() {
        let r = IssueRef::parse("acme/widgets#7").unwrap();
        assert_eq!(r.repo, Some(RepoRef::new("acme", "widgets")));
        assert_eq!(r.number, 7);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(IssueRef::parse("").is_err());
        assert!(IssueRef::parse("abc").is_err());
        assert!(IssueRef::parse("acme/widgets").is_err());
        assert!(IssueRef::parse("acme#12").is_err());
    }

    #[test]
    fn test_default_repo_fills_bare_reference() {
        let default = RepoRef::new("acme", "widgets");
        let resolved = IssueRef::parse("9")
            .unwrap()
            .with_default_repo(Some(&default))
            .unwrap();
        assert_eq!(resolved.to_string(), "acme/widgets#9");
    }

    #[test]
    fn test_explicit_repo_wins_over_default() {
        let default = RepoRef::new("acme", "widgets");
        let resolved = IssueRef::parse("other/repo#3")
            .unwrap()
            .with_default_repo(Some(&default))
            .unwrap();
        assert_eq!(resolved.repo, RepoRef::new("other", "repo"));
    }

    #[test]
    fn test_bare_reference_without_default_errors() {
        let err = IssueRef::parse("9")
            .unwrap()
            .with_default_repo(None)
            .unwrap_err();
        assert!(err.to_string().contains("none configured"));
    }
}
