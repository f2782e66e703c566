//! Core data types for `pmu`.
//!
//! This module defines the canonical snapshots fetched per invocation:
//! - `Project` - A Projects v2 board, identified by node ID once resolved
//! - `Issue` - A repository issue with hierarchy back-reference
//! - `ProjectItem` - A board entry tying an issue to field values
//! - `FieldValue` - The normalized (field name, value) pair
//! - `SubIssue` - A hierarchy listing entry
//!
//! Nothing here persists across invocations; every entity is a read-only
//! snapshot of remote state at fetch time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a project owner login names a user or an organization.
///
/// An `(owner login, project number)` pair is ambiguous until one of the
/// two lookups succeeds; the resolved type is recorded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerType {
    User,
    Organization,
}

impl OwnerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Organization => "Organization",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved Projects v2 board.
///
/// Identity is `id` once resolved; `(owner_login, number)` alone is not a
/// stable identity because the owner type is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub owner_login: String,
    pub owner_type: OwnerType,
    pub number: u32,
    pub title: String,
    pub url: String,
    pub closed: bool,
}

/// Repository coordinates, rendered as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`. Returns `None` when the slash is missing or a
    /// side is empty.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (owner, name) = s.split_once('/')?;
        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Issue lifecycle state. The remote wire strings are `OPEN`/`CLOSED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl IssueState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Parse a wire state string, tolerating unknown values as open.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        if s.eq_ignore_ascii_case("closed") {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl StateFilter {
    /// Does an issue state pass this filter?
    #[must_use]
    pub const fn matches(self, state: IssueState) -> bool {
        match self {
            Self::Open => matches!(state, IssueState::Open),
            Self::Closed => matches!(state, IssueState::Closed),
            Self::All => true,
        }
    }
}

impl FromStr for StateFilter {
    type Err = crate::error::PmuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" | "" => Ok(Self::All),
            other => Err(crate::error::PmuError::validation(
                "state",
                format!("unknown state filter '{other}' (open, closed, all)"),
            )),
        }
    }
}

/// An issue label. The node ID is kept so inheritance can re-apply the
/// label when creating a child in the same repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// An issue assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(default)]
    pub id: String,
    pub login: String,
}

/// An issue milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub id: String,
    pub title: String,
}

/// A repository issue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub repo: RepoRef,
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub state: IssueState,
    pub url: String,
    #[serde(default)]
    pub author_login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<Assignee>,
    /// Weak back-reference to the parent issue, when linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Issue {
    /// Short `owner/repo#number` reference for display.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }
}

/// A normalized project field value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub field: String,
    pub value: String,
}

/// A project-board entry tied to an issue.
///
/// `issue` is `None` for non-issue content (draft issues, pull requests);
/// consumers skip those. `field_values` preserves every normalized entry,
/// including duplicate names differing only by case — case-insensitive
/// matching is a consumer responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: String,
    pub issue: Option<Issue>,
    #[serde(default)]
    pub field_values: Vec<FieldValue>,
}

impl ProjectItem {
    /// First value whose field name matches case-insensitively.
    #[must_use]
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.field_values
            .iter()
            .find(|fv| fv.field.eq_ignore_ascii_case(name))
            .map(|fv| fv.value.as_str())
    }
}

/// A single option of a single-select project field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

/// A project field definition, used when addressing mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl ProjectField {
    /// Look up a select option by display name, case-insensitively.
    #[must_use]
    pub fn option_named(&self, name: &str) -> Option<&FieldOption> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }
}

/// A sub-issue entry in a hierarchy listing. Carries its repository so
/// cross-repo children render unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubIssue {
    pub id: String,
    pub repo: RepoRef,
    pub number: u32,
    pub title: String,
    pub state: IssueState,
    pub url: String,
}

impl SubIssue {
    /// Short `owner/repo#number` reference for display.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }
}
