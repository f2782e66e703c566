//! Typed client for the remote project and issue API.
//!
//! The [`Client`] wraps the [`GraphQl`] transport seam with named, typed
//! operations. All resolution quirks live here:
//! - Owner-type fallback: a project owner login is tried as a user first,
//!   then as an organization
//! - Pagination via [`page::collect_pages`] for items and sub-issue lists
//! - Field-value normalization via [`fields::RawFieldValue`]
//!
//! Call sites receive model types only; wire shapes stay private.

pub mod errors;
pub mod fields;
pub mod page;
pub mod transport;

use crate::error::{PmuError, Result};
use crate::model::{
    Assignee, Issue, IssueState, Label, Milestone, OwnerType, Project, ProjectField, ProjectItem,
    RepoRef, SubIssue,
};
use crate::util::issue_ref::ResolvedIssueRef;
use fields::RawFieldValue;
use page::{collect_pages, Page};
use serde::Deserialize;
use serde_json::{json, Value};
use transport::{GitHubTransport, GraphQl};

/// Page size for paginated item and sub-issue queries.
const PAGE_SIZE: u32 = 50;

const USER_PROJECT_QUERY: &str = r"
query($owner: String!, $number: Int!) {
  user(login: $owner) {
    projectV2(number: $number) { id number title url closed }
  }
}";

const ORG_PROJECT_QUERY: &str = r"
query($owner: String!, $number: Int!) {
  organization(login: $owner) {
    projectV2(number: $number) { id number title url closed }
  }
}";

const USER_PROJECTS_QUERY: &str = r"
query($owner: String!) {
  user(login: $owner) {
    projectsV2(first: 100) {
      nodes { id number title url closed }
    }
  }
}";

const ORG_PROJECTS_QUERY: &str = r"
query($owner: String!) {
  organization(login: $owner) {
    projectsV2(first: 100) {
      nodes { id number title url closed }
    }
  }
}";

const PROJECT_FIELDS_QUERY: &str = r"
query($project: ID!) {
  node(id: $project) {
    ... on ProjectV2 {
      fields(first: 50) {
        nodes {
          ... on ProjectV2FieldCommon { id name dataType }
          ... on ProjectV2SingleSelectField { id name dataType options { id name } }
        }
      }
    }
  }
}";

const PROJECT_ITEMS_QUERY: &str = r"
query($project: ID!, $first: Int!, $cursor: String) {
  node(id: $project) {
    ... on ProjectV2 {
      items(first: $first, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          content {
            __typename
            ... on Issue {
              id number title body state url
              author { login }
              milestone { id title }
              labels(first: 50) { nodes { id name color } }
              assignees(first: 20) { nodes { id login } }
              parent { id }
              repository { nameWithOwner }
            }
          }
          fieldValues(first: 50) {
            nodes {
              __typename
              ... on ProjectV2ItemFieldSingleSelectValue {
                name
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldTextValue {
                text
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldNumberValue {
                number
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldIterationValue {
                title
                field { ... on ProjectV2FieldCommon { name } }
              }
            }
          }
        }
      }
    }
  }
}";

const ISSUE_QUERY: &str = r"
query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      id number title body state url
      author { login }
      milestone { id title }
      labels(first: 50) { nodes { id name color } }
      assignees(first: 20) { nodes { id login } }
      parent { id }
      repository { nameWithOwner }
    }
  }
}";

const SUB_ISSUES_QUERY: &str = r"
query($owner: String!, $name: String!, $number: Int!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      subIssues(first: $first, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes { id number title state url repository { nameWithOwner } }
      }
    }
  }
}";

const PARENT_ISSUE_QUERY: &str = r"
query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      parent { id number title state url repository { nameWithOwner } }
    }
  }
}";

const REPOSITORY_ID_QUERY: &str = r"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) { id }
}";

const CREATE_ISSUE_MUTATION: &str = r"
mutation($input: CreateIssueInput!) {
  createIssue(input: $input) {
    issue {
      id number title body state url
      author { login }
      milestone { id title }
      labels(first: 50) { nodes { id name color } }
      assignees(first: 20) { nodes { id login } }
      parent { id }
      repository { nameWithOwner }
    }
  }
}";

const ADD_SUB_ISSUE_MUTATION: &str = r"
mutation($parent: ID!, $child: ID!) {
  addSubIssue(input: { issueId: $parent, subIssueId: $child }) {
    issue { id }
  }
}";

const REMOVE_SUB_ISSUE_MUTATION: &str = r"
mutation($parent: ID!, $child: ID!) {
  removeSubIssue(input: { issueId: $parent, subIssueId: $child }) {
    issue { id }
  }
}";

const UPDATE_ITEM_FIELD_MUTATION: &str = r"
mutation($project: ID!, $item: ID!, $field: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: { projectId: $project, itemId: $item, fieldId: $field, value: $value }
  ) {
    projectV2Item { id }
  }
}";

// === Wire shapes (private) ===

#[derive(Debug, Deserialize)]
struct WireProject {
    id: String,
    number: u32,
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    closed: bool,
}

impl WireProject {
    fn into_project(self, owner: &str, owner_type: OwnerType) -> Project {
        Project {
            id: self.id,
            owner_login: owner.to_string(),
            owner_type,
            number: self.number,
            title: self.title,
            url: self.url,
            closed: self.closed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectHolder {
    #[serde(rename = "projectV2")]
    project: Option<WireProject>,
}

#[derive(Debug, Deserialize)]
struct ProjectsHolder {
    #[serde(rename = "projectsV2")]
    projects: Nodes<WireProject>,
}

#[derive(Debug, Deserialize)]
struct UserProjectData {
    user: Option<ProjectHolder>,
}

#[derive(Debug, Deserialize)]
struct OrgProjectData {
    organization: Option<ProjectHolder>,
}

#[derive(Debug, Deserialize)]
struct UserProjectsData {
    user: Option<ProjectsHolder>,
}

#[derive(Debug, Deserialize)]
struct OrgProjectsData {
    organization: Option<ProjectsHolder>,
}

/// A non-paginated node list. Entries the viewer cannot see arrive as
/// nulls and are dropped.
#[derive(Debug, Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

impl<T> Nodes<T> {
    fn into_vec(self) -> Vec<T> {
        self.nodes.into_iter().flatten().collect()
    }
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
    #[serde(rename = "pageInfo", default)]
    page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage", default)]
    has_next_page: bool,
    #[serde(rename = "endCursor", default)]
    end_cursor: Option<String>,
}

impl<T> Connection<T> {
    fn into_page<U>(self, convert: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            items: self
                .nodes
                .into_iter()
                .flatten()
                .filter_map(convert)
                .collect(),
            has_next: self.page_info.has_next_page,
            cursor: self.page_info.end_cursor,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireActor {
    #[serde(default)]
    login: String,
}

#[derive(Debug, Deserialize)]
struct WireMilestone {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    color: String,
}

#[derive(Debug, Deserialize)]
struct WireAssignee {
    #[serde(default)]
    id: String,
    login: String,
}

#[derive(Debug, Deserialize)]
struct WireNodeId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireRepository {
    #[serde(rename = "nameWithOwner")]
    name_with_owner: String,
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    id: String,
    number: u32,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: Option<WireActor>,
    #[serde(default)]
    milestone: Option<WireMilestone>,
    #[serde(default)]
    labels: Option<Nodes<WireLabel>>,
    #[serde(default)]
    assignees: Option<Nodes<WireAssignee>>,
    #[serde(default)]
    parent: Option<WireNodeId>,
    #[serde(default)]
    repository: Option<WireRepository>,
}

impl WireIssue {
    /// Convert to the model type. Returns `None` when the repository
    /// cannot be determined from either the payload or the fallback.
    fn into_issue(self, fallback_repo: Option<&RepoRef>) -> Option<Issue> {
        let repo = self
            .repository
            .and_then(|r| RepoRef::parse(&r.name_with_owner))
            .or_else(|| fallback_repo.cloned())?;
        Some(Issue {
            id: self.id,
            repo,
            number: self.number,
            title: self.title,
            body: self.body,
            state: IssueState::from_wire(&self.state),
            url: self.url,
            author_login: self.author.map(|a| a.login).unwrap_or_default(),
            milestone: self.milestone.map(|m| Milestone {
                id: m.id,
                title: m.title,
            }),
            labels: self
                .labels
                .map(Nodes::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(|l| Label {
                    id: l.id,
                    name: l.name,
                    color: l.color,
                })
                .collect(),
            assignees: self
                .assignees
                .map(Nodes::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(|a| Assignee {
                    id: a.id,
                    login: a.login,
                })
                .collect(),
            parent_id: self.parent.map(|p| p.id),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum WireContent {
    Issue(WireIssue),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: String,
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(rename = "fieldValues", default)]
    field_values: Option<FieldValuesHolder>,
}

#[derive(Debug, Deserialize)]
struct FieldValuesHolder {
    #[serde(default = "Vec::new")]
    nodes: Vec<RawFieldValue>,
}

impl WireItem {
    fn into_item(self) -> ProjectItem {
        let issue = match self.content {
            Some(WireContent::Issue(wire)) => wire.into_issue(None),
            _ => None,
        };
        ProjectItem {
            id: self.id,
            issue,
            field_values: self
                .field_values
                .map(|fv| fv.nodes)
                .unwrap_or_default()
                .into_iter()
                .filter_map(RawFieldValue::normalize)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "dataType", default)]
    data_type: String,
    #[serde(default = "Vec::new")]
    options: Vec<WireFieldOption>,
}

#[derive(Debug, Deserialize)]
struct WireFieldOption {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FieldsNodeData {
    node: Option<FieldsHolder>,
}

#[derive(Debug, Deserialize)]
struct FieldsHolder {
    fields: Nodes<WireField>,
}

#[derive(Debug, Deserialize)]
struct ItemsNodeData {
    node: Option<ItemsHolder>,
}

#[derive(Debug, Deserialize)]
struct ItemsHolder {
    items: Connection<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireSubIssue {
    id: String,
    number: u32,
    title: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    repository: Option<WireRepository>,
}

impl WireSubIssue {
    fn into_sub_issue(self, fallback_repo: &RepoRef) -> SubIssue {
        let repo = self
            .repository
            .and_then(|r| RepoRef::parse(&r.name_with_owner))
            .unwrap_or_else(|| fallback_repo.clone());
        SubIssue {
            id: self.id,
            repo,
            number: self.number,
            title: self.title,
            state: IssueState::from_wire(&self.state),
            url: self.url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IssueHolder {
    issue: Option<WireIssue>,
}

#[derive(Debug, Deserialize)]
struct SubIssuesIssueHolder {
    issue: Option<SubIssuesHolder>,
}

#[derive(Debug, Deserialize)]
struct SubIssuesHolder {
    #[serde(rename = "subIssues")]
    sub_issues: Connection<WireSubIssue>,
}

#[derive(Debug, Deserialize)]
struct ParentIssueHolder {
    issue: Option<ParentHolder>,
}

#[derive(Debug, Deserialize)]
struct ParentHolder {
    #[serde(default)]
    parent: Option<WireSubIssue>,
}

#[derive(Debug, Deserialize)]
struct CreateIssueData {
    #[serde(rename = "createIssue")]
    create_issue: Option<CreatedIssueHolder>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssueHolder {
    issue: Option<WireIssue>,
}

// === Public request types ===

/// Payload for issue creation. Empty collections and `None` fields are
/// omitted from the mutation input.
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub label_ids: Vec<String>,
    pub assignee_ids: Vec<String>,
    pub milestone_id: Option<String>,
}

/// Value payload for a project field update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdateValue {
    /// Select an option of a single-select field by option ID.
    SingleSelectOption(String),
    /// Set a text field to a literal.
    Text(String),
}

impl FieldUpdateValue {
    fn to_value(&self) -> Value {
        match self {
            Self::SingleSelectOption(id) => json!({ "singleSelectOptionId": id }),
            Self::Text(text) => json!({ "text": text }),
        }
    }
}

/// Typed remote client over an opaque [`GraphQl`] transport.
pub struct Client {
    gql: Box<dyn GraphQl>,
}

impl Client {
    /// Build a client over the given transport.
    #[must_use]
    pub fn new(gql: Box<dyn GraphQl>) -> Self {
        Self { gql }
    }

    /// Build a client against the real API, authenticating from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no token is available.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Box::new(GitHubTransport::from_env()?)))
    }

    /// Resolve a project by owner login and number.
    ///
    /// The login is tried as a user first; any user-side failure falls
    /// through to an organization lookup. Auth and rate-limit failures
    /// abort immediately since retrying under the other owner type cannot
    /// help.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` carrying both causes when neither lookup
    /// succeeds.
    pub fn get_project(&self, owner: &str, number: u32) -> Result<Project> {
        let user_cause = match self.get_project_as(owner, number, OwnerType::User) {
            Ok(project) => return Ok(project),
            Err(err @ (PmuError::AuthRequired | PmuError::RateLimited)) => return Err(err),
            Err(err) => err.to_string(),
        };

        tracing::debug!(owner, "user project lookup failed, retrying as organization");
        match self.get_project_as(owner, number, OwnerType::Organization) {
            Ok(project) => Ok(project),
            Err(err @ (PmuError::AuthRequired | PmuError::RateLimited)) => Err(err),
            Err(org_err) => Err(PmuError::ProjectNotFound {
                owner: owner.to_string(),
                number,
                user_cause,
                org_cause: org_err.to_string(),
            }),
        }
    }

    fn get_project_as(&self, owner: &str, number: u32, owner_type: OwnerType) -> Result<Project> {
        let variables = json!({ "owner": owner, "number": number });
        let holder = match owner_type {
            OwnerType::User => {
                let data = self
                    .gql
                    .query("GetUserProject", USER_PROJECT_QUERY, variables)?;
                let parsed: UserProjectData = serde_json::from_value(data)?;
                parsed.user.ok_or_else(|| PmuError::Transport {
                    message: format!("no user named '{owner}'"),
                })?
            }
            OwnerType::Organization => {
                let data = self
                    .gql
                    .query("GetOrgProject", ORG_PROJECT_QUERY, variables)?;
                let parsed: OrgProjectData = serde_json::from_value(data)?;
                parsed.organization.ok_or_else(|| PmuError::Transport {
                    message: format!("no organization named '{owner}'"),
                })?
            }
        };

        let wire = holder.project.ok_or_else(|| PmuError::Transport {
            message: format!("{owner_type} '{owner}' has no project {number}"),
        })?;
        Ok(wire.into_project(owner, owner_type))
    }

    /// List a login's open projects.
    ///
    /// The user listing is tried first; the organization listing is used
    /// both when the user listing fails and when it succeeds with zero
    /// results, since an organization login often resolves as a user with
    /// no projects. Closed projects are filtered out.
    ///
    /// # Errors
    ///
    /// Returns an error only when no listing succeeds under either owner
    /// type.
    pub fn list_projects(&self, owner: &str) -> Result<Vec<Project>> {
        let user_attempt = match self.list_projects_as(owner, OwnerType::User) {
            Ok(projects) if !projects.is_empty() => return Ok(projects),
            Err(err @ (PmuError::AuthRequired | PmuError::RateLimited)) => return Err(err),
            Ok(empty) => Ok(empty),
            Err(err) => Err(err.to_string()),
        };

        match self.list_projects_as(owner, OwnerType::Organization) {
            Ok(projects) => Ok(projects),
            Err(err @ (PmuError::AuthRequired | PmuError::RateLimited)) => Err(err),
            Err(org_err) => match user_attempt {
                // A user listing that succeeded empty stands when the
                // login is not an organization at all.
                Ok(empty) => Ok(empty),
                Err(user_cause) => Err(PmuError::Transport {
                    message: format!(
                        "failed to list projects for '{owner}' (as user: {user_cause}; as organization: {org_err})"
                    ),
                }),
            },
        }
    }

    fn list_projects_as(&self, owner: &str, owner_type: OwnerType) -> Result<Vec<Project>> {
        let variables = json!({ "owner": owner });
        let holder = match owner_type {
            OwnerType::User => {
                let data = self
                    .gql
                    .query("ListUserProjects", USER_PROJECTS_QUERY, variables)?;
                let parsed: UserProjectsData = serde_json::from_value(data)?;
                parsed.user.ok_or_else(|| PmuError::Transport {
                    message: format!("no user named '{owner}'"),
                })?
            }
            OwnerType::Organization => {
                let data = self
                    .gql
                    .query("ListOrgProjects", ORG_PROJECTS_QUERY, variables)?;
                let parsed: OrgProjectsData = serde_json::from_value(data)?;
                parsed.organization.ok_or_else(|| PmuError::Transport {
                    message: format!("no organization named '{owner}'"),
                })?
            }
        };

        Ok(holder
            .projects
            .into_vec()
            .into_iter()
            .filter(|p| !p.closed)
            .map(|p| p.into_project(owner, owner_type))
            .collect())
    }

    /// Fetch the field definitions of a project.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the project node does not resolve.
    pub fn get_project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>> {
        let data = self.gql.query(
            "GetProjectFields",
            PROJECT_FIELDS_QUERY,
            json!({ "project": project_id }),
        )?;
        let parsed: FieldsNodeData = serde_json::from_value(data)?;
        let holder = parsed.node.ok_or_else(|| PmuError::Transport {
            message: format!("project node '{project_id}' not found"),
        })?;

        Ok(holder
            .fields
            .into_vec()
            .into_iter()
            .filter(|f| !f.id.is_empty())
            .map(|f| ProjectField {
                id: f.id,
                name: f.name,
                data_type: f.data_type,
                options: f
                    .options
                    .into_iter()
                    .map(|o| crate::model::FieldOption {
                        id: o.id,
                        name: o.name,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Fetch every issue-backed item of a project, walking all pages.
    ///
    /// Non-issue content (drafts, pull requests) is skipped. With a
    /// repository filter, only items whose issue lives in that repository
    /// are kept.
    ///
    /// # Errors
    ///
    /// Any page fetch error aborts the whole collection.
    pub fn get_project_items(
        &self,
        project_id: &str,
        repo_filter: Option<&RepoRef>,
    ) -> Result<Vec<ProjectItem>> {
        collect_pages(
            |cursor| {
                let data = self.gql.query(
                    "GetProjectItems",
                    PROJECT_ITEMS_QUERY,
                    json!({ "project": project_id, "first": PAGE_SIZE, "cursor": cursor }),
                )?;
                let parsed: ItemsNodeData = serde_json::from_value(data)?;
                let holder = parsed.node.ok_or_else(|| PmuError::Transport {
                    message: format!("project node '{project_id}' not found"),
                })?;
                Ok(holder.items.into_page(|wire| Some(wire.into_item())))
            },
            |item: &ProjectItem| {
                item.issue
                    .as_ref()
                    .is_some_and(|issue| repo_filter.map_or(true, |repo| issue.repo == *repo))
            },
        )
    }

    /// Fetch a single issue with full detail.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` when the repository or issue does not
    /// resolve.
    pub fn get_issue(&self, issue: &ResolvedIssueRef) -> Result<Issue> {
        let not_found = || PmuError::IssueNotFound {
            reference: issue.to_string(),
        };
        let data = self
            .gql
            .query(
                "GetIssue",
                ISSUE_QUERY,
                json!({
                    "owner": issue.repo.owner,
                    "name": issue.repo.name,
                    "number": issue.number,
                }),
            )
            .map_err(|err| {
                if errors::is_not_found(&err) {
                    not_found()
                } else {
                    err
                }
            })?;
        let parsed: RepositoryData<IssueHolder> = serde_json::from_value(data)?;
        let wire = parsed
            .repository
            .and_then(|r| r.issue)
            .ok_or_else(not_found)?;
        wire.into_issue(Some(&issue.repo)).ok_or_else(not_found)
    }

    /// Fetch the direct children of an issue, walking all pages.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` when the parent does not resolve.
    pub fn get_sub_issues(&self, issue: &ResolvedIssueRef) -> Result<Vec<SubIssue>> {
        collect_pages(
            |cursor| {
                let data = self
                    .gql
                    .query(
                        "GetSubIssues",
                        SUB_ISSUES_QUERY,
                        json!({
                            "owner": issue.repo.owner,
                            "name": issue.repo.name,
                            "number": issue.number,
                            "first": PAGE_SIZE,
                            "cursor": cursor,
                        }),
                    )
                    .map_err(|err| {
                        if errors::is_not_found(&err) {
                            PmuError::IssueNotFound {
                                reference: issue.to_string(),
                            }
                        } else {
                            err
                        }
                    })?;
                let parsed: RepositoryData<SubIssuesIssueHolder> = serde_json::from_value(data)?;
                let holder = parsed.repository.and_then(|r| r.issue).ok_or_else(|| {
                    PmuError::IssueNotFound {
                        reference: issue.to_string(),
                    }
                })?;
                Ok(holder
                    .sub_issues
                    .into_page(|wire| Some(wire.into_sub_issue(&issue.repo))))
            },
            |_| true,
        )
    }

    /// Fetch the parent of an issue, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` when the issue itself does not resolve; a
    /// root issue yields `Ok(None)`.
    pub fn get_parent_issue(&self, issue: &ResolvedIssueRef) -> Result<Option<SubIssue>> {
        let data = self
            .gql
            .query(
                "GetParentIssue",
                PARENT_ISSUE_QUERY,
                json!({
                    "owner": issue.repo.owner,
                    "name": issue.repo.name,
                    "number": issue.number,
                }),
            )
            .map_err(|err| {
                if errors::is_not_found(&err) {
                    PmuError::IssueNotFound {
                        reference: issue.to_string(),
                    }
                } else {
                    err
                }
            })?;
        let parsed: RepositoryData<ParentIssueHolder> = serde_json::from_value(data)?;
        let holder = parsed
            .repository
            .and_then(|r| r.issue)
            .ok_or_else(|| PmuError::IssueNotFound {
                reference: issue.to_string(),
            })?;
        Ok(holder
            .parent
            .map(|wire| wire.into_sub_issue(&issue.repo)))
    }

    /// Resolve a repository to its node ID.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the repository does not resolve.
    pub fn repo_id(&self, repo: &RepoRef) -> Result<String> {
        let data = self.gql.query(
            "GetRepositoryId",
            REPOSITORY_ID_QUERY,
            json!({ "owner": repo.owner, "name": repo.name }),
        )?;
        let parsed: RepositoryData<WireNodeId> = serde_json::from_value(data)?;
        parsed
            .repository
            .map(|r| r.id)
            .ok_or_else(|| PmuError::Transport {
                message: format!("repository '{repo}' not found"),
            })
    }

    /// Create an issue in a repository.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the mutation fails or returns no
    /// issue.
    pub fn create_issue(&self, repository_id: &str, new: &NewIssue) -> Result<Issue> {
        let mut input = serde_json::Map::new();
        input.insert("repositoryId".to_string(), json!(repository_id));
        input.insert("title".to_string(), json!(new.title));
        if !new.body.is_empty() {
            input.insert("body".to_string(), json!(new.body));
        }
        if !new.label_ids.is_empty() {
            input.insert("labelIds".to_string(), json!(new.label_ids));
        }
        if !new.assignee_ids.is_empty() {
            input.insert("assigneeIds".to_string(), json!(new.assignee_ids));
        }
        if let Some(milestone_id) = &new.milestone_id {
            input.insert("milestoneId".to_string(), json!(milestone_id));
        }

        let data = self.gql.mutate(
            "CreateIssue",
            CREATE_ISSUE_MUTATION,
            json!({ "input": input }),
        )?;
        let parsed: CreateIssueData = serde_json::from_value(data)?;
        parsed
            .create_issue
            .and_then(|c| c.issue)
            .and_then(|wire| wire.into_issue(None))
            .ok_or_else(|| PmuError::Transport {
                message: "issue creation returned no issue".to_string(),
            })
    }

    /// Link a child issue under a parent.
    ///
    /// # Errors
    ///
    /// Propagates the remote error verbatim; relation classification is
    /// the hierarchy layer's job.
    pub fn add_sub_issue(&self, parent_id: &str, child_id: &str) -> Result<()> {
        self.gql.mutate(
            "AddSubIssue",
            ADD_SUB_ISSUE_MUTATION,
            json!({ "parent": parent_id, "child": child_id }),
        )?;
        Ok(())
    }

    /// Unlink a child issue from a parent.
    ///
    /// # Errors
    ///
    /// Propagates the remote error verbatim.
    pub fn remove_sub_issue(&self, parent_id: &str, child_id: &str) -> Result<()> {
        self.gql.mutate(
            "RemoveSubIssue",
            REMOVE_SUB_ISSUE_MUTATION,
            json!({ "parent": parent_id, "child": child_id }),
        )?;
        Ok(())
    }

    /// Set one field value on one project item.
    ///
    /// # Errors
    ///
    /// Propagates the remote error verbatim.
    pub fn update_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &FieldUpdateValue,
    ) -> Result<()> {
        self.gql.mutate(
            "UpdateItemField",
            UPDATE_ITEM_FIELD_MUTATION,
            json!({
                "project": project_id,
                "item": item_id,
                "field": field_id,
                "value": value.to_value(),
            }),
        )?;
        Ok(())
    }
}
