//! Parent/child issue hierarchy operations.
//!
//! Everything here works on resolved issue references and node IDs; the
//! remote is the single source of truth and no relation state is cached
//! between calls. Relation-shaped remote failures are mapped to their
//! dedicated error variants here, with the issues involved attached.

use crate::api::errors::{classify, RemoteErrorKind};
use crate::api::{Client, NewIssue};
use crate::error::{PmuError, Result};
use crate::model::{Issue, RepoRef, StateFilter, SubIssue};
use crate::util::issue_ref::ResolvedIssueRef;
use std::collections::{HashSet, VecDeque};

/// Depth cap for descendant traversal when the caller does not set one.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Which relatives of an issue to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Children,
    Parent,
    Siblings,
}

impl std::str::FromStr for Relation {
    type Err = PmuError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "children" | "" => Ok(Self::Children),
            "parent" => Ok(Self::Parent),
            "siblings" => Ok(Self::Siblings),
            other => Err(PmuError::validation(
                "relation",
                format!("unknown relation '{other}' (children, parent, siblings)"),
            )),
        }
    }
}

/// Options for creating a child issue under a parent.
///
/// Inheritance only applies when the child lands in the parent's own
/// repository; labels and milestones are repository-scoped node IDs and
/// cannot cross over.
#[derive(Debug, Clone)]
pub struct CreateChildOpts {
    pub title: String,
    pub body: String,
    /// Target repository; `None` means the parent's repository.
    pub target_repo: Option<RepoRef>,
    pub inherit_labels: bool,
    pub inherit_assignees: bool,
    pub inherit_milestone: bool,
}

impl Default for CreateChildOpts {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            target_repo: None,
            inherit_labels: true,
            inherit_assignees: false,
            inherit_milestone: true,
        }
    }
}

/// Outcome of a create-and-link operation.
///
/// Creation and linking are two remote writes with no transaction across
/// them; when the link fails the created issue is kept and the failure is
/// surfaced as a warning instead of an error.
#[derive(Debug, Clone)]
pub struct ChildCreation {
    pub issue: Issue,
    pub link_warning: Option<String>,
}

/// A hierarchy listing with its state summary.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<SubIssue>,
    pub summary: Summary,
}

/// Closed/total counts over the filtered relative set, computed before
/// any limit truncation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub closed: usize,
    pub total: usize,
}

/// Link an existing issue as a child of a parent.
///
/// # Errors
///
/// Returns `AlreadyLinked` when the child already has a parent; issues
/// can only have one.
pub fn add_link(
    client: &Client,
    parent: &ResolvedIssueRef,
    child: &ResolvedIssueRef,
) -> Result<()> {
    let parent_issue = client.get_issue(parent)?;
    let child_issue = client.get_issue(child)?;

    client
        .add_sub_issue(&parent_issue.id, &child_issue.id)
        .map_err(|err| match &err {
            PmuError::Transport { message }
                if classify(message) == RemoteErrorKind::DuplicateRelation =>
            {
                PmuError::AlreadyLinked {
                    child: child.to_string(),
                }
            }
            _ => err,
        })?;

    tracing::info!(parent = %parent, child = %child, "linked sub-issue");
    Ok(())
}

/// Remove the parent/child link between two issues.
///
/// # Errors
///
/// Returns `NotLinked` when no such relation exists.
pub fn remove_link(
    client: &Client,
    parent: &ResolvedIssueRef,
    child: &ResolvedIssueRef,
) -> Result<()> {
    let parent_issue = client.get_issue(parent)?;
    let child_issue = client.get_issue(child)?;

    client
        .remove_sub_issue(&parent_issue.id, &child_issue.id)
        .map_err(|err| match &err {
            PmuError::Transport { message }
                if classify(message) == RemoteErrorKind::NoSuchRelation =>
            {
                PmuError::NotLinked {
                    parent: parent.to_string(),
                    child: child.to_string(),
                }
            }
            _ => err,
        })?;

    tracing::info!(parent = %parent, child = %child, "unlinked sub-issue");
    Ok(())
}

/// Create a new issue and link it under a parent.
///
/// # Errors
///
/// Fails when the parent cannot be resolved or the issue cannot be
/// created. A failure of the link step alone is not an error: the issue
/// exists at that point and is returned with a warning.
pub fn create_child(
    client: &Client,
    parent: &ResolvedIssueRef,
    opts: &CreateChildOpts,
) -> Result<ChildCreation> {
    if opts.title.trim().is_empty() {
        return Err(PmuError::validation("title", "title must not be empty"));
    }

    let parent_issue = client.get_issue(parent)?;
    let target_repo = opts.target_repo.clone().unwrap_or_else(|| parent.repo.clone());
    let same_repo = target_repo == parent_issue.repo;

    let mut new = NewIssue {
        title: opts.title.clone(),
        body: opts.body.clone(),
        ..NewIssue::default()
    };
    if same_repo {
        if opts.inherit_labels {
            new.label_ids = parent_issue
                .labels
                .iter()
                .filter(|l| !l.id.is_empty())
                .map(|l| l.id.clone())
                .collect();
        }
        if opts.inherit_assignees {
            new.assignee_ids = parent_issue
                .assignees
                .iter()
                .filter(|a| !a.id.is_empty())
                .map(|a| a.id.clone())
                .collect();
        }
        if opts.inherit_milestone {
            new.milestone_id = parent_issue
                .milestone
                .as_ref()
                .filter(|m| !m.id.is_empty())
                .map(|m| m.id.clone());
        }
    }

    let repository_id = client.repo_id(&target_repo)?;
    let issue = client.create_issue(&repository_id, &new)?;
    tracing::info!(issue = %issue.reference(), "created child issue");

    let link_warning = match client.add_sub_issue(&parent_issue.id, &issue.id) {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!(issue = %issue.reference(), error = %err, "created but not linked");
            Some(format!(
                "created {} but could not link it under {parent}: {err}",
                issue.reference()
            ))
        }
    };

    Ok(ChildCreation { issue, link_warning })
}

/// List an issue's relatives, filtered by state.
///
/// The summary counts the whole filtered set; `limit` (0 = unlimited)
/// truncates only the returned entries.
///
/// # Errors
///
/// Returns `IssueNotFound` when the anchor issue does not resolve.
pub fn list(
    client: &Client,
    issue: &ResolvedIssueRef,
    relation: Relation,
    state: StateFilter,
    limit: usize,
) -> Result<Listing> {
    let relatives = match relation {
        Relation::Children => client.get_sub_issues(issue)?,
        Relation::Parent => client.get_parent_issue(issue)?.into_iter().collect(),
        Relation::Siblings => siblings_of(client, issue)?,
    };

    let mut entries: Vec<SubIssue> = relatives
        .into_iter()
        .filter(|s| state.matches(s.state))
        .collect();
    let summary = Summary {
        closed: entries
            .iter()
            .filter(|s| s.state == crate::model::IssueState::Closed)
            .count(),
        total: entries.len(),
    };
    if limit > 0 && entries.len() > limit {
        entries.truncate(limit);
    }

    Ok(Listing { entries, summary })
}

/// Other children of the issue's parent, excluding the issue itself.
/// A root issue has no siblings.
fn siblings_of(client: &Client, issue: &ResolvedIssueRef) -> Result<Vec<SubIssue>> {
    let Some(parent) = client.get_parent_issue(issue)? else {
        return Ok(Vec::new());
    };
    let parent_ref = ResolvedIssueRef {
        repo: parent.repo,
        number: parent.number,
    };
    Ok(client
        .get_sub_issues(&parent_ref)?
        .into_iter()
        .filter(|s| !(s.repo == issue.repo && s.number == issue.number))
        .collect())
}

/// Collect every descendant of a root issue, breadth-first.
///
/// Each issue appears at most once even when reachable along multiple
/// paths; traversal stops at `max_depth` levels below the root.
///
/// # Errors
///
/// Any fetch failure aborts the whole traversal.
pub fn collect_descendants(
    client: &Client,
    root: &ResolvedIssueRef,
    max_depth: usize,
) -> Result<Vec<SubIssue>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut descendants = Vec::new();
    let mut queue: VecDeque<(ResolvedIssueRef, usize)> = VecDeque::new();
    queue.push_back((root.clone(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for child in client.get_sub_issues(&current)? {
            if !seen.insert(child.id.clone()) {
                continue;
            }
            queue.push_back((
                ResolvedIssueRef {
                    repo: child.repo.clone(),
                    number: child.number,
                },
                depth + 1,
            ));
            descendants.push(child);
        }
    }

    Ok(descendants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::GraphQl;
    use serde_json::{json, Value};

    struct MockGql {
        handler: Box<dyn Fn(&str, &Value) -> Result<Value>>,
    }

    impl GraphQl for MockGql {
        fn query(&self, name: &str, _document: &str, variables: Value) -> Result<Value> {
            (self.handler)(name, &variables)
        }

        fn mutate(&self, name: &str, _document: &str, variables: Value) -> Result<Value> {
            (self.handler)(name, &variables)
        }
    }

    fn mock_client(handler: impl Fn(&str, &Value) -> Result<Value> + 'static) -> Client {
        Client::new(Box::new(MockGql {
            handler: Box::new(handler),
        }))
    }

    fn issue_ref(number: u32) -> ResolvedIssueRef {
        ResolvedIssueRef {
            repo: RepoRef::new("acme", "widgets"),
            number,
        }
    }

    fn issue_payload(number: u32) -> Value {
        json!({
            "id": format!("I_{number}"),
            "number": number,
            "title": format!("Issue {number}"),
            "state": "OPEN",
            "url": "",
            "repository": { "nameWithOwner": "acme/widgets" },
            "labels": { "nodes": [ { "id": "L_1", "name": "bug", "color": "" } ] },
            "assignees": { "nodes": [ { "id": "U_1", "login": "octocat" } ] },
            "milestone": { "id": "M_1", "title": "v1" },
        })
    }

    fn sub_issue_payload(number: u32, state: &str) -> Value {
        json!({
            "id": format!("I_{number}"),
            "number": number,
            "title": format!("Issue {number}"),
            "state": state,
            "url": "",
            "repository": { "nameWithOwner": "acme/widgets" },
        })
    }

    fn sub_issues_page(children: Vec<Value>) -> Value {
        json!({ "repository": { "issue": { "subIssues": {
            "pageInfo": { "hasNextPage": false, "endCursor": null },
            "nodes": children,
        } } } })
    }

    #[test]
    fn test_add_link_maps_duplicate_to_already_linked() {
        let client = mock_client(|name, _| match name {
            "GetIssue" => Ok(json!({ "repository": { "issue": issue_payload(1) } })),
            "AddSubIssue" => Err(PmuError::Transport {
                message: "Issues may only have one parent".to_string(),
            }),
            other => panic!("unexpected operation {other}"),
        });

        let err = add_link(&client, &issue_ref(1), &issue_ref(2)).unwrap_err();
        assert!(matches!(err, PmuError::AlreadyLinked { child } if child == "acme/widgets#2"));
    }

    #[test]
    fn test_remove_link_maps_missing_relation() {
        let client = mock_client(|name, _| match name {
            "GetIssue" => Ok(json!({ "repository": { "issue": issue_payload(1) } })),
            "RemoveSubIssue" => Err(PmuError::Transport {
                message: "Issue is not a sub-issue of the given parent".to_string(),
            }),
            other => panic!("unexpected operation {other}"),
        });

        let err = remove_link(&client, &issue_ref(1), &issue_ref(2)).unwrap_err();
        assert!(matches!(err, PmuError::NotLinked { .. }));
    }

    #[test]
    fn test_create_child_inherits_labels_and_milestone_only() {
        let client = mock_client(|name, variables| match name {
            "GetIssue" => Ok(json!({ "repository": { "issue": issue_payload(1) } })),
            "GetRepositoryId" => Ok(json!({ "repository": { "id": "R_1" } })),
            "CreateIssue" => {
                let input = &variables["input"];
                assert_eq!(input["labelIds"], json!(["L_1"]));
                assert_eq!(input["milestoneId"], "M_1");
                // Assignees are never inherited by default.
                assert!(input.get("assigneeIds").is_none());
                Ok(json!({ "createIssue": { "issue": issue_payload(5) } }))
            }
            "AddSubIssue" => Ok(json!({ "addSubIssue": { "issue": { "id": "I_1" } } })),
            other => panic!("unexpected operation {other}"),
        });

        let created = create_child(
            &client,
            &issue_ref(1),
            &CreateChildOpts {
                title: "Child task".to_string(),
                ..CreateChildOpts::default()
            },
        )
        .unwrap();
        assert_eq!(created.issue.number, 5);
        assert!(created.link_warning.is_none());
    }

    #[test]
    fn test_create_child_cross_repo_skips_inheritance() {
        let client = mock_client(|name, variables| match name {
            "GetIssue" => Ok(json!({ "repository": { "issue": issue_payload(1) } })),
            "GetRepositoryId" => {
                assert_eq!(variables["name"], "gadgets");
                Ok(json!({ "repository": { "id": "R_2" } }))
            }
            "CreateIssue" => {
                let input = &variables["input"];
                assert!(input.get("labelIds").is_none());
                assert!(input.get("milestoneId").is_none());
                Ok(json!({ "createIssue": { "issue": issue_payload(9) } }))
            }
            "AddSubIssue" => Ok(json!({ "addSubIssue": { "issue": { "id": "I_1" } } })),
            other => panic!("unexpected operation {other}"),
        });

        create_child(
            &client,
            &issue_ref(1),
            &CreateChildOpts {
                title: "Elsewhere".to_string(),
                target_repo: Some(RepoRef::new("acme", "gadgets")),
                ..CreateChildOpts::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_create_child_link_failure_keeps_issue_with_warning() {
        let client = mock_client(|name, _| match name {
            "GetIssue" => Ok(json!({ "repository": { "issue": issue_payload(1) } })),
            "GetRepositoryId" => Ok(json!({ "repository": { "id": "R_1" } })),
            "CreateIssue" => Ok(json!({ "createIssue": { "issue": issue_payload(7) } })),
            "AddSubIssue" => Err(PmuError::Transport {
                message: "boom".to_string(),
            }),
            other => panic!("unexpected operation {other}"),
        });

        let created = create_child(
            &client,
            &issue_ref(1),
            &CreateChildOpts {
                title: "Orphan".to_string(),
                ..CreateChildOpts::default()
            },
        )
        .unwrap();
        assert_eq!(created.issue.number, 7);
        let warning = created.link_warning.unwrap();
        assert!(warning.contains("acme/widgets#7"));
        assert!(warning.contains("could not link"));
    }

    #[test]
    fn test_create_child_rejects_empty_title() {
        let client = mock_client(|name, _| panic!("unexpected remote call {name}"));
        let err = create_child(
            &client,
            &issue_ref(1),
            &CreateChildOpts {
                title: "  ".to_string(),
                ..CreateChildOpts::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, PmuError::Validation { .. }));
    }

    #[test]
    fn test_list_children_filters_and_summarizes() {
        let client = mock_client(|name, _| match name {
            "GetSubIssues" => Ok(sub_issues_page(vec![
                sub_issue_payload(2, "OPEN"),
                sub_issue_payload(3, "CLOSED"),
                sub_issue_payload(4, "CLOSED"),
            ])),
            other => panic!("unexpected operation {other}"),
        });

        let listing = list(
            &client,
            &issue_ref(1),
            Relation::Children,
            StateFilter::All,
            0,
        )
        .unwrap();
        assert_eq!(listing.entries.len(), 3);
        assert_eq!(listing.summary, Summary { closed: 2, total: 3 });

        let closed_only = list(
            &client,
            &issue_ref(1),
            Relation::Children,
            StateFilter::Closed,
            0,
        )
        .unwrap();
        assert_eq!(closed_only.entries.len(), 2);
        assert_eq!(closed_only.summary, Summary { closed: 2, total: 2 });
    }

    #[test]
    fn test_list_limit_truncates_entries_not_summary() {
        let client = mock_client(|name, _| match name {
            "GetSubIssues" => Ok(sub_issues_page(vec![
                sub_issue_payload(2, "OPEN"),
                sub_issue_payload(3, "OPEN"),
                sub_issue_payload(4, "CLOSED"),
            ])),
            other => panic!("unexpected operation {other}"),
        });

        let listing = list(
            &client,
            &issue_ref(1),
            Relation::Children,
            StateFilter::All,
            1,
        )
        .unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.summary, Summary { closed: 1, total: 3 });
    }

    #[test]
    fn test_list_siblings_excludes_self() {
        let client = mock_client(|name, variables| match name {
            "GetParentIssue" => Ok(json!({ "repository": { "issue": {
                "parent": sub_issue_payload(1, "OPEN"),
            } } })),
            "GetSubIssues" => {
                assert_eq!(variables["number"], 1);
                Ok(sub_issues_page(vec![
                    sub_issue_payload(2, "OPEN"),
                    sub_issue_payload(3, "OPEN"),
                ]))
            }
            other => panic!("unexpected operation {other}"),
        });

        let listing = list(
            &client,
            &issue_ref(2),
            Relation::Siblings,
            StateFilter::All,
            0,
        )
        .unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].number, 3);
    }

    #[test]
    fn test_list_siblings_of_root_is_empty() {
        let client = mock_client(|name, _| match name {
            "GetParentIssue" => Ok(json!({ "repository": { "issue": { "parent": null } } })),
            other => panic!("unexpected operation {other}"),
        });

        let listing = list(
            &client,
            &issue_ref(1),
            Relation::Siblings,
            StateFilter::All,
            0,
        )
        .unwrap();
        assert!(listing.entries.is_empty());
    }

    #[test]
    fn test_collect_descendants_breadth_first_dedup() {
        // 1 -> {2, 3}, 2 -> {4}, 3 -> {4}; 4 must appear once.
        let client = mock_client(|name, variables| {
            assert_eq!(name, "GetSubIssues");
            let children = match variables["number"].as_u64().unwrap() {
                1 => vec![sub_issue_payload(2, "OPEN"), sub_issue_payload(3, "OPEN")],
                2 | 3 => vec![sub_issue_payload(4, "OPEN")],
                _ => vec![],
            };
            Ok(sub_issues_page(children))
        });

        let descendants =
            collect_descendants(&client, &issue_ref(1), DEFAULT_MAX_DEPTH).unwrap();
        let numbers: Vec<u32> = descendants.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![2, 3, 4]);
    }

    #[test]
    fn test_collect_descendants_respects_depth_cap() {
        let client = mock_client(|name, variables| {
            assert_eq!(name, "GetSubIssues");
            // Every issue n has one child n+1, unbounded.
            let n = variables["number"].as_u64().unwrap();
            #[allow(clippy::cast_possible_truncation)]
            let child = sub_issue_payload(n as u32 + 1, "OPEN");
            Ok(sub_issues_page(vec![child]))
        });

        let descendants = collect_descendants(&client, &issue_ref(1), 3).unwrap();
        assert_eq!(descendants.len(), 3);
    }

    #[test]
    fn test_relation_parse() {
        assert_eq!("children".parse::<Relation>().unwrap(), Relation::Children);
        assert_eq!("Parent".parse::<Relation>().unwrap(), Relation::Parent);
        assert!("cousins".parse::<Relation>().is_err());
    }
}
