//! Bulk field updates: plan, preview, apply.
//!
//! A move is split into a read-only planning phase and an apply phase.
//! Planning resolves every alias, field, option, and target up front so
//! bad input fails before any write; the plan is also what a dry run
//! renders. Applying walks the plan sequentially, one independent update
//! per target, and never stops early: a failed target is recorded and the
//! rest still run.

use crate::api::{Client, FieldUpdateValue};
use crate::config::Config;
use crate::error::{PmuError, Result};
use crate::hierarchy;
use crate::model::{Project, ProjectField};
use crate::util::issue_ref::ResolvedIssueRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// What the caller asked to move.
#[derive(Debug, Clone, Default)]
pub struct MoveSpec {
    pub targets: Vec<ResolvedIssueRef>,
    /// `(field key, raw value)` pairs, pre-alias-resolution.
    pub changes: Vec<(String, String)>,
    /// Expand each target to include all of its descendants.
    pub recursive: bool,
}

/// One fully resolved field change, shared by every target.
#[derive(Debug, Clone)]
pub struct FieldChange {
    pub field_id: String,
    pub field_name: String,
    /// Canonical value as it will read on the board.
    pub display_value: String,
    pub value: FieldUpdateValue,
}

/// One resolved target: a project item to update.
#[derive(Debug, Clone)]
pub struct PlanTarget {
    pub reference: String,
    pub item_id: String,
    pub title: String,
}

/// A validated, ready-to-apply move.
#[derive(Debug, Clone)]
pub struct MovePlan {
    project_id: String,
    pub changes: Vec<FieldChange>,
    pub targets: Vec<PlanTarget>,
}

/// Per-target outcome of an applied plan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetResult {
    pub reference: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Updated,
    Failed { message: String },
}

/// Build a move plan.
///
/// Validation order: local input checks first, then field and option
/// resolution, then target resolution. Nothing is written.
///
/// # Errors
///
/// - `Validation` for empty input, unknown fields, or unknown options
/// - `NotInProject` when an explicitly named target has no project item;
///   descendants picked up by `--recursive` that are not on the board are
///   skipped instead
pub fn plan(
    client: &Client,
    config: &Config,
    project: &Project,
    spec: &MoveSpec,
) -> Result<MovePlan> {
    if spec.changes.is_empty() {
        return Err(PmuError::validation(
            "fields",
            "at least one field change is required",
        ));
    }
    if spec.targets.is_empty() {
        return Err(PmuError::validation(
            "targets",
            "at least one issue is required",
        ));
    }

    let fields = client.get_project_fields(&project.id)?;
    let changes = spec
        .changes
        .iter()
        .map(|(key, raw)| resolve_change(config, &fields, key, raw))
        .collect::<Result<Vec<_>>>()?;

    // Explicit targets first, then recursive descendants, deduplicated.
    let mut seen: HashSet<String> = HashSet::new();
    let mut expanded: Vec<(ResolvedIssueRef, bool)> = Vec::new();
    for target in &spec.targets {
        if seen.insert(target.to_string()) {
            expanded.push((target.clone(), true));
        }
    }
    if spec.recursive {
        for target in &spec.targets {
            for descendant in
                hierarchy::collect_descendants(client, target, hierarchy::DEFAULT_MAX_DEPTH)?
            {
                let reference = descendant.reference();
                if seen.insert(reference) {
                    expanded.push((
                        ResolvedIssueRef {
                            repo: descendant.repo,
                            number: descendant.number,
                        },
                        false,
                    ));
                }
            }
        }
    }

    let items = client.get_project_items(&project.id, None)?;
    let index: HashMap<String, (&str, &str)> = items
        .iter()
        .filter_map(|item| {
            item.issue
                .as_ref()
                .map(|issue| (issue.reference(), (item.id.as_str(), issue.title.as_str())))
        })
        .collect();

    let mut targets = Vec::new();
    for (target, explicit) in expanded {
        let reference = target.to_string();
        match index.get(&reference) {
            Some((item_id, title)) => targets.push(PlanTarget {
                reference,
                item_id: (*item_id).to_string(),
                title: (*title).to_string(),
            }),
            None if explicit => return Err(PmuError::NotInProject { reference }),
            None => {
                tracing::debug!(issue = %reference, "descendant not on the board, skipping");
            }
        }
    }

    Ok(MovePlan {
        project_id: project.id.clone(),
        changes,
        targets,
    })
}

fn resolve_change(
    config: &Config,
    fields: &[ProjectField],
    key: &str,
    raw: &str,
) -> Result<FieldChange> {
    let display_name = config.field_display_name(key);
    let canonical = config.resolve_field_value(key, raw);

    let field = fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(&display_name))
        .ok_or_else(|| {
            PmuError::validation(key, format!("project has no field named '{display_name}'"))
        })?;

    if field.data_type.eq_ignore_ascii_case("SINGLE_SELECT") {
        let option = field.option_named(&canonical).ok_or_else(|| {
            PmuError::validation(
                key,
                format!("field '{}' has no option '{canonical}'", field.name),
            )
        })?;
        Ok(FieldChange {
            field_id: field.id.clone(),
            field_name: field.name.clone(),
            display_value: option.name.clone(),
            value: FieldUpdateValue::SingleSelectOption(option.id.clone()),
        })
    } else {
        Ok(FieldChange {
            field_id: field.id.clone(),
            field_name: field.name.clone(),
            display_value: canonical.clone(),
            value: FieldUpdateValue::Text(canonical),
        })
    }
}

impl MovePlan {
    /// Human-readable preview, used for dry runs.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Would update {} issue(s):", self.targets.len());
        for target in &self.targets {
            let _ = writeln!(out, "  {}  {}", target.reference, target.title);
        }
        let _ = writeln!(out, "Changes:");
        for change in &self.changes {
            let _ = writeln!(out, "  {} -> {}", change.field_name, change.display_value);
        }
        out
    }
}

/// Apply a plan, one target at a time.
///
/// Every target is attempted regardless of earlier failures; the caller
/// decides how to report the mix (and whether to raise `PartialFailure`).
#[must_use]
pub fn apply(client: &Client, plan: &MovePlan) -> Vec<TargetResult> {
    plan.targets
        .iter()
        .map(|target| {
            for change in &plan.changes {
                if let Err(err) = client.update_item_field(
                    &plan.project_id,
                    &target.item_id,
                    &change.field_id,
                    &change.value,
                ) {
                    tracing::warn!(issue = %target.reference, error = %err, "update failed");
                    return TargetResult {
                        reference: target.reference.clone(),
                        outcome: Outcome::Failed {
                            message: err.to_string(),
                        },
                    };
                }
            }
            TargetResult {
                reference: target.reference.clone(),
                outcome: Outcome::Updated,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::GraphQl;
    use crate::config::{FieldConfig, ProjectConfig};
    use crate::model::{OwnerType, RepoRef};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct MockGql {
        calls: Rc<RefCell<Vec<String>>>,
        handler: Box<dyn Fn(&str, &Value) -> Result<Value>>,
    }

    impl GraphQl for MockGql {
        fn query(&self, name: &str, _document: &str, variables: Value) -> Result<Value> {
            self.calls.borrow_mut().push(name.to_string());
            (self.handler)(name, &variables)
        }

        fn mutate(&self, name: &str, _document: &str, variables: Value) -> Result<Value> {
            self.calls.borrow_mut().push(name.to_string());
            (self.handler)(name, &variables)
        }
    }

    fn mock_client(
        handler: impl Fn(&str, &Value) -> Result<Value> + 'static,
    ) -> (Client, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let client = Client::new(Box::new(MockGql {
            calls: Rc::clone(&calls),
            handler: Box::new(handler),
        }));
        (client, calls)
    }

    fn test_config() -> Config {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            FieldConfig {
                field: "Status".to_string(),
                values: HashMap::from([("backlog".to_string(), "Backlog".to_string())]),
            },
        );
        Config {
            project: ProjectConfig {
                owner: "acme".to_string(),
                number: 3,
            },
            repositories: vec!["acme/widgets".to_string()],
            fields,
            defaults: HashMap::new(),
        }
    }

    fn test_project() -> Project {
        Project {
            id: "P_1".to_string(),
            owner_login: "acme".to_string(),
            owner_type: OwnerType::Organization,
            number: 3,
            title: "Tracker".to_string(),
            url: String::new(),
            closed: false,
        }
    }

    fn target(number: u32) -> ResolvedIssueRef {
        ResolvedIssueRef {
            repo: RepoRef::new("acme", "widgets"),
            number,
        }
    }

    fn fields_payload() -> Value {
        json!({ "node": { "fields": { "nodes": [
            { "id": "F_1", "name": "Status", "dataType": "SINGLE_SELECT", "options": [
                { "id": "O_1", "name": "Backlog" },
                { "id": "O_2", "name": "In Progress" },
            ] },
            { "id": "F_2", "name": "Notes", "dataType": "TEXT", "options": [] },
        ] } } })
    }

    fn items_payload(numbers: &[u32]) -> Value {
        let nodes: Vec<Value> = numbers
            .iter()
            .map(|n| {
                json!({
                    "id": format!("ITEM_{n}"),
                    "content": {
                        "__typename": "Issue",
                        "id": format!("I_{n}"),
                        "number": n,
                        "title": format!("Issue {n}"),
                        "state": "OPEN",
                        "repository": { "nameWithOwner": "acme/widgets" },
                    },
                    "fieldValues": { "nodes": [] },
                })
            })
            .collect();
        json!({ "node": { "items": {
            "pageInfo": { "hasNextPage": false, "endCursor": null },
            "nodes": nodes,
        } } })
    }

    #[test]
    fn test_plan_rejects_empty_changes_before_any_remote_call() {
        let (client, calls) = mock_client(|name, _| panic!("unexpected remote call {name}"));
        let err = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                ..MoveSpec::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, PmuError::Validation { .. }));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_plan_resolves_alias_to_option_id() {
        let (client, _) = mock_client(|name, _| match name {
            "GetProjectFields" => Ok(fields_payload()),
            "GetProjectItems" => Ok(items_payload(&[1])),
            other => panic!("unexpected operation {other}"),
        });

        let plan = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                changes: vec![("status".to_string(), "backlog".to_string())],
                recursive: false,
            },
        )
        .unwrap();

        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].display_value, "Backlog");
        assert_eq!(
            plan.changes[0].value,
            FieldUpdateValue::SingleSelectOption("O_1".to_string())
        );
        assert_eq!(plan.targets[0].item_id, "ITEM_1");
    }

    #[test]
    fn test_plan_unknown_option_is_validation_error() {
        let (client, _) = mock_client(|name, _| match name {
            "GetProjectFields" => Ok(fields_payload()),
            other => panic!("unexpected operation {other}"),
        });

        let err = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                changes: vec![("status".to_string(), "shipped".to_string())],
                recursive: false,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("no option 'shipped'"));
    }

    #[test]
    fn test_plan_unknown_field_is_validation_error() {
        let (client, _) = mock_client(|name, _| match name {
            "GetProjectFields" => Ok(fields_payload()),
            other => panic!("unexpected operation {other}"),
        });

        let err = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                changes: vec![("severity".to_string(), "high".to_string())],
                recursive: false,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("no field named 'Severity'"));
    }

    #[test]
    fn test_plan_text_field_change() {
        let (client, _) = mock_client(|name, _| match name {
            "GetProjectFields" => Ok(fields_payload()),
            "GetProjectItems" => Ok(items_payload(&[1])),
            other => panic!("unexpected operation {other}"),
        });

        let plan = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                changes: vec![("notes".to_string(), "needs review".to_string())],
                recursive: false,
            },
        )
        .unwrap();
        assert_eq!(
            plan.changes[0].value,
            FieldUpdateValue::Text("needs review".to_string())
        );
    }

    #[test]
    fn test_plan_explicit_target_missing_from_board() {
        let (client, _) = mock_client(|name, _| match name {
            "GetProjectFields" => Ok(fields_payload()),
            "GetProjectItems" => Ok(items_payload(&[2])),
            other => panic!("unexpected operation {other}"),
        });

        let err = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                changes: vec![("status".to_string(), "backlog".to_string())],
                recursive: false,
            },
        )
        .unwrap_err();
        assert!(
            matches!(err, PmuError::NotInProject { reference } if reference == "acme/widgets#1")
        );
    }

    #[test]
    fn test_plan_recursive_skips_descendants_off_the_board() {
        // Issue 1 has children 2 and 3; only 1 and 2 are on the board.
        let (client, _) = mock_client(|name, variables| match name {
            "GetProjectFields" => Ok(fields_payload()),
            "GetProjectItems" => Ok(items_payload(&[1, 2])),
            "GetSubIssues" => {
                let children = if variables["number"] == 1 {
                    vec![
                        json!({ "id": "I_2", "number": 2, "title": "child", "state": "OPEN",
                                "url": "", "repository": { "nameWithOwner": "acme/widgets" } }),
                        json!({ "id": "I_3", "number": 3, "title": "off-board", "state": "OPEN",
                                "url": "", "repository": { "nameWithOwner": "acme/widgets" } }),
                    ]
                } else {
                    vec![]
                };
                Ok(json!({ "repository": { "issue": { "subIssues": {
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "nodes": children,
                } } } }))
            }
            other => panic!("unexpected operation {other}"),
        });

        let plan = plan(
            &client,
            &test_config(),
            &test_project(),
            &MoveSpec {
                targets: vec![target(1)],
                changes: vec![("status".to_string(), "backlog".to_string())],
                recursive: true,
            },
        )
        .unwrap();

        let refs: Vec<&str> = plan.targets.iter().map(|t| t.reference.as_str()).collect();
        assert_eq!(refs, vec!["acme/widgets#1", "acme/widgets#2"]);
    }

    #[test]
    fn test_apply_continues_past_failures() {
        let (client, _) = mock_client(|name, variables| {
            assert_eq!(name, "UpdateItemField");
            if variables["item"] == "ITEM_2" {
                Err(PmuError::Transport {
                    message: "boom".to_string(),
                })
            } else {
                Ok(json!({ "updateProjectV2ItemFieldValue": { "projectV2Item": { "id": "x" } } }))
            }
        });

        let plan = MovePlan {
            project_id: "P_1".to_string(),
            changes: vec![FieldChange {
                field_id: "F_1".to_string(),
                field_name: "Status".to_string(),
                display_value: "Backlog".to_string(),
                value: FieldUpdateValue::SingleSelectOption("O_1".to_string()),
            }],
            targets: (1..=3)
                .map(|n| PlanTarget {
                    reference: format!("acme/widgets#{n}"),
                    item_id: format!("ITEM_{n}"),
                    title: format!("Issue {n}"),
                })
                .collect(),
        };

        let results = apply(&client, &plan);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].outcome, Outcome::Updated);
        assert!(matches!(results[1].outcome, Outcome::Failed { .. }));
        assert_eq!(results[2].outcome, Outcome::Updated);
    }

    #[test]
    fn test_render_lists_targets_and_changes() {
        let plan = MovePlan {
            project_id: "P_1".to_string(),
            changes: vec![FieldChange {
                field_id: "F_1".to_string(),
                field_name: "Status".to_string(),
                display_value: "In Progress".to_string(),
                value: FieldUpdateValue::SingleSelectOption("O_2".to_string()),
            }],
            targets: vec![PlanTarget {
                reference: "acme/widgets#1".to_string(),
                item_id: "ITEM_1".to_string(),
                title: "Fix the thing".to_string(),
            }],
        };

        let rendered = plan.render();
        assert!(rendered.contains("acme/widgets#1"));
        assert!(rendered.contains("Status -> In Progress"));
    }
}
