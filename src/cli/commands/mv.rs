//! Move command implementation.

use crate::api::Client;
use crate::bulk::{self, MoveSpec, Outcome};
use crate::cli::MoveArgs;
use crate::error::{PmuError, Result};
use serde::Serialize;

use super::{load_config, resolve_project, resolve_ref};

/// JSON output for the move command.
#[derive(Serialize)]
struct MoveResult<'a> {
    status: &'static str,
    changes: Vec<ChangeOutput<'a>>,
    targets: Vec<TargetOutput<'a>>,
}

#[derive(Serialize)]
struct ChangeOutput<'a> {
    field: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct TargetOutput<'a> {
    reference: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

/// Execute the move command.
///
/// # Errors
///
/// Returns a validation error for bad input, and `PartialFailure` when
/// some (but not all) targets could not be updated.
pub fn execute(args: &MoveArgs, json: bool) -> Result<()> {
    let changes = collect_changes(args)?;

    let config = load_config()?;
    let client = Client::from_env()?;
    let project = resolve_project(&client, &config)?;

    let targets = args
        .issues
        .iter()
        .map(|input| resolve_ref(&config, input))
        .collect::<Result<Vec<_>>>()?;

    let spec = MoveSpec {
        targets,
        changes,
        recursive: args.recursive,
    };
    let plan = bulk::plan(&client, &config, &project, &spec)?;

    if args.dry_run {
        if json {
            let output = MoveResult {
                status: "dry-run",
                changes: change_outputs(&plan),
                targets: plan
                    .targets
                    .iter()
                    .map(|t| TargetOutput {
                        reference: &t.reference,
                        status: "planned",
                        message: None,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            print!("{}", plan.render());
        }
        return Ok(());
    }

    let results = bulk::apply(&client, &plan);
    let failed = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
        .count();
    let total = results.len();

    if json {
        let output = MoveResult {
            status: if failed == 0 { "updated" } else { "partial" },
            changes: change_outputs(&plan),
            targets: results
                .iter()
                .map(|r| match &r.outcome {
                    Outcome::Updated => TargetOutput {
                        reference: &r.reference,
                        status: "updated",
                        message: None,
                    },
                    Outcome::Failed { message } => TargetOutput {
                        reference: &r.reference,
                        status: "failed",
                        message: Some(message),
                    },
                })
                .collect(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for result in &results {
            match &result.outcome {
                Outcome::Updated => println!("Updated {}", result.reference),
                Outcome::Failed { message } => {
                    eprintln!("failed: {}: {message}", result.reference);
                }
            }
        }
    }

    if failed > 0 {
        return Err(PmuError::PartialFailure { failed, total });
    }
    Ok(())
}

/// Gather `(field key, raw value)` pairs from the dedicated flags and the
/// generic `--field key=value` form.
fn collect_changes(args: &MoveArgs) -> Result<Vec<(String, String)>> {
    let mut changes = Vec::new();
    if let Some(status) = &args.status {
        changes.push(("status".to_string(), status.clone()));
    }
    if let Some(priority) = &args.priority {
        changes.push(("priority".to_string(), priority.clone()));
    }
    for pair in &args.field {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            PmuError::validation("field", format!("expected key=value, got '{pair}'"))
        })?;
        if key.trim().is_empty() || value.trim().is_empty() {
            return Err(PmuError::validation(
                "field",
                format!("expected key=value, got '{pair}'"),
            ));
        }
        changes.push((key.to_string(), value.to_string()));
    }
    if changes.is_empty() {
        return Err(PmuError::validation(
            "fields",
            "at least one field change is required (--status, --priority, or --field)",
        ));
    }
    Ok(changes)
}

fn change_outputs(plan: &bulk::MovePlan) -> Vec<ChangeOutput<'_>> {
    plan.changes
        .iter()
        .map(|c| ChangeOutput {
            field: &c.field_name,
            value: &c.display_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MoveArgs;

    #[test]
    fn test_collect_changes_orders_flags_first() {
        let args = MoveArgs {
            issues: vec!["1".to_string()],
            status: Some("done".to_string()),
            priority: Some("p1".to_string()),
            field: vec!["size=L".to_string()],
            ..MoveArgs::default()
        };
        let changes = collect_changes(&args).unwrap();
        assert_eq!(
            changes,
            vec![
                ("status".to_string(), "done".to_string()),
                ("priority".to_string(), "p1".to_string()),
                ("size".to_string(), "L".to_string()),
            ]
        );
    }

    #[test]
    fn test_collect_changes_rejects_bad_pair() {
        let args = MoveArgs {
            field: vec!["nodelimiter".to_string()],
            ..MoveArgs::default()
        };
        assert!(collect_changes(&args).is_err());

        let args = MoveArgs {
            field: vec!["=value".to_string()],
            ..MoveArgs::default()
        };
        assert!(collect_changes(&args).is_err());
    }

    #[test]
    fn test_collect_changes_requires_at_least_one() {
        let err = collect_changes(&MoveArgs::default()).unwrap_err();
        assert!(matches!(err, PmuError::Validation { .. }));
    }
}
