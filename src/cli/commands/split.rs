//! Split command implementation.

use crate::api::Client;
use crate::cli::SplitArgs;
use crate::error::{PmuError, Result};
use crate::hierarchy::{self, CreateChildOpts};
use crate::util::checklist;
use serde::Serialize;

use super::{load_config, resolve_ref};

/// JSON output for the split command.
#[derive(Serialize)]
struct SplitResult {
    status: &'static str,
    parent: String,
    #[serde(rename = "taskCount")]
    task_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    created: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<FailedTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct FailedTask {
    title: String,
    message: String,
}

/// Execute the split command.
///
/// Task titles come from repeated `--task` flags; with `--from-body` they
/// come from the parent's unchecked checklist items instead. Explicit
/// tasks win when both are given.
///
/// # Errors
///
/// Returns a validation error when no task source is given, and
/// `PartialFailure` when some (but not all) sub-issues could not be
/// created.
pub fn execute(args: &SplitArgs, json: bool) -> Result<()> {
    let config = load_config()?;
    let client = Client::from_env()?;
    let parent = resolve_ref(&config, &args.parent)?;

    let tasks: Vec<String> = if args.tasks.is_empty() {
        if !args.from_body {
            return Err(PmuError::validation(
                "tasks",
                "give at least one --task, or --from-body to use the parent checklist",
            ));
        }
        let parent_issue = client.get_issue(&parent)?;
        checklist::extract_tasks(&parent_issue.body)
    } else {
        args.tasks.clone()
    };

    if tasks.is_empty() {
        // Only reachable via --from-body: the parent has no open tasks.
        emit(
            json,
            &SplitResult {
                status: "no-tasks",
                parent: parent.to_string(),
                task_count: 0,
                created: vec![],
                failed: vec![],
                warnings: vec![],
            },
            || println!("No unchecked tasks in {parent}"),
        )?;
        return Ok(());
    }

    if args.dry_run {
        let result = SplitResult {
            status: "dry-run",
            parent: parent.to_string(),
            task_count: tasks.len(),
            created: vec![],
            failed: vec![],
            warnings: vec![],
        };
        emit(json, &result, || {
            println!("Would create {} sub-issue(s) under {parent}:", tasks.len());
            for task in &tasks {
                println!("  - {task}");
            }
        })?;
        return Ok(());
    }

    let mut created = Vec::new();
    let mut failed = Vec::new();
    let mut warnings = Vec::new();
    for task in &tasks {
        let opts = CreateChildOpts {
            title: task.clone(),
            ..CreateChildOpts::default()
        };
        match hierarchy::create_child(&client, &parent, &opts) {
            Ok(child) => {
                created.push(child.issue.reference());
                if let Some(warning) = child.link_warning {
                    warnings.push(warning);
                }
            }
            Err(err) => failed.push(FailedTask {
                title: task.clone(),
                message: err.to_string(),
            }),
        }
    }

    let failed_count = failed.len();
    let total = tasks.len();
    let result = SplitResult {
        status: "created",
        parent: parent.to_string(),
        task_count: total,
        created,
        failed,
        warnings,
    };
    emit(json, &result, || {
        for reference in &result.created {
            println!("Created {reference}");
        }
        for failure in &result.failed {
            eprintln!("failed: {}: {}", failure.title, failure.message);
        }
        for warning in &result.warnings {
            eprintln!("warning: {warning}");
        }
    })?;

    if failed_count > 0 {
        return Err(PmuError::PartialFailure {
            failed: failed_count,
            total,
        });
    }
    Ok(())
}

fn emit(json: bool, result: &SplitResult, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        text();
    }
    Ok(())
}
