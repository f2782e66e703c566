//! List command implementation.

use crate::api::Client;
use crate::cli::ListArgs;
use crate::error::Result;
use crate::model::{FieldValue, ProjectItem};
use serde::Serialize;

use super::{load_config, parse_repo, resolve_project};

/// JSON output for the list command.
#[derive(Serialize)]
struct ListOutput<'a> {
    project: ProjectSummary<'a>,
    items: Vec<ItemOutput<'a>>,
    total: usize,
}

#[derive(Serialize)]
struct ProjectSummary<'a> {
    owner: &'a str,
    number: u32,
    title: &'a str,
}

#[derive(Serialize)]
struct ItemOutput<'a> {
    reference: String,
    title: &'a str,
    state: &'a str,
    url: &'a str,
    fields: &'a [FieldValue],
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error when the project cannot be resolved or items cannot
/// be fetched.
pub fn execute(args: &ListArgs, json: bool) -> Result<()> {
    let config = load_config()?;
    let client = Client::from_env()?;
    let project = resolve_project(&client, &config)?;

    let repo_filter = args.repo.as_deref().map(parse_repo).transpose()?;
    let mut items = client.get_project_items(&project.id, repo_filter.as_ref())?;

    // Filters go through the alias table, so `--status backlog` matches
    // a "Backlog" board value.
    for (key, raw) in [("status", &args.status), ("priority", &args.priority)] {
        let Some(raw) = raw else { continue };
        let field_name = config.field_display_name(key);
        let want = config.resolve_field_value(key, raw);
        items.retain(|item| {
            item.field_value(&field_name)
                .is_some_and(|v| v.eq_ignore_ascii_case(&want))
        });
    }

    let total = items.len();
    if args.limit > 0 && items.len() > args.limit {
        items.truncate(args.limit);
    }

    if json {
        let output = ListOutput {
            project: ProjectSummary {
                owner: &project.owner_login,
                number: project.number,
                title: &project.title,
            },
            items: items.iter().filter_map(item_output).collect(),
            total,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!(
        "{} #{} - {} ({} item(s))",
        project.owner_login, project.number, project.title, total
    );
    for item in &items {
        let Some(issue) = &item.issue else { continue };
        let mut line = format!("{}  {}  {}", issue.reference(), issue.state, issue.title);
        if !item.field_values.is_empty() {
            let rendered: Vec<String> = item
                .field_values
                .iter()
                .map(|fv| format!("{}: {}", fv.field, fv.value))
                .collect();
            line.push_str(&format!("  [{}]", rendered.join(", ")));
        }
        println!("{line}");
    }

    Ok(())
}

fn item_output(item: &ProjectItem) -> Option<ItemOutput<'_>> {
    let issue = item.issue.as_ref()?;
    Some(ItemOutput {
        reference: issue.reference(),
        title: &issue.title,
        state: issue.state.as_str(),
        url: &issue.url,
        fields: &item.field_values,
    })
}
