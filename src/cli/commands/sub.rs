//! Sub-issue command implementation.

use crate::api::Client;
use crate::cli::{SubAddArgs, SubCommands, SubCreateArgs, SubListArgs, SubRemoveArgs, SubTreeArgs};
use crate::error::Result;
use crate::hierarchy::{self, CreateChildOpts, Relation};
use crate::model::{IssueState, StateFilter, SubIssue};
use serde::Serialize;
use std::collections::HashSet;

use super::{load_config, parse_repo, resolve_ref};

/// Execute the sub command.
///
/// # Errors
///
/// Returns an error when configuration is missing or the operation fails.
pub fn execute(command: &SubCommands, json: bool) -> Result<()> {
    let config = load_config()?;
    let client = Client::from_env()?;

    match command {
        SubCommands::Add(args) => sub_add(args, &client, &config, json),
        SubCommands::Remove(args) => sub_remove(args, &client, &config, json),
        SubCommands::Create(args) => sub_create(args, &client, &config, json),
        SubCommands::List(args) => sub_list(args, &client, &config, json),
        SubCommands::Tree(args) => sub_tree(args, &client, &config, json),
    }
}

/// JSON output for sub add/remove.
#[derive(Serialize)]
struct LinkResult {
    status: &'static str,
    parent: String,
    child: String,
}

/// JSON output for sub create.
#[derive(Serialize)]
struct CreateResult {
    status: &'static str,
    parent: String,
    reference: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// JSON output for sub list.
#[derive(Serialize)]
struct ListResult {
    issue: String,
    relation: &'static str,
    closed: usize,
    total: usize,
    entries: Vec<EntryOutput>,
}

#[derive(Serialize)]
struct EntryOutput {
    reference: String,
    title: String,
    state: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<usize>,
}

/// JSON output for sub tree.
#[derive(Serialize)]
struct TreeResult {
    root: String,
    entries: Vec<EntryOutput>,
}

fn entry_output(issue: &SubIssue, depth: Option<usize>) -> EntryOutput {
    EntryOutput {
        reference: issue.reference(),
        title: issue.title.clone(),
        state: issue.state.to_string(),
        url: issue.url.clone(),
        depth,
    }
}

fn sub_add(args: &SubAddArgs, client: &Client, config: &crate::config::Config, json: bool) -> Result<()> {
    let parent = resolve_ref(config, &args.parent)?;
    let child = resolve_ref(config, &args.child)?;
    hierarchy::add_link(client, &parent, &child)?;

    if json {
        let output = LinkResult {
            status: "linked",
            parent: parent.to_string(),
            child: child.to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Linked {child} under {parent}");
    }
    Ok(())
}

fn sub_remove(
    args: &SubRemoveArgs,
    client: &Client,
    config: &crate::config::Config,
    json: bool,
) -> Result<()> {
    let parent = resolve_ref(config, &args.parent)?;
    let child = resolve_ref(config, &args.child)?;
    hierarchy::remove_link(client, &parent, &child)?;

    if json {
        let output = LinkResult {
            status: "unlinked",
            parent: parent.to_string(),
            child: child.to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Unlinked {child} from {parent}");
    }
    Ok(())
}

fn sub_create(
    args: &SubCreateArgs,
    client: &Client,
    config: &crate::config::Config,
    json: bool,
) -> Result<()> {
    let parent = resolve_ref(config, &args.parent)?;
    let target_repo = args.repo.as_deref().map(parse_repo).transpose()?;

    let opts = CreateChildOpts {
        title: args.title.clone(),
        body: args.body.clone(),
        target_repo,
        inherit_labels: !args.no_inherit_labels,
        inherit_assignees: args.inherit_assignees,
        inherit_milestone: !args.no_inherit_milestone,
    };
    let created = hierarchy::create_child(client, &parent, &opts)?;

    if json {
        let output = CreateResult {
            status: if created.link_warning.is_none() {
                "created"
            } else {
                "created-unlinked"
            },
            parent: parent.to_string(),
            reference: created.issue.reference(),
            url: created.issue.url.clone(),
            warning: created.link_warning,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Created {} under {parent}", created.issue.reference());
    if !created.issue.url.is_empty() {
        println!("{}", created.issue.url);
    }
    if let Some(warning) = &created.link_warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn sub_list(
    args: &SubListArgs,
    client: &Client,
    config: &crate::config::Config,
    json: bool,
) -> Result<()> {
    let issue = resolve_ref(config, &args.issue)?;
    let relation: Relation = args.relation.parse()?;
    let state: StateFilter = args.state.parse()?;

    let listing = hierarchy::list(client, &issue, relation, state, args.limit)?;

    if json {
        let output = ListResult {
            issue: issue.to_string(),
            relation: match relation {
                Relation::Children => "children",
                Relation::Parent => "parent",
                Relation::Siblings => "siblings",
            },
            closed: listing.summary.closed,
            total: listing.summary.total,
            entries: listing
                .entries
                .iter()
                .map(|e| entry_output(e, None))
                .collect(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    for entry in &listing.entries {
        println!("{}  {}", render_entry(entry), entry.title);
    }
    println!(
        "{} of {} closed",
        listing.summary.closed, listing.summary.total
    );
    Ok(())
}

fn sub_tree(
    args: &SubTreeArgs,
    client: &Client,
    config: &crate::config::Config,
    json: bool,
) -> Result<()> {
    let root = resolve_ref(config, &args.issue)?;

    // Preorder so children print directly under their parent.
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    tree_preorder(client, &root, 0, args.max_depth, &mut seen, &mut entries)?;

    if json {
        let output = TreeResult {
            root: root.to_string(),
            entries: entries
                .iter()
                .map(|(issue, depth)| entry_output(issue, Some(*depth)))
                .collect(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{root}");
    for (issue, depth) in &entries {
        println!(
            "{}{}  {}",
            "  ".repeat(*depth),
            render_entry(issue),
            issue.title
        );
    }
    Ok(())
}

/// Depth-first collection of the sub-issue tree. Issues reachable along
/// multiple paths appear once, at the first position encountered.
fn tree_preorder(
    client: &Client,
    node: &crate::util::issue_ref::ResolvedIssueRef,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<String>,
    out: &mut Vec<(SubIssue, usize)>,
) -> Result<()> {
    if depth >= max_depth {
        return Ok(());
    }
    for child in client.get_sub_issues(node)? {
        if !seen.insert(child.id.clone()) {
            continue;
        }
        let next = crate::util::issue_ref::ResolvedIssueRef {
            repo: child.repo.clone(),
            number: child.number,
        };
        out.push((child, depth + 1));
        tree_preorder(client, &next, depth + 1, max_depth, seen, out)?;
    }
    Ok(())
}

fn render_entry(issue: &SubIssue) -> String {
    let marker = if issue.state == IssueState::Closed {
        "[x]"
    } else {
        "[ ]"
    };
    format!("{marker} {}", issue.reference())
}
