//! Projects command implementation.

use crate::api::Client;
use crate::cli::ProjectsArgs;
use crate::error::Result;
use crate::model::Project;
use serde::Serialize;

use super::load_config;

/// JSON output for one listed project.
#[derive(Serialize)]
struct ProjectOutput<'a> {
    number: u32,
    title: &'a str,
    owner: &'a str,
    owner_type: &'a str,
    url: &'a str,
}

/// Execute the projects command.
///
/// # Errors
///
/// Returns an error when the owner cannot be resolved under either owner
/// type.
pub fn execute(args: &ProjectsArgs, json: bool) -> Result<()> {
    // An explicit owner works without configuration; the default comes
    // from .pmu.yml.
    let owner = match &args.owner {
        Some(owner) => owner.clone(),
        None => load_config()?.project.owner,
    };

    let client = Client::from_env()?;
    let projects = client.list_projects(&owner)?;

    if json {
        let output: Vec<ProjectOutput<'_>> = projects.iter().map(project_output).collect();
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No open projects for '{owner}'");
        return Ok(());
    }
    for project in &projects {
        println!(
            "#{}  {}  ({})  {}",
            project.number, project.title, project.owner_type, project.url
        );
    }

    Ok(())
}

fn project_output(project: &Project) -> ProjectOutput<'_> {
    ProjectOutput {
        number: project.number,
        title: &project.title,
        owner: &project.owner_login,
        owner_type: project.owner_type.as_str(),
        url: &project.url,
    }
}
