use std::collections::HashMap;
use std::io::Write;

use log::info;

use crate::error::{Result, TravlogError};
use crate::output::colors::{self, Value};

use super::client::ApiClient;
use super::types::{links, BranchListing, Commit};

/// Shows the most recent build state for every branch of a project.
pub async fn show<W: Write>(client: &ApiClient, out: &mut W, project: &str) -> Result<()> {
    info!("Listing branches for {project}");
    let data = client.get_json(&format!("/repos/{project}/branches")).await?;
    let listing: BranchListing = serde_json::from_value(data)?;
    render(out, project, &listing)
}

fn render<W: Write>(out: &mut W, project: &str, listing: &BranchListing) -> Result<()> {
    let commits: HashMap<u64, &Commit> =
        listing.commits.iter().map(|c| (c.id, c)).collect();
    for branch in &listing.branches {
        let commit = commits
            .get(&branch.commit_id)
            .ok_or(TravlogError::CommitLookup(branch.commit_id))?;

        let mut template = String::from("#{number} {branch} {state}");
        let mut curious = false;
        if branch.finished_at.is_none() {
            template.insert_str(0, "{yellow}");
        } else if branch.state.as_deref() != Some("passed") {
            template.insert_str(0, "{bold}{red}");
            curious = true;
        }
        colors::print(
            out,
            &template,
            &[
                ("number", Value::text(branch.number.as_str())),
                ("branch", Value::text(commit.branch.as_str())),
                (
                    "state",
                    Value::text(branch.state.as_deref().unwrap_or("null")),
                ),
            ],
        )?;

        let mut template = String::from("{cyan}");
        if curious {
            template.push_str("{bold}");
        }
        template.push_str("{url}{off}");
        colors::print(
            out,
            &template,
            &[("url", Value::text(links::build_url(project, branch.id)))],
        )?;

        writeln!(out)?;
    }
    Ok(())
}
