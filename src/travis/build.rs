use std::collections::HashMap;
use std::io::Write;

use log::info;
use serde_json::Value as Json;

use crate::error::Result;
use crate::output::colors::{self, Value};

use super::client::ApiClient;
use super::types::{links, BuildDetail, MatrixJob};

/// Shows the job matrix of one build.
pub async fn show<W: Write>(
    client: &ApiClient,
    out: &mut W,
    project: &str,
    build_id: &str,
) -> Result<()> {
    info!("Showing build {build_id} of {project}");
    let data = client
        .get_json(&format!("/repos/{project}/builds/{build_id}"))
        .await?;
    let build: BuildDetail = serde_json::from_value(data)?;
    render(out, project, &build)
}

fn is_scalar(value: &Json) -> bool {
    !matches!(value, Json::Object(_) | Json::Array(_))
}

fn scalar_display(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Distinct scalar values per config key across the whole matrix. Keys whose
/// value never varies carry no information and are suppressed from display.
fn distinct_values(build: &BuildDetail) -> HashMap<&str, Vec<&Json>> {
    let mut coll: HashMap<&str, Vec<&Json>> = HashMap::new();
    for job in &build.matrix {
        for (key, value) in &job.config {
            if !is_scalar(value) {
                continue;
            }
            let values = coll.entry(key.as_str()).or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    coll
}

fn config_display(job: &MatrixJob, coll: &HashMap<&str, Vec<&Json>>) -> String {
    let mut entries: Vec<(&String, &Json)> = job.config.iter().collect();
    entries.sort_by_key(|&(key, _)| key.as_str());
    let mut parts = Vec::new();
    for (key, value) in entries {
        if key.starts_with('.') {
            continue;
        }
        if !is_scalar(value) {
            continue;
        }
        if coll.get(key.as_str()).is_some_and(|values| values.len() == 1) {
            continue;
        }
        parts.push(format!("{key}={}", scalar_display(value)));
    }
    parts.join(" ")
}

fn render<W: Write>(out: &mut W, project: &str, build: &BuildDetail) -> Result<()> {
    let coll = distinct_values(build);
    for job in &build.matrix {
        let mut template = String::from("#{number} {config}");
        if job.finished_at.is_none() {
            template.insert_str(0, "{yellow}");
        } else if job.result != Some(0) {
            template.insert_str(0, "{bold}{red}");
        }
        template.push_str("{off}");
        colors::print(
            out,
            &template,
            &[
                ("number", Value::text(job.number.as_str())),
                ("config", Value::text(config_display(job, &coll))),
            ],
        )?;

        let mut template = String::from("{cyan}");
        if job.result.is_some_and(|r| r != 0) {
            template.push_str("{bold}");
        }
        template.push_str("{url}{off}");
        colors::print(
            out,
            &template,
            &[("url", Value::text(links::job_url(project, job.id)))],
        )?;

        writeln!(out)?;
    }
    Ok(())
}
