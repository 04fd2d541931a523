use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Branch listing as returned by `/repos/{project}/branches`. Branches carry
/// a commit id that must resolve against the accompanying commit list.
#[derive(Debug, Deserialize)]
pub struct BranchListing {
    pub branches: Vec<BranchSummary>,
    pub commits: Vec<Commit>,
}

/// Most recent build on one branch.
#[derive(Debug, Deserialize)]
pub struct BranchSummary {
    /// Build id, used for the web link
    pub id: u64,
    /// Build number, e.g. "512"
    pub number: String,
    /// Key into the commit list
    pub commit_id: u64,
    /// "passed", "failed", "started", ...; null while pending
    pub state: Option<String>,
    /// Null while the build is still running
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub id: u64,
    /// Branch name the commit was built on
    pub branch: String,
}

/// Build detail as returned by `/repos/{project}/builds/{id}`.
#[derive(Debug, Deserialize)]
pub struct BuildDetail {
    /// Ordered job entries composing the build
    pub matrix: Vec<MatrixJob>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixJob {
    /// Job id, used for the web link
    pub id: u64,
    /// Job number, e.g. "512.3"
    pub number: String,
    /// Null = not finished, 0 = success, nonzero = failure
    pub result: Option<i64>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Raw job configuration; values may be scalars or nested structures
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Web URLs shown under each listing entry.
pub mod links {
    use crate::router::WEB_BASE;

    pub fn build_url(project: &str, build_id: u64) -> String {
        format!("{WEB_BASE}{project}/builds/{build_id}")
    }

    pub fn job_url(project: &str, job_id: u64) -> String {
        format!("{WEB_BASE}{project}/jobs/{job_id}")
    }
}
