use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use url::Url;

use crate::error::{Result, TravlogError};
use crate::git;

/// Base for relative URL arguments and for the web links printed under
/// branch and job entries.
pub const WEB_BASE: &str = "https://travis-ci.org/";
const WEB_HOST: &str = "travis-ci.org";

/// A recognized URL shape with its captures, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Branches { project: String },
    Build { project: String, build_id: String },
    Job { project: String, job_id: String },
}

#[derive(Clone, Copy)]
enum Kind {
    Branches,
    Build,
    Job,
}

// Path suffixes after the project segment, tried in order; first match wins.
const RULES: &[(&str, Kind)] = &[
    ("", Kind::Branches),
    ("branches", Kind::Branches),
    (r"builds/(?P<build_id>\d+)", Kind::Build),
    (r"jobs/(?P<job_id>\d+)", Kind::Job),
];

fn route_table() -> &'static [(Regex, Kind)] {
    static TABLE: OnceLock<Vec<(Regex, Kind)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        RULES
            .iter()
            .map(|&(suffix, kind)| {
                let suffix = if suffix.is_empty() {
                    String::new()
                } else {
                    format!("/{suffix}")
                };
                let pattern =
                    format!(r"\A/(?:github/)?(?P<project>[\w-]+/[\w-]+){suffix}\z");
                (Regex::new(&pattern).expect("route pattern is valid"), kind)
            })
            .collect()
    })
}

/// Resolves a command-line URL argument into a route. The argument may be an
/// absolute URL, a path relative to the Travis web base, or the literal "."
/// meaning "whatever the current repository's remote points at".
pub fn resolve(arg: &str) -> Result<Route> {
    let arg = if arg == "." {
        match git::remote_project()? {
            Some(project) => project,
            None => return Err(TravlogError::UnsupportedUrl),
        }
    } else {
        arg.to_string()
    };
    let base = Url::parse(WEB_BASE).expect("web base URL is valid");
    let url = base.join(&arg).map_err(|_| TravlogError::UnsupportedUrl)?;
    debug!("Routing URL: {url}");
    route_url(&url)
}

fn route_url(url: &Url) -> Result<Route> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TravlogError::UnsupportedUrl);
    }
    if url.host_str() != Some(WEB_HOST) {
        return Err(TravlogError::UnsupportedUrl);
    }
    for (regex, kind) in route_table() {
        let Some(caps) = regex.captures(url.path()) else {
            continue;
        };
        let project = caps["project"].to_string();
        return Ok(match kind {
            Kind::Branches => Route::Branches { project },
            Kind::Build => Route::Build {
                project,
                build_id: caps["build_id"].to_string(),
            },
            Kind::Job => Route::Job {
                project,
                job_id: caps["job_id"].to_string(),
            },
        });
    }
    Err(TravlogError::UnsupportedUrl)
}
