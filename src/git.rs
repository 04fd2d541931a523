use std::process::Command;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::{Result, TravlogError};

/// Queries the current repository's origin remote and extracts its GitHub
/// project path. Returns `Ok(None)` when no remote is configured (git exits
/// with status 1 for an unset key) or the remote is not hosted on GitHub.
pub fn remote_project() -> Result<Option<String>> {
    let output = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .output()
        .map_err(|e| TravlogError::Git(format!("failed to run git: {e}")))?;
    if !output.status.success() {
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TravlogError::Git(stderr.trim().to_string()));
    }
    let remote = String::from_utf8_lossy(&output.stdout);
    let remote = remote.trim();
    debug!("Origin remote: {remote}");
    Ok(github_project(remote))
}

/// Extracts `owner/repo` from a github.com remote in https, ssh or scp-like
/// form, dropping a trailing `.git`.
fn github_project(remote: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"\A(?:https://github\.com/|ssh://git@github\.com/|git@github\.com:)(?P<project>[\w.-]+/[\w.-]+?)(?:\.git)?/?\z",
        )
        .expect("remote pattern is valid")
    });
    re.captures(remote).map(|caps| caps["project"].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_remote() {
        assert_eq!(
            github_project("https://github.com/owner/repo"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_https_remote_with_git_suffix() {
        assert_eq!(
            github_project("https://github.com/owner/repo.git"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_scp_like_remote() {
        assert_eq!(
            github_project("git@github.com:owner/repo.git"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_ssh_remote() {
        assert_eq!(
            github_project("ssh://git@github.com/owner/repo"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_dotted_repo_name_keeps_its_dot() {
        assert_eq!(
            github_project("https://github.com/owner/re.po"),
            Some("owner/re.po".to_string())
        );
    }

    #[test]
    fn test_non_github_remote_resolves_to_nothing() {
        assert_eq!(github_project("https://gitlab.com/owner/repo"), None);
        assert_eq!(github_project("git@example.org:owner/repo.git"), None);
    }
}
