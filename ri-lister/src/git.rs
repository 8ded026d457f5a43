use std::path::Path;
use std::process::Command;

use log::debug;
use ri_common::error::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRemote {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
}

fn _git(directory: &Path, args: &[&str]) -> Result<String, RuntimeError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(directory)
        .args(args)
        .output()
        .map_err(|e| RuntimeError::new(format!("Unable to run git: {e}")))?;

    if !output.status.success() {
        return Err(RuntimeError::new(format!(
            "git {} failed in {}: {}",
            args.join(" "),
            directory.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Extract `(owner, repo)` from a GitHub remote URL in HTTPS, SCP-like or SSH form.
pub fn parse_remote_url(remote: &str) -> Option<(String, String)> {
    let remote = remote.trim();
    let rest = if let Some(rest) = remote.strip_prefix("git@github.com:") {
        rest
    } else {
        let (_, after_scheme) = remote.split_once("://")?;
        let (host, rest) = after_scheme.split_once('/')?;
        let host = host.rsplit('@').next()?;
        if host != "github.com" && host != "www.github.com" {
            return None;
        }
        rest
    };

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let mut parts = rest.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}

/// Read the `origin` remote and current branch of the checkout at `directory`.
pub fn detect_remote(directory: &Path) -> Result<GitRemote, RuntimeError> {
    let url = _git(directory, &["config", "--get", "remote.origin.url"])?;
    debug!("Remote origin of {} is {url}", directory.display());

    let (owner, repo) = parse_remote_url(&url)
        .ok_or_else(|| RuntimeError::new(format!("Not a GitHub repository: {url}")))?;

    let branch = _git(directory, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let branch = if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch)
    };

    Ok(GitRemote {
        owner,
        repo,
        branch,
    })
}
