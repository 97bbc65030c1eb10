//! Obtaining a local source tree to scan.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, bail, Context};
use tempfile::TempDir;

/// A directory ready for scanning. Cloned checkouts are deleted when this is
/// dropped unless they were explicitly kept.
pub enum RepoSource {
    Local(PathBuf),
    Cloned(TempDir),
    Kept(PathBuf),
}

impl RepoSource {
    pub fn path(&self) -> &Path {
        match self {
            RepoSource::Local(path) | RepoSource::Kept(path) => path,
            RepoSource::Cloned(dir) => dir.path(),
        }
    }
}

/// Use `source` in place when it is a local directory, otherwise clone it.
pub fn fetch(source: &str, keep_clone: bool) -> anyhow::Result<RepoSource> {
    let local = Path::new(source);
    if local.is_dir() {
        return Ok(RepoSource::Local(local.to_path_buf()));
    }
    if !looks_like_remote(source) {
        bail!("{source} is neither a directory nor a repository URL");
    }

    let dir = tempfile::Builder::new()
        .prefix("assertscan-")
        .tempdir()
        .context("Failed to create a temporary directory")?;
    tracing::info!(url = source, dir = %dir.path().display(), "cloning");
    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", source])
        .arg(dir.path())
        .output()
        .context("Failed to run git; is it installed?")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("Failed to clone {source}: {}", stderr.trim()));
    }

    Ok(finish_clone(dir, keep_clone))
}

/// Hand a finished checkout to the caller, detaching it from cleanup if asked.
fn finish_clone(dir: TempDir, keep_clone: bool) -> RepoSource {
    if keep_clone {
        let path = dir.keep();
        tracing::info!(dir = %path.display(), "keeping clone");
        RepoSource::Kept(path)
    } else {
        RepoSource::Cloned(dir)
    }
}

fn looks_like_remote(source: &str) -> bool {
    source.starts_with("https://")
        || source.starts_with("http://")
        || source.starts_with("git@")
        || source.starts_with("ssh://")
        || source.starts_with("git://")
        || source.starts_with("file://")
}

/// Repository name for default output file names: last path segment, without
/// a trailing slash or `.git` suffix.
pub fn repo_name(source: &str) -> String {
    let trimmed = source.strip_suffix('/').unwrap_or(source);
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let name = trimmed
        .rsplit(|c| c == '/' || c == '\\' || c == ':')
        .next()
        .unwrap_or(trimmed);
    if name.is_empty() || name == "." {
        "repo".to_string()
    } else {
        name.to_string()
    }
}
