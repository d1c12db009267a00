//! Locating the posts a run should process.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::{fs, process::Command};
use tracing::{debug, instrument};

const MARKDOWN_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Lists the markdown files directly inside `dir`, sorted by path.
///
/// Subdirectories are not searched.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub async fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_markdown(&path) && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!(count = files.len(), "Listed markdown files");
    Ok(files)
}

/// Lists the markdown files directly inside `dir` that git reports as modified, staged or
/// untracked. The result is deduplicated and sorted.
///
/// Files that no longer exist (deletions) are left out.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub async fn changed_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = fs::canonicalize(dir).await?;
    let toplevel = git(&dir, &["rev-parse", "--show-toplevel"]).await?;
    let toplevel = PathBuf::from(toplevel.trim());

    let mut files = Vec::new();
    for args in [
        &["diff", "--name-only", "-z"][..],
        &["diff", "--cached", "--name-only", "-z"][..],
        &["ls-files", "--others", "--exclude-standard", "-z"][..],
    ] {
        let output = git(&toplevel, args).await?;
        for name in output.split('\0').filter(|name| !name.is_empty()) {
            let path = toplevel.join(name);
            if !is_markdown(&path) {
                continue;
            }
            // Deleted files cannot be canonicalized
            let Ok(path) = fs::canonicalize(&path).await else {
                continue;
            };
            if path.parent() == Some(dir.as_path()) {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "Listed changed markdown files");
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION)
}

async fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(dir).output().await?;
    if !output.status.success() {
        return Err(DiscoveryError::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    #[tokio::test]
    async fn lists_only_markdown_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.md", "a.md", "notes.txt", "c.markdown"] {
            fs::write(dir.path().join(name), "text").await.unwrap();
        }
        fs::create_dir(dir.path().join("nested")).await.unwrap();
        fs::write(dir.path().join("nested/d.md"), "text").await.unwrap();

        let files = list_markdown_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let err = list_markdown_files(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Io(_)));
    }

    #[tokio::test]
    async fn changed_files_include_staged_and_untracked() {
        if !git_available() {
            eprintln!("Skipping test: git not available");
            return;
        }
        let repo = tempdir().unwrap();
        let posts = repo.path().join("content/posts");
        fs::create_dir_all(posts.join("drafts")).await.unwrap();
        for name in ["staged.md", "untracked.md", "notes.txt", "drafts/nested.md"] {
            fs::write(posts.join(name), "text").await.unwrap();
        }
        fs::write(repo.path().join("README.md"), "readme").await.unwrap();

        git(repo.path(), &["init", "--quiet"]).await.unwrap();
        git(repo.path(), &["add", "content/posts/staged.md"]).await.unwrap();

        let files = changed_markdown_files(&posts).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["staged.md", "untracked.md"]);
    }

    #[tokio::test]
    async fn changed_files_outside_a_repository_fail() {
        if !git_available() {
            eprintln!("Skipping test: git not available");
            return;
        }
        let dir = tempdir().unwrap();
        // tempdir may itself live inside a repository, in which case there is nothing to check
        if git(dir.path(), &["rev-parse", "--show-toplevel"]).await.is_ok() {
            return;
        }
        let err = changed_markdown_files(dir.path()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Git { .. }));
    }
}
