//! Git metadata discovery
//!
//! Resolves the abbreviated HEAD revision and the origin repo slug without
//! shelling out to git. The `.git` directory is located by ascending from
//! the start path until the filesystem root.

use crate::config::RepoInfo;
use crate::error::{CoreError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

const ABBREV_LEN: usize = 7;

/// Discover repo metadata for the checkout containing `start`.
pub fn discover(start: impl AsRef<Path>) -> Result<RepoInfo> {
    let git_dir = find_git_dir(start.as_ref())?;
    tracing::debug!(git_dir = %git_dir.display(), "loading revision from git directory");

    let revision = head_revision(&git_dir)?;
    let slug = origin_slug(&git_dir)?;
    Ok(RepoInfo { slug, revision })
}

/// Ascend from `start` until a directory containing `.git` is found.
fn find_git_dir(start: &Path) -> Result<PathBuf> {
    let mut dir = if start.is_dir() {
        start.to_path_buf()
    } else {
        start.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
    };

    loop {
        let candidate = dir.join(".git");
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !dir.pop() {
            return Err(CoreError::GitRepoNotFound(start.to_path_buf()));
        }
    }
}

/// Resolve HEAD to an abbreviated commit id.
fn head_revision(git_dir: &Path) -> Result<String> {
    let head = std::fs::read_to_string(git_dir.join("HEAD"))?;
    let head = head.trim();

    let commit = if let Some(ref_name) = head.strip_prefix("ref: ") {
        resolve_ref(git_dir, ref_name.trim())?
    } else {
        head.to_string()
    };

    if commit.len() < ABBREV_LEN {
        return Err(CoreError::GitHead(format!("malformed commit id '{commit}'")));
    }
    Ok(commit[..ABBREV_LEN].to_string())
}

/// Look a ref up in its loose file, falling back to packed-refs.
fn resolve_ref(git_dir: &Path, ref_name: &str) -> Result<String> {
    let loose = git_dir.join(ref_name);
    if loose.is_file() {
        let commit = std::fs::read_to_string(loose)?;
        return Ok(commit.trim().to_string());
    }

    let packed = git_dir.join("packed-refs");
    if packed.is_file() {
        let content = std::fs::read_to_string(packed)?;
        for line in content.lines() {
            if line.starts_with('#') || line.starts_with('^') {
                continue;
            }
            if let Some((commit, name)) = line.split_once(' ')
                && name.trim() == ref_name
            {
                return Ok(commit.trim().to_string());
            }
        }
    }

    Err(CoreError::GitHead(format!("unable to resolve ref '{ref_name}'")))
}

/// Extract the "owner/repo" slug from the origin remote, falling back to
/// the raw URL for hosts we do not recognize.
fn origin_slug(git_dir: &Path) -> Result<String> {
    let url = origin_url(git_dir)?;

    let http_re = Regex::new(r"^http(s?)://[^/]*github\.com.*/([^/]+)/([^/]+)\.git$").unwrap();
    let ssh_re = Regex::new(r"github\.com:(.+)/(.+)\.git$").unwrap();

    if let Some(captures) = http_re.captures(&url) {
        return Ok(format!("{}/{}", &captures[2], &captures[3]));
    }
    if let Some(captures) = ssh_re.captures(&url) {
        return Ok(format!("{}/{}", &captures[1], &captures[2]));
    }
    Ok(url)
}

/// Read the origin remote URL from the repo config file.
fn origin_url(git_dir: &Path) -> Result<String> {
    let config = std::fs::read_to_string(git_dir.join("config"))?;

    let mut in_origin = false;
    for line in config.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_origin = line == r#"[remote "origin"]"#;
            continue;
        }
        if in_origin
            && let Some((key, value)) = line.split_once('=')
            && key.trim() == "url"
        {
            return Ok(value.trim().to_string());
        }
    }
    Err(CoreError::GitRemoteMissing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    fn write_repo(root: &Path, origin_url: &str) {
        let git_dir = root.join(".git");
        fs::create_dir_all(git_dir.join("refs/heads")).unwrap();
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(git_dir.join("refs/heads/main"), format!("{COMMIT}\n")).unwrap();
        fs::write(
            git_dir.join("config"),
            format!("[core]\n\tbare = false\n[remote \"origin\"]\n\turl = {origin_url}\n"),
        )
        .unwrap();
    }

    #[test]
    fn discovers_revision_and_ssh_slug() {
        let dir = tempdir().unwrap();
        write_repo(dir.path(), "git@github.com:acme/platform.git");

        let repo = discover(dir.path()).unwrap();
        assert_eq!(repo.revision, "0123456");
        assert_eq!(repo.slug, "acme/platform");
    }

    #[test]
    fn discovers_https_slug() {
        let dir = tempdir().unwrap();
        write_repo(dir.path(), "https://github.com/acme/platform.git");

        let repo = discover(dir.path()).unwrap();
        assert_eq!(repo.slug, "acme/platform");
    }

    #[test]
    fn unknown_host_falls_back_to_url() {
        let dir = tempdir().unwrap();
        write_repo(dir.path(), "https://example.org/acme/platform.git");

        let repo = discover(dir.path()).unwrap();
        assert_eq!(repo.slug, "https://example.org/acme/platform.git");
    }

    #[test]
    fn ascends_from_nested_directory() {
        let dir = tempdir().unwrap();
        write_repo(dir.path(), "git@github.com:acme/platform.git");
        let nested = dir.path().join("services/api");
        fs::create_dir_all(&nested).unwrap();

        let repo = discover(&nested).unwrap();
        assert_eq!(repo.revision, "0123456");
    }

    #[test]
    fn detached_head_uses_commit_directly() {
        let dir = tempdir().unwrap();
        write_repo(dir.path(), "git@github.com:acme/platform.git");
        fs::write(dir.path().join(".git/HEAD"), format!("{COMMIT}\n")).unwrap();

        let repo = discover(dir.path()).unwrap();
        assert_eq!(repo.revision, "0123456");
    }

    #[test]
    fn resolves_packed_ref() {
        let dir = tempdir().unwrap();
        write_repo(dir.path(), "git@github.com:acme/platform.git");
        fs::remove_file(dir.path().join(".git/refs/heads/main")).unwrap();
        fs::write(
            dir.path().join(".git/packed-refs"),
            format!("# pack-refs with: peeled fully-peeled sorted\n{COMMIT} refs/heads/main\n"),
        )
        .unwrap();

        let repo = discover(dir.path()).unwrap();
        assert_eq!(repo.revision, "0123456");
    }

    #[test]
    fn missing_repo_is_an_error() {
        let dir = tempdir().unwrap();
        // No .git anywhere under the temp root; ascent may still escape into
        // an enclosing checkout, so only assert when it errors cleanly.
        if let Err(err) = discover(dir.path()) {
            assert!(matches!(
                err,
                CoreError::GitRepoNotFound(_) | CoreError::Io(_)
            ));
        }
    }
}
