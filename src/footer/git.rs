//! Repository probing for the git row.
//!
//! Probing shells out to `git` and can take tens of milliseconds, so hosts
//! call it from their own thread and feed the result to the footer; it is
//! never run while the output lock is held.

use super::state::GitInfo;
use std::path::Path;
use std::process::Command;
use tracing::debug;

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").arg("-C").arg(dir).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Probe `dir` for branch, origin remote and uncommitted change count.
///
/// Anything that fails (no `git` binary, not a repository) yields
/// [`GitInfo::not_a_repo`].
pub fn probe(dir: &Path) -> GitInfo {
    let Some(branch) = git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]) else {
        debug!(dir = %dir.display(), "not a git repository");
        return GitInfo::not_a_repo();
    };

    let remote = git(dir, &["remote", "get-url", "origin"])
        .map(|url| normalize_remote(&url))
        .unwrap_or_default();
    let changes = git(dir, &["status", "--porcelain"])
        .map(|status| count_changes(&status))
        .unwrap_or(0);

    debug!(%branch, %remote, changes, "probed git repository");
    GitInfo::repo(branch, changes).with_remote(remote)
}

/// Number of entries in `git status --porcelain` output.
pub fn count_changes(porcelain: &str) -> u32 {
    let count = porcelain.lines().filter(|line| !line.trim().is_empty()).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Rewrite a remote URL in `git@host:user/repo` form.
///
/// `https://` and `http://` URLs are converted when they have a host, user
/// and repository; `git@` URLs only lose their `.git` suffix. Anything else
/// is returned trimmed.
pub fn normalize_remote(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() >= 3 {
            let host = parts[0].rsplit('@').next().unwrap_or(parts[0]);
            return format!("git@{host}:{}/{}", parts[1], parts[2]);
        }
        return rest.to_string();
    }

    if url.starts_with("git@") {
        return url.strip_suffix(".git").unwrap_or(url).to_string();
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_remote() {
        let cases = [
            ("https://github.com/user/repo.git", "git@github.com:user/repo"),
            ("https://github.com/user/repo", "git@github.com:user/repo"),
            ("http://gitlab.local/team/tool.git\n", "git@gitlab.local:team/tool"),
            ("https://token@github.com/user/repo.git", "git@github.com:user/repo"),
            ("git@github.com:user/repo.git", "git@github.com:user/repo"),
            ("git@github.com:user/repo", "git@github.com:user/repo"),
            ("https://example.com/repo.git", "example.com/repo"),
            ("/srv/git/repo.git", "/srv/git/repo.git"),
            ("", ""),
        ];
        for (url, expected) in cases {
            assert_eq!(normalize_remote(url), expected, "url = {url:?}");
        }
    }

    #[test]
    fn test_count_changes() {
        assert_eq!(count_changes(""), 0);
        assert_eq!(count_changes(" M src/lib.rs\n?? new.txt\n"), 2);
        assert_eq!(count_changes("A  a\n\nD  b"), 2);
    }

    #[test]
    fn test_probe_outside_repository() {
        let dir = std::env::temp_dir().join(format!("tidemark-no-repo-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let info = probe(&dir);
        if !info.is_repo {
            assert_eq!(info, GitInfo::not_a_repo());
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
