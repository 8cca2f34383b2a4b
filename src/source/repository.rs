//! Load branch histories from a local git repository using git2

use crate::model::{BranchHistory, CiStatus, Commit};
use color_eyre::eyre::{Result, eyre};
use git2::{BranchType, DiffOptions, Repository, Sort};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Branch histories plus the branch that should act as the spine
#[derive(Debug, Clone)]
pub struct RepositoryHistories {
    pub default_branch: Option<String>,
    pub histories: Vec<BranchHistory>,
}

/// Local branch names and the name HEAD points at, if any
pub fn list_local_branches(repo: &Repository) -> Result<(Vec<String>, Option<String>)> {
    let mut names = Vec::new();
    for branch in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        if let Some(name) = branch.name()? {
            names.push(name.to_string());
        }
    }
    names.sort();

    let head = repo
        .head()
        .ok()
        .filter(|h| h.is_branch())
        .and_then(|h| h.shorthand().map(String::from));

    Ok((names, head))
}

/// Prefer `main`, then `master`, then whatever HEAD is on
pub fn guess_default_branch(names: &[String], head: Option<&str>) -> Option<String> {
    ["main", "master"]
        .iter()
        .find(|candidate| names.iter().any(|n| n.as_str() == **candidate))
        .map(|s| s.to_string())
        .or_else(|| head.map(String::from))
}

/// Sum of insertions and deletions against the first parent
fn line_delta(repo: &Repository, commit: &git2::Commit) -> Result<u64> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut diff_options = DiffOptions::new();
    diff_options.ignore_filemode(true);
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_options))?;
    let stats = diff.stats()?;
    Ok((stats.insertions() + stats.deletions()) as u64)
}

/// Walk one branch, newest first, stopping after `limit` commits
pub fn walk_branch(path: &Path, name: &str, limit: usize) -> Result<Vec<Commit>> {
    let repo = Repository::open(path)?;
    let branch = repo.find_branch(name, BranchType::Local)?;
    let tip = branch.get().peel_to_commit()?;

    let mut revwalk = repo.revwalk()?;
    revwalk.push(tip.id())?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

    let mut commits = Vec::new();
    for oid in revwalk.take(limit) {
        let commit = repo.find_commit(oid?)?;
        let delta = line_delta(&repo, &commit).unwrap_or_else(|e| {
            debug!("No diff stats for {}: {}", commit.id(), e);
            0
        });
        commits.push(Commit {
            hash: commit.id().to_string(),
            message: commit.message().unwrap_or("").to_string(),
            authored_at: commit.author().when().seconds(),
            line_delta: delta,
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            domain: None,
            commit_type: None,
            status: CiStatus::Unknown,
        });
    }

    debug!("Walked {} commits on branch {}", commits.len(), name);
    Ok(commits)
}

/// Load every local branch concurrently. A branch whose walk fails is kept
/// with no commits so the rest of the layout still renders.
pub async fn load_repository(path: PathBuf, limit: usize) -> Result<RepositoryHistories> {
    let listing_path = path.clone();
    let (names, head) = tokio::task::spawn_blocking(move || {
        let repo = Repository::open(&listing_path)
            .map_err(|e| eyre!("Could not open git repository at {:?}: {}", listing_path, e))?;
        list_local_branches(&repo)
    })
    .await??;

    let default_branch = guess_default_branch(&names, head.as_deref());
    debug!("Found {} local branches, default {:?}", names.len(), default_branch);

    let walks = names.iter().cloned().map(|name| {
        let path = path.clone();
        tokio::task::spawn_blocking(move || {
            let result = walk_branch(&path, &name, limit);
            (name, result)
        })
    });

    let mut histories = Vec::with_capacity(names.len());
    for (joined, name) in futures::future::join_all(walks).await.into_iter().zip(&names) {
        match joined {
            Ok((name, Ok(commits))) => histories.push(BranchHistory::new(name, commits)),
            Ok((name, Err(e))) => {
                warn!("Failed to walk branch {name}: {e}");
                histories.push(BranchHistory::empty(name));
            }
            Err(e) => {
                warn!("Branch task for {name} panicked: {e}");
                histories.push(BranchHistory::empty(name.clone()));
            }
        }
    }

    Ok(RepositoryHistories {
        default_branch,
        histories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_default_branch() {
        let names = vec!["dev".to_string(), "master".to_string()];
        assert_eq!(guess_default_branch(&names, Some("dev")), Some("master".to_string()));

        let names = vec!["dev".to_string(), "main".to_string(), "master".to_string()];
        assert_eq!(guess_default_branch(&names, None), Some("main".to_string()));

        let names = vec!["trunk".to_string()];
        assert_eq!(guess_default_branch(&names, Some("trunk")), Some("trunk".to_string()));
        assert_eq!(guess_default_branch(&names, None), None);
    }
}
