use super::error::LayoutError;
use crate::model::{BranchHistory, Commit, Domain};
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A deduplicated commit with its global rank and owning branch
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexedCommit {
    pub rank: usize,
    /// First branch the commit was seen under
    pub owner: String,
    pub commit: Commit,
}

impl IndexedCommit {
    pub fn hash(&self) -> &str {
        &self.commit.hash
    }
}

/// Every commit across all branches, sorted by (authored_at, hash)
#[derive(Debug, Clone, Default)]
pub struct GlobalCommitSequence {
    entries: Vec<IndexedCommit>,
    by_hash: HashMap<String, usize>,
}

/// Build the global sequence from per-branch histories.
///
/// Ordering is independent of the order of `histories`. Ownership is not: a
/// commit listed under several branches belongs to the first one iterated.
pub fn build_index(histories: &[BranchHistory]) -> Result<GlobalCommitSequence, LayoutError> {
    if histories.is_empty() {
        return Err(LayoutError::EmptyInput);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries = Vec::new();

    for history in histories {
        for commit in &history.commits {
            if seen.insert(commit.hash.as_str()) {
                entries.push(IndexedCommit {
                    rank: 0,
                    owner: history.name.clone(),
                    commit: commit.clone(),
                });
            }
        }
    }

    entries.sort_by(|a, b| {
        a.commit
            .authored_at
            .cmp(&b.commit.authored_at)
            .then_with(|| a.commit.hash.cmp(&b.commit.hash))
    });

    let mut by_hash = HashMap::with_capacity(entries.len());
    for (rank, entry) in entries.iter_mut().enumerate() {
        entry.rank = rank;
        by_hash.insert(entry.commit.hash.clone(), rank);
    }

    debug!(
        "Indexed {} unique commits across {} branches",
        entries.len(),
        histories.len()
    );

    Ok(GlobalCommitSequence { entries, by_hash })
}

impl GlobalCommitSequence {
    /// Entries in rank order
    pub fn entries(&self) -> &[IndexedCommit] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, hash: &str) -> Option<&IndexedCommit> {
        self.by_hash.get(hash).map(|&rank| &self.entries[rank])
    }

    pub fn rank_of(&self, hash: &str) -> Option<usize> {
        self.by_hash.get(hash).copied()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Commits owned by `branch`, in rank order
    pub fn owned_by<'a>(&'a self, branch: &'a str) -> impl Iterator<Item = &'a IndexedCommit> + 'a {
        self.entries.iter().filter(move |e| e.owner == branch)
    }

    /// Lowest and highest rank owned by `branch`
    pub fn rank_span_of(&self, branch: &str) -> Option<(usize, usize)> {
        let mut owned = self.owned_by(branch);
        let first = owned.next()?.rank;
        let last = owned.last().map_or(first, |e| e.rank);
        Some((first, last))
    }

    /// Full rank span, `None` when the sequence is empty
    pub fn global_span(&self) -> Option<(usize, usize)> {
        if self.entries.is_empty() {
            None
        } else {
            Some((0, self.entries.len() - 1))
        }
    }

    /// The commit with the highest rank
    pub fn latest(&self) -> Option<&IndexedCommit> {
        self.entries.last()
    }
}

/// Branch record derived from its history and the global sequence
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Branch {
    pub name: String,
    /// Hashes as fetched, not necessarily in rank order
    pub commits: Vec<String>,
    pub dominant_domain: Domain,
    pub is_default: bool,
}

impl Branch {
    /// Derive the branch record. The dominant domain is a majority vote over
    /// the commits this branch owns; unclassified commits vote `other`.
    pub fn from_history(
        history: &BranchHistory,
        sequence: &GlobalCommitSequence,
        default_branch: &str,
    ) -> Self {
        let mut votes: HashMap<Domain, usize> = HashMap::new();
        for entry in sequence.owned_by(&history.name) {
            *votes.entry(entry.commit.domain.unwrap_or_default()).or_default() += 1;
        }

        // Domain::ALL is in canonical order, so ties go to the earlier domain
        let mut dominant_domain = Domain::Other;
        let mut best = 0;
        for domain in Domain::ALL {
            let count = votes.get(&domain).copied().unwrap_or(0);
            if count > best {
                best = count;
                dominant_domain = domain;
            }
        }

        Self {
            name: history.name.clone(),
            commits: history.commits.iter().map(|c| c.hash.clone()).collect(),
            dominant_domain,
            is_default: history.name == default_branch,
        }
    }
}
