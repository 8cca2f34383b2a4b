//! JSON snapshot of branch histories as produced by a GitHub-like API
//! Missing or failed data degrades to empty branches, never to an error

use crate::model::{BranchHistory, CiStatus, Commit, CommitType, Domain};
use chrono::DateTime;
use color_eyre::eyre::{Result, WrapErr};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ParentRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CommitStats {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawCommit {
    pub sha: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "authoredDate", default)]
    pub authored_date: String,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    #[serde(default)]
    pub stats: Option<CommitStats>,
    #[serde(default)]
    pub status: Option<CiStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawBranch {
    pub name: String,
    /// `None` when the fetch for this branch failed
    #[serde(default)]
    pub commits: Option<Vec<RawCommit>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Classifier output; unrecognised labels are treated as missing
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Classification {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(rename = "type", default)]
    pub commit_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub default_branch: Option<String>,
    pub branches: Vec<RawBranch>,
    #[serde(default)]
    pub classifications: HashMap<String, Classification>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(content).wrap_err("Snapshot is not valid JSON")?;
        debug!(
            "Loaded snapshot with {} branches and {} classifications",
            snapshot.branches.len(),
            snapshot.classifications.len()
        );
        Ok(snapshot)
    }

    /// Convert into engine input, keeping branch order
    pub fn into_histories(self) -> Vec<BranchHistory> {
        let classifications = self.classifications;
        self.branches
            .into_iter()
            .map(|branch| {
                let Some(commits) = branch.commits else {
                    warn!(
                        "Branch {} has no commit data ({}), treating as empty",
                        branch.name,
                        branch.error.as_deref().unwrap_or("fetch failed")
                    );
                    return BranchHistory::empty(branch.name);
                };
                let commits = commits
                    .into_iter()
                    .map(|raw| convert_commit(raw, &classifications))
                    .collect();
                BranchHistory::new(branch.name, commits)
            })
            .collect()
    }
}

/// RFC 3339 timestamp to unix seconds; unparseable dates become 0
pub fn parse_authored_date(date: &str) -> i64 {
    match DateTime::parse_from_rfc3339(date.trim()) {
        Ok(dt) => dt.timestamp(),
        Err(e) => {
            warn!("Unparseable authored date {date:?}: {e}");
            0
        }
    }
}

fn convert_commit(raw: RawCommit, classifications: &HashMap<String, Classification>) -> Commit {
    let (domain, commit_type) = classifications
        .get(&raw.sha)
        .map(|c| {
            (
                c.domain.as_deref().and_then(|d| d.parse::<Domain>().ok()),
                c.commit_type.as_deref().and_then(|t| t.parse::<CommitType>().ok()),
            )
        })
        .unwrap_or((None, None));

    Commit {
        authored_at: parse_authored_date(&raw.authored_date),
        line_delta: raw.stats.map_or(0, |s| s.total),
        parents: raw.parents.into_iter().map(|p| p.sha).collect(),
        domain,
        commit_type,
        status: raw.status.unwrap_or_default(),
        message: raw.message,
        hash: raw.sha,
    }
}
