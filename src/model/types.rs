use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Functional area a commit touches, as reported by the external classifier
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Frontend,
    Backend,
    Db,
    #[default]
    Other,
}

impl Domain {
    /// Canonical order, also used to break majority-vote ties
    pub const ALL: [Domain; 4] = [Domain::Frontend, Domain::Backend, Domain::Db, Domain::Other];
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Domain::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frontend" => Ok(Domain::Frontend),
            "backend" => Ok(Domain::Backend),
            "db" => Ok(Domain::Db),
            "other" => Ok(Domain::Other),
            _ => Err(format!(
                "Invalid domain: {s}. Must be one of frontend, backend, db, other"
            )),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Frontend => write!(f, "frontend"),
            Domain::Backend => write!(f, "backend"),
            Domain::Db => write!(f, "db"),
            Domain::Other => write!(f, "other"),
        }
    }
}

/// Kind of change a commit represents
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feature,
    Fix,
    Infra,
    Refactor,
    Test,
    Docs,
    Security,
    Data,
    Other,
}

impl<'de> Deserialize<'de> for CommitType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CommitType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feature" => Ok(CommitType::Feature),
            "fix" => Ok(CommitType::Fix),
            "infra" => Ok(CommitType::Infra),
            "refactor" => Ok(CommitType::Refactor),
            "test" => Ok(CommitType::Test),
            "docs" => Ok(CommitType::Docs),
            "security" => Ok(CommitType::Security),
            "data" => Ok(CommitType::Data),
            "other" => Ok(CommitType::Other),
            _ => Err(format!("Invalid commit type: {s}")),
        }
    }
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommitType::Feature => "feature",
            CommitType::Fix => "fix",
            CommitType::Infra => "infra",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Docs => "docs",
            CommitType::Security => "security",
            CommitType::Data => "data",
            CommitType::Other => "other",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CiStatus {
    Success,
    Pending,
    Failure,
    Error,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for CiStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // CI providers invent new states; anything unrecognised is "unknown"
        let s = String::deserialize(deserializer)?;
        Ok(CiStatus::from_str(&s).unwrap_or_default())
    }
}

impl FromStr for CiStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(CiStatus::Success),
            "pending" => Ok(CiStatus::Pending),
            "failure" => Ok(CiStatus::Failure),
            "error" => Ok(CiStatus::Error),
            "unknown" => Ok(CiStatus::Unknown),
            _ => Err(format!("Invalid CI status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    /// Unix seconds
    pub authored_at: i64,
    /// Insertions plus deletions
    pub line_delta: u64,
    pub parents: Vec<String>,
    pub domain: Option<Domain>,
    pub commit_type: Option<CommitType>,
    pub status: CiStatus,
}

impl Commit {
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map_or(self.hash.len(), |(i, _)| i);
        &self.hash[..end]
    }
}

/// One branch's commit list as fetched, newest-first or oldest-first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BranchHistory {
    pub name: String,
    pub commits: Vec<Commit>,
}

impl BranchHistory {
    pub fn new(name: impl Into<String>, commits: Vec<Commit>) -> Self {
        Self {
            name: name.into(),
            commits,
        }
    }

    /// A branch whose fetch failed still participates, just without commits
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}
