use super::index::GlobalCommitSequence;
use super::lanes::LaneSlot;
use super::seed::{low_nibble, signed_seed};
use super::view::Focus;
use crate::model::{CommitType, Position};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacementOptions {
    /// Distance along x between consecutive ranks
    pub grid_spacing: f64,
    /// Magnitude of the per-type (y, z) offset
    pub type_offset: f64,
    /// Multiplier on type and manual offsets while a single branch is focused
    pub focus_scale: f64,
    pub jitter: bool,
    /// Full width of the jitter band on each axis
    pub jitter_amplitude: f64,
    pub size_scale: f64,
    pub size_min: f64,
    pub size_max: f64,
    pub default_branch: String,
    /// Caller-supplied (dy, dz) nudges keyed by commit hash
    pub overrides: BTreeMap<String, (f64, f64)>,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            grid_spacing: 3.0,
            type_offset: 1.0,
            focus_scale: 0.3,
            jitter: true,
            jitter_amplitude: 0.08,
            size_scale: 200.0,
            size_min: 0.25,
            size_max: 1.2,
            default_branch: "main".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayoutPosition {
    pub hash: String,
    pub branch: String,
    pub rank: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub size: f64,
    pub is_latest: bool,
}

impl LayoutPosition {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Unit (y, z) offset for a classified type, `None` for types that have no
/// fixed direction
fn type_direction(commit_type: CommitType) -> Option<(f64, f64)> {
    let d = FRAC_1_SQRT_2;
    match commit_type {
        CommitType::Feature => Some((1.0, 0.0)),
        CommitType::Fix => Some((-1.0, 0.0)),
        CommitType::Infra => Some((0.0, 1.0)),
        CommitType::Refactor => Some((0.0, -1.0)),
        CommitType::Test => Some((d, d)),
        CommitType::Docs => Some((-d, d)),
        CommitType::Security => Some((d, -d)),
        CommitType::Data => Some((-d, -d)),
        CommitType::Other => None,
    }
}

/// One of eight compass directions picked by the hash's low nibble
pub fn fallback_direction(hash: &str) -> (f64, f64) {
    let k = (low_nibble(hash) % 8) as f64;
    let angle = k * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

fn commit_size(line_delta: u64, is_default: bool, options: &PlacementOptions) -> f64 {
    let scale = if options.size_scale > 0.0 {
        options.size_scale
    } else {
        1.0
    };
    // Bounds come from user config and may be inverted; `clamp` would panic
    let (lo, hi) = if options.size_min <= options.size_max {
        (options.size_min, options.size_max)
    } else {
        (options.size_max, options.size_min)
    };
    let size = (line_delta as f64 / scale).max(lo).min(hi);
    if is_default { size / 2.0 } else { size }
}

/// Place every commit in the sequence.
///
/// Commits on the default branch stay on the spine: they receive jitter and
/// manual overrides but no type offset.
pub fn place_commits(
    sequence: &GlobalCommitSequence,
    lanes: &BTreeMap<String, LaneSlot>,
    focus: &Focus,
    options: &PlacementOptions,
) -> Vec<LayoutPosition> {
    let emphasis = match focus {
        Focus::All => 1.0,
        Focus::Branch(_) => options.focus_scale,
    };
    let latest_rank = sequence.latest().map(|e| e.rank);

    let positions: Vec<LayoutPosition> = sequence
        .entries()
        .iter()
        .map(|entry| {
            let commit = &entry.commit;
            let is_default = entry.owner == options.default_branch;
            let slot = lanes.get(&entry.owner).copied().unwrap_or(LaneSlot::SPINE);

            let (mut dy, mut dz) = (0.0, 0.0);
            if !is_default {
                let (ty, tz) = commit
                    .commit_type
                    .and_then(type_direction)
                    .unwrap_or_else(|| fallback_direction(&commit.hash));
                dy += ty * options.type_offset * emphasis;
                dz += tz * options.type_offset * emphasis;
            }
            if let Some(&(oy, oz)) = options.overrides.get(&commit.hash) {
                dy += oy * emphasis;
                dz += oz * emphasis;
            }
            if options.jitter {
                dy += signed_seed(&commit.hash, "jitter-y") * options.jitter_amplitude;
                dz += signed_seed(&commit.hash, "jitter-z") * options.jitter_amplitude;
            }

            LayoutPosition {
                hash: commit.hash.clone(),
                branch: entry.owner.clone(),
                rank: entry.rank,
                x: entry.rank as f64 * options.grid_spacing,
                y: slot.lane + dy,
                z: slot.depth + dz,
                size: commit_size(commit.line_delta, is_default, options),
                is_latest: Some(entry.rank) == latest_rank,
            }
        })
        .collect();

    debug!("Placed {} commits (focus: {})", positions.len(), focus);
    positions
}

/// Key placed positions by hash
pub fn positions_by_hash(positions: Vec<LayoutPosition>) -> HashMap<String, LayoutPosition> {
    positions.into_iter().map(|p| (p.hash.clone(), p)).collect()
}
