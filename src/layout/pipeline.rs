use super::curve::{build_curve, resolve_origin};
use super::error::LayoutError;
use super::index::{Branch, GlobalCommitSequence, build_index};
use super::lanes::{LaneSlot, assign_lanes};
use super::placer::{LayoutPosition, PlacementOptions, place_commits, positions_by_hash};
use super::view::Focus;
use crate::model::{BranchHistory, Domain, Position};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LayoutOptions {
    pub placement: PlacementOptions,
    pub focus: Focus,
}

/// Every derived structure for one input snapshot.
/// Rebuilt wholesale whenever the input changes.
#[derive(Debug, Clone)]
pub struct Layout {
    options: LayoutOptions,
    sequence: GlobalCommitSequence,
    branches: Vec<Branch>,
    lanes: BTreeMap<String, LaneSlot>,
    positions: HashMap<String, LayoutPosition>,
    curves: BTreeMap<String, Vec<Position>>,
}

impl Layout {
    pub fn compute(histories: &[BranchHistory], options: &LayoutOptions) -> Result<Self, LayoutError> {
        let default_branch = options.placement.default_branch.as_str();

        // The default branch goes first so it owns shared ancestry
        let mut ordered: Vec<&BranchHistory> = histories.iter().collect();
        ordered.sort_by_key(|h| h.name != default_branch);
        let ordered: Vec<BranchHistory> = ordered.into_iter().cloned().collect();

        let sequence = build_index(&ordered)?;
        let branches: Vec<Branch> = ordered
            .iter()
            .map(|h| Branch::from_history(h, &sequence, default_branch))
            .collect();
        let lanes = assign_lanes(&branches);
        let positions = positions_by_hash(place_commits(
            &sequence,
            &lanes,
            &options.focus,
            &options.placement,
        ));

        let mut curves = BTreeMap::new();
        for branch in &branches {
            let slot = lanes.get(&branch.name).copied().unwrap_or(LaneSlot::SPINE);
            let origin = resolve_origin(branch, &sequence, &positions);
            let curve = build_curve(
                branch,
                &sequence,
                &positions,
                origin,
                slot,
                options.placement.grid_spacing,
            );
            debug!("Curve for {}: {} control points", branch.name, curve.len());
            curves.insert(branch.name.clone(), curve);
        }

        info!(
            "Computed layout: {} branches, {} commits",
            branches.len(),
            sequence.len()
        );

        Ok(Self {
            options: options.clone(),
            sequence,
            branches,
            lanes,
            positions,
            curves,
        })
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn sequence(&self) -> &GlobalCommitSequence {
        &self.sequence
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    pub fn lanes(&self) -> &BTreeMap<String, LaneSlot> {
        &self.lanes
    }

    pub fn position(&self, hash: &str) -> Option<&LayoutPosition> {
        self.positions.get(hash)
    }

    pub fn positions(&self) -> &HashMap<String, LayoutPosition> {
        &self.positions
    }

    pub fn curve(&self, branch: &str) -> Option<&[Position]> {
        self.curves.get(branch).map(Vec::as_slice)
    }

    pub fn curves(&self) -> &BTreeMap<String, Vec<Position>> {
        &self.curves
    }

    /// Serializable view for a renderer in another process
    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut positions: Vec<LayoutPosition> = self.positions.values().cloned().collect();
        positions.sort_by_key(|p| p.rank);

        LayoutSnapshot {
            focus: self.options.focus.clone(),
            branches: self
                .branches
                .iter()
                .map(|b| BranchSnapshot {
                    name: b.name.clone(),
                    domain: b.dominant_domain,
                    is_default: b.is_default,
                    lane: self.lanes.get(&b.name).copied().unwrap_or(LaneSlot::SPINE),
                    rank_span: self.sequence.rank_span_of(&b.name),
                    curve: self.curves.get(&b.name).cloned().unwrap_or_default(),
                })
                .collect(),
            positions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchSnapshot {
    pub name: String,
    pub domain: Domain,
    pub is_default: bool,
    pub lane: LaneSlot,
    pub rank_span: Option<(usize, usize)>,
    pub curve: Vec<Position>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutSnapshot {
    pub focus: Focus,
    pub branches: Vec<BranchSnapshot>,
    /// In rank order
    pub positions: Vec<LayoutPosition>,
}
