use super::index::{Branch, GlobalCommitSequence};
use super::lanes::LaneSlot;
use super::placer::LayoutPosition;
use crate::model::Position;
use log::{debug, warn};
use std::collections::HashMap;

/// Fraction of the bridge run covered by each lift-off point
const LIFT_OFF_RUN: [f64; 2] = [0.3, 0.6];
/// How far each lift-off point has blended from origin height to lane height
const LIFT_OFF_BLEND: [f64; 2] = [0.5, 1.0];

/// Where a non-default branch leaves its parent line.
///
/// Normally the first parent of the branch's lowest-rank owned commit. A
/// branch that owns nothing (fresh off another branch, or fully merged) is
/// anchored on the highest-rank commit of its own history instead.
pub fn resolve_origin(
    branch: &Branch,
    sequence: &GlobalCommitSequence,
    positions: &HashMap<String, LayoutPosition>,
) -> Option<Position> {
    if branch.is_default {
        return None;
    }
    let Some(first) = sequence.owned_by(&branch.name).next() else {
        let tip = branch
            .commits
            .iter()
            .filter_map(|hash| sequence.get(hash))
            .max_by_key(|entry| entry.rank)?;
        debug!(
            "Branch {} owns no commits, anchoring on tip {}",
            branch.name,
            tip.commit.short_hash()
        );
        return positions.get(tip.hash()).map(LayoutPosition::position);
    };
    let parent = first.commit.first_parent()?;
    if !sequence.contains(parent) {
        debug!(
            "Fork parent of {} on {} is outside the index",
            first.commit.short_hash(),
            branch.name
        );
        return None;
    }
    positions.get(parent).map(LayoutPosition::position)
}

/// Points between `anchor` and a commit `run` further along x
fn lift_off(anchor: Position, run: f64, slot: LaneSlot) -> impl Iterator<Item = Position> {
    LIFT_OFF_RUN.into_iter().zip(LIFT_OFF_BLEND).map(move |(share, blend)| {
        Position::new(
            anchor.x + run * share,
            anchor.y + (slot.lane - anchor.y) * blend,
            anchor.z + (slot.depth - anchor.z) * blend,
        )
    })
}

/// Build the control points for one branch.
///
/// `origin` is the fork-parent position from [`resolve_origin`]. When it is
/// missing the curve is anchored one grid step before the branch starts, on
/// the spine height at the branch's depth. A branch that owns no commits but
/// has an origin gets a one-step stub from the origin out to its lane.
pub fn build_curve(
    branch: &Branch,
    sequence: &GlobalCommitSequence,
    positions: &HashMap<String, LayoutPosition>,
    origin: Option<Position>,
    slot: LaneSlot,
    grid_spacing: f64,
) -> Vec<Position> {
    let owned: Vec<&LayoutPosition> = sequence
        .owned_by(&branch.name)
        .filter_map(|entry| positions.get(entry.hash()))
        .collect();

    if branch.is_default {
        return spine(&owned, sequence, grid_spacing);
    }

    let (Some(start), Some(end)) = (owned.first(), owned.last()) else {
        let Some(anchor) = origin else {
            debug!("Branch {} has no commits in the index, no curve", branch.name);
            return Vec::new();
        };
        let mut points = vec![anchor];
        points.extend(lift_off(anchor, grid_spacing, slot));
        points.push(Position::new(anchor.x + grid_spacing, slot.lane, slot.depth));
        return points;
    };
    let start_pos = start.position();
    let end_pos = end.position();

    let anchor = origin.unwrap_or_else(|| {
        warn!(
            "Branch {} has no resolvable fork parent, anchoring at rank {}",
            branch.name,
            start.rank.saturating_sub(1)
        );
        Position::new(
            start.rank.saturating_sub(1) as f64 * grid_spacing,
            0.0,
            slot.depth,
        )
    });

    let mut points = vec![anchor];
    points.extend(lift_off(anchor, start_pos.x - anchor.x, slot));
    points.push(start_pos);
    if owned.len() >= 3 {
        points.push(owned[owned.len() / 2].position());
    }
    points.push(end_pos);
    points
}

/// Straight two-point spine for the default branch
fn spine(
    owned: &[&LayoutPosition],
    sequence: &GlobalCommitSequence,
    grid_spacing: f64,
) -> Vec<Position> {
    match (owned.first(), owned.last()) {
        (Some(first), Some(last)) => vec![first.position(), last.position()],
        _ => {
            let end = sequence
                .global_span()
                .map_or(0.0, |(_, last)| last as f64 * grid_spacing);
            vec![Position::ORIGIN, Position::new(end, 0.0, 0.0)]
        }
    }
}
