use super::index::Branch;
use crate::model::Domain;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct LaneSlot {
    /// Coarse layer (y), one per domain
    pub lane: f64,
    /// Lateral spread (z) between sibling branches of one domain
    pub depth: f64,
}

impl LaneSlot {
    pub const SPINE: LaneSlot = LaneSlot {
        lane: 0.0,
        depth: 0.0,
    };
}

/// Fixed layer for each domain. Zero is reserved for the default branch.
pub fn canonical_layer(domain: Domain) -> f64 {
    match domain {
        Domain::Frontend => 8.0,
        Domain::Backend => 4.0,
        Domain::Db => -4.0,
        Domain::Other => -8.0,
    }
}

/// Depth for the `n`th (1-based) branch of a domain: +2, -2, +4, -4, ...
fn depth_for(n: usize) -> f64 {
    let magnitude = n.div_ceil(2) as f64 * 2.0;
    if n % 2 == 1 { magnitude } else { -magnitude }
}

/// Assign every branch a lane and depth.
///
/// Non-default branches are visited in lexical name order so the result does
/// not depend on how the caller ordered `branches`. A repeated name keeps the
/// slot of its first occurrence.
pub fn assign_lanes(branches: &[Branch]) -> BTreeMap<String, LaneSlot> {
    let mut slots = BTreeMap::new();
    let mut per_domain: HashMap<Domain, usize> = HashMap::new();

    let mut others: Vec<&Branch> = Vec::new();
    for branch in branches {
        if branch.is_default {
            slots.insert(branch.name.clone(), LaneSlot::SPINE);
        } else {
            others.push(branch);
        }
    }
    others.sort_by(|a, b| a.name.cmp(&b.name));

    for branch in others {
        if slots.contains_key(&branch.name) {
            warn!("Duplicate branch name {}, keeping its first lane", branch.name);
            continue;
        }
        let n = per_domain.entry(branch.dominant_domain).or_default();
        *n += 1;
        let slot = LaneSlot {
            lane: canonical_layer(branch.dominant_domain),
            depth: depth_for(*n),
        };
        debug!(
            "Branch {} ({}) -> lane {}, depth {}",
            branch.name, branch.dominant_domain, slot.lane, slot.depth
        );
        slots.insert(branch.name.clone(), slot);
    }

    slots
}
