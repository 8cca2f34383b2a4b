use super::lanes::LaneSlot;
use super::pipeline::Layout;
use crate::model::{Position, Vector};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[serde(rename = "3d")]
    #[default]
    ThreeD,
    #[serde(rename = "top")]
    Top,
    #[serde(rename = "front")]
    Front,
}

impl<'de> Deserialize<'de> for ViewMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ViewMode::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "3d" | "iso" | "isometric" => Ok(ViewMode::ThreeD),
            "top" => Ok(ViewMode::Top),
            "front" => Ok(ViewMode::Front),
            _ => Err(format!("Invalid view mode: {s}. Must be '3d', 'top' or 'front'")),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::ThreeD => write!(f, "3d"),
            ViewMode::Top => write!(f, "top"),
            ViewMode::Front => write!(f, "front"),
        }
    }
}

/// Which branches the layout and camera emphasise
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    #[default]
    All,
    Branch(String),
}

impl FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Focus must be 'all' or a branch name".to_string());
        }
        if trimmed.eq_ignore_ascii_case("all") {
            Ok(Focus::All)
        } else {
            Ok(Focus::Branch(trimmed.to_string()))
        }
    }
}

impl std::fmt::Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Focus::All => write!(f, "all"),
            Focus::Branch(name) => write!(f, "{name}"),
        }
    }
}

/// Inclusive span of ranks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankRange {
    pub start: usize,
    pub end: usize,
}

impl RankRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    fn within(&self, outer: &RankRange) -> bool {
        self.start <= self.end && self.start >= outer.start && self.end <= outer.end
    }
}

impl From<(usize, usize)> for RankRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// Target camera pose for one request
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ViewState {
    pub mode: ViewMode,
    pub position: Position,
    pub target: Position,
    pub up: Vector,
    pub rank_range: RankRange,
}

/// What the planner needs to know about the computed layout
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub lanes: &'a BTreeMap<String, LaneSlot>,
    /// `None` when the layout has no commits
    pub global: Option<RankRange>,
    pub grid_spacing: f64,
    pub min_camera_distance: f64,
}

/// Plan a camera pose.
///
/// A missing, inverted or out-of-bounds `rank_range` falls back to the global
/// span, since an empty range has no meaningful midpoint.
pub fn plan_view(
    mode: ViewMode,
    focus: &Focus,
    rank_range: Option<RankRange>,
    ctx: &ViewContext<'_>,
) -> ViewState {
    let global = ctx.global.unwrap_or(RankRange::new(0, 0));
    let range = match rank_range {
        Some(r) if r.within(&global) => r,
        Some(r) => {
            debug!("Rank range {r:?} outside {global:?}, using global range");
            global
        }
        None => global,
    };

    let slot = match focus {
        Focus::All => LaneSlot::SPINE,
        Focus::Branch(name) => ctx.lanes.get(name).copied().unwrap_or(LaneSlot::SPINE),
    };

    let start_x = range.start as f64 * ctx.grid_spacing;
    let end_x = range.end as f64 * ctx.grid_spacing;
    let mid_x = (start_x + end_x) / 2.0;
    let distance = ((end_x - start_x) * 0.6).max(ctx.min_camera_distance);
    let center = Position::new(mid_x, slot.lane, slot.depth);

    let (position, target, up) = match mode {
        ViewMode::Top => (
            Position::new(mid_x, slot.lane, slot.depth + distance * 1.5),
            center,
            Position::UP_Y,
        ),
        ViewMode::Front => (
            Position::new(start_x - distance, slot.lane, slot.depth),
            center,
            Position::UP_Z,
        ),
        ViewMode::ThreeD => (
            Position::new(
                start_x - distance * 0.5,
                slot.lane + distance * 0.6,
                slot.depth + distance,
            ),
            center,
            Position::UP_Y,
        ),
    };

    ViewState {
        mode,
        position,
        target,
        up,
        rank_range: range,
    }
}

/// Plans views over a computed layout, deriving rank ranges from focus
pub struct ViewPlanner<'a> {
    layout: &'a Layout,
    min_camera_distance: f64,
}

impl<'a> ViewPlanner<'a> {
    pub fn new(layout: &'a Layout, min_camera_distance: f64) -> Self {
        Self {
            layout,
            min_camera_distance,
        }
    }

    /// Focused requests frame that branch's own rank span
    pub fn plan(&self, mode: ViewMode, focus: &Focus) -> ViewState {
        let range = match focus {
            Focus::All => None,
            Focus::Branch(name) => self
                .layout
                .sequence()
                .rank_span_of(name)
                .map(RankRange::from),
        };
        let ctx = ViewContext {
            lanes: self.layout.lanes(),
            global: self.layout.sequence().global_span().map(RankRange::from),
            grid_spacing: self.layout.options().placement.grid_spacing,
            min_camera_distance: self.min_camera_distance,
        };
        plan_view(mode, focus, range, &ctx)
    }
}
