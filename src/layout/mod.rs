//! Commit-graph spatial layout engine
//! Everything in here is a pure function over immutable snapshots

pub mod cache;
pub mod curve;
pub mod error;
pub mod index;
pub mod lanes;
pub mod pipeline;
pub mod placer;
pub mod seed;
pub mod transition;
pub mod view;

pub use cache::LayoutCache;
pub use curve::{build_curve, resolve_origin};
pub use error::LayoutError;
pub use index::{Branch, GlobalCommitSequence, IndexedCommit, build_index};
pub use lanes::{LaneSlot, assign_lanes, canonical_layer};
pub use pipeline::{Layout, LayoutOptions, LayoutSnapshot};
pub use placer::{LayoutPosition, PlacementOptions, place_commits};
pub use transition::{CameraRig, CameraState, InterpolationPlan};
pub use view::{Focus, RankRange, ViewContext, ViewMode, ViewPlanner, ViewState, plan_view};
