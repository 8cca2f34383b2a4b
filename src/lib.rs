// Library interface for gitscape (commit-graph pipeline layout)
// The binary is a thin CLI over these modules

pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod source;

// Re-export commonly used types
pub use layout::{
    CameraRig, Focus, Layout, LayoutCache, LayoutError, LayoutOptions, LayoutPosition,
    RankRange, ViewMode, ViewPlanner, ViewState,
};
pub use model::{BranchHistory, CiStatus, Commit, CommitType, Domain, Position};
