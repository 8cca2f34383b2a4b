pub mod geometry;
pub mod types;

// Re-export types to keep call sites short
pub use geometry::*;
pub use types::*;
