pub mod repository;
pub mod snapshot;

pub use repository::{RepositoryHistories, load_repository};
pub use snapshot::Snapshot;
