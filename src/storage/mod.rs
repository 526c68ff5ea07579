pub mod memory;

pub use memory::{ExpertRepository, RepositoryMetadata, RepositoryStats};
