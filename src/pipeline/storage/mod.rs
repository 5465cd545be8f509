// Blob store implementations that need no network access

pub mod fs;
pub mod in_memory;

pub use fs::FsBlobStore;
pub use in_memory::InMemoryBlobStore;
