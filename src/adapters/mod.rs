// Adapters layer: concrete implementations of the domain ports (polygon provider, boundary store).

pub mod http;
pub mod storage;

pub use http::PcMilerSource;
pub use storage::{FileBoundaryStore, MemoryBoundaryStore};
