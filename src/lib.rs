pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileBoundaryStore, MemoryBoundaryStore, PcMilerSource};
pub use config::MergeConfig;
pub use crate::core::{
    kernel::{GeoKernel, GeometryKernel},
    service::{AreaService, MergeSettings},
};
pub use domain::document::parse_area;
pub use domain::model::{
    AreaSpec, BoundaryRecord, Centroid, MergedBoundary, RawPolygon, RegionFamily, Selector,
};
pub use domain::ports::{BoundaryStore, PolygonSource};
pub use utils::error::{AreaError, Result};
