pub mod export;
pub mod fetcher;
pub mod kernel;
pub mod merge;
pub mod resolver;
pub mod service;

pub use crate::domain::model::{
    AreaSpec, BoundaryRecord, Centroid, MergedBoundary, RawPolygon, RegionCode, RegionFamily,
    Selector,
};
pub use crate::domain::ports::{BoundaryStore, PolygonSource};
pub use crate::utils::error::Result;
