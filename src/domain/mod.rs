// Domain layer: area models, the region tables and the ports (interfaces) to the
// polygon provider and the boundary store.

pub mod document;
pub mod model;
pub mod ports;
pub mod regions;
