pub mod csg;
pub mod error;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod interp;
pub mod lattice;
pub mod plugin;
pub mod storage;
pub mod types;

pub use grid::{GridConfig, GridSource};
pub use plugin::VolumeGridPlugin;
