use derive_more::Display;

use crate::types::Vector;

pub type Result<T> = core::result::Result<T, VolumeError>;

#[derive(Debug, Display)]
#[display("{self:?}")]
pub enum VolumeError {
    /// A world → lattice scale factor is not a finite positive number.
    InvalidScale(Vector),
    /// The volume → world factor is not a finite positive number.
    InvalidVolumeFactor(f32),
    /// A lattice axis has no cells, or the world extent along it is empty.
    EmptyLattice,
    Shape(ndarray::ShapeError),
}

impl std::error::Error for VolumeError {}

impl From<ndarray::ShapeError> for VolumeError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Shape(err)
    }
}
