use ndarray::Array3;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    error::Result,
    storage::LatticeStorage,
    types::Value,
};

/// Dense in-memory lattice.
///
/// A lattice of dimensions `width × height × depth` has
/// `(width + 1) × (height + 1) × (depth + 1)` sample points, so that every cell
/// has a full set of 8 corners. Samples are stored as `values[[z, y, x]]`.
///
/// Reads outside the lattice are clamped to the nearest boundary sample; writes
/// outside it are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLattice {
    width: usize,
    height: usize,
    depth: usize,
    values: Array3<Value>,
}

impl DenseLattice {
    /// Creates a lattice with every sample set to `fill`.
    pub fn new(width: usize, height: usize, depth: usize, fill: Value) -> Self {
        log::debug!(
            "allocating {}x{}x{} lattice",
            width + 1,
            height + 1,
            depth + 1
        );
        Self {
            width,
            height,
            depth,
            values: Array3::from_elem((depth + 1, height + 1, width + 1), fill),
        }
    }

    /// Creates a lattice by evaluating `f(x, y, z)` at every sample point.
    ///
    /// Work is parallelised over Z slices using Rayon.
    pub fn from_fn<F>(width: usize, height: usize, depth: usize, f: F) -> Result<Self>
    where
        F: Fn(usize, usize, usize) -> Value + Sync,
    {
        let (nx, ny, nz) = (width + 1, height + 1, depth + 1);
        log::debug!("filling {nx}x{ny}x{nz} lattice");

        let per_z: Vec<Vec<Value>> = (0..nz)
            .into_par_iter()
            .map(|z| {
                let mut slice = Vec::with_capacity(nx * ny);
                for y in 0..ny {
                    for x in 0..nx {
                        slice.push(f(x, y, z));
                    }
                }
                slice
            })
            .collect();

        let values = Array3::from_shape_vec((nz, ny, nx), per_z.concat())?;

        Ok(Self {
            width,
            height,
            depth,
            values,
        })
    }

    /// Raw samples, indexed `[[z, y, x]]`.
    pub fn values(&self) -> &Array3<Value> {
        &self.values
    }

    #[inline]
    fn clamped(&self, x: usize, y: usize, z: usize) -> [usize; 3] {
        [z.min(self.depth), y.min(self.height), x.min(self.width)]
    }
}

impl LatticeStorage for DenseLattice {
    fn dimensions(&self) -> [usize; 3] {
        [self.width, self.height, self.depth]
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> Value {
        self.values[self.clamped(x, y, z)]
    }

    #[inline]
    fn set_value(&mut self, x: usize, y: usize, z: usize, value: Value) {
        if let Some(v) = self.values.get_mut([z, y, x]) {
            *v = value;
        }
    }
}
