//! Storage port for lattice samples.
//!
//! [`GridSource`](crate::grid::GridSource) never owns sample memory layout; it
//! reads and writes through [`LatticeStorage`] so dense, block-compressed or
//! streamed backends can be swapped without touching the sampling code.

use crate::types::{Value, Vector};

/// Addressable 3D lattice of scalar samples.
///
/// Valid indices are `0..=width`, `0..=height`, `0..=depth`. Behaviour outside
/// that range is defined by the implementation.
pub trait LatticeStorage {
    /// `[width, height, depth]` of the lattice.
    fn dimensions(&self) -> [usize; 3];

    /// Reads the sample at `(x, y, z)`.
    fn value(&self, x: usize, y: usize, z: usize) -> Value;

    /// Overwrites the sample at `(x, y, z)`.
    fn set_value(&mut self, x: usize, y: usize, z: usize, value: Value);

    /// Gradient estimate at lattice point `(x, y, z)`, pointing towards increasing values.
    ///
    /// Override when the backend can provide gradients more cheaply (e.g. precomputed).
    fn gradient(&self, x: usize, y: usize, z: usize, kernel: GradientKernel) -> Vector {
        kernel.gradient(self, x, y, z)
    }
}

/// Finite-difference scheme used for per-lattice-point gradients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GradientKernel {
    /// `f(x+1) - f(x-1)` per axis.
    #[default]
    CentralDifference,
    /// Central difference smoothed over the two neighbouring rows in one
    /// perpendicular axis, weights `1 2 1`, divided by 4.
    Sobel,
}

impl GradientKernel {
    pub fn from_sobel_flag(sobel: bool) -> Self {
        if sobel { Self::Sobel } else { Self::CentralDifference }
    }

    /// Evaluates the kernel on `storage` at lattice point `(x, y, z)`.
    ///
    /// Neighbour reads are clamped into `[0, dim]`.
    pub fn gradient<S>(self, storage: &S, x: usize, y: usize, z: usize) -> Vector
    where
        S: LatticeStorage + ?Sized,
    {
        let [w, h, d] = storage.dimensions();
        let (x, y, z) = (x as isize, y as isize, z as isize);
        let v = |dx: isize, dy: isize, dz: isize| {
            storage.value(
                clamp_index(x + dx, w),
                clamp_index(y + dy, h),
                clamp_index(z + dz, d),
            )
        };

        match self {
            Self::CentralDifference => Vector::new(
                v(1, 0, 0) - v(-1, 0, 0),
                v(0, 1, 0) - v(0, -1, 0),
                v(0, 0, 1) - v(0, 0, -1),
            ),
            Self::Sobel => {
                let gx = (v(1, -1, 0) - v(-1, -1, 0))
                    + 2.0 * (v(1, 0, 0) - v(-1, 0, 0))
                    + (v(1, 1, 0) - v(-1, 1, 0));
                let gy = (v(0, 1, -1) - v(0, -1, -1))
                    + 2.0 * (v(0, 1, 0) - v(0, -1, 0))
                    + (v(0, 1, 1) - v(0, -1, 1));
                let gz = (v(-1, 0, 1) - v(-1, 0, -1))
                    + 2.0 * (v(0, 0, 1) - v(0, 0, -1))
                    + (v(1, 0, 1) - v(1, 0, -1));
                Vector::new(gx, gy, gz) / 4.0
            }
        }
    }
}

#[inline]
fn clamp_index(i: isize, dim: usize) -> usize {
    i.clamp(0, dim as isize) as usize
}
