use std::ops::{Add, Mul};

use crate::types::{Point, Value};

/// Floor/ceil lattice indices and fractional offsets of a lattice-space position.
///
/// When a coordinate is already integral `x0 == x1` and `dx == 0`, so the
/// trilinear weights collapse onto a direct lookup without special-casing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeCell {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
    pub z0: usize,
    pub z1: usize,
    pub dx: Value,
    pub dy: Value,
    pub dz: Value,
}

impl LatticeCell {
    /// Splits a lattice-space position into its enclosing cell.
    ///
    /// Negative coordinates saturate to index `0`; callers are expected to stay
    /// inside `[0, dim]`.
    #[inline]
    pub fn containing(p: &Point) -> Self {
        let x0 = p.x as usize;
        let y0 = p.y as usize;
        let z0 = p.z as usize;
        Self {
            x0,
            x1: p.x.ceil() as usize,
            y0,
            y1: p.y.ceil() as usize,
            z0,
            z1: p.z.ceil() as usize,
            dx: p.x - x0 as Value,
            dy: p.y - y0 as Value,
            dz: p.z - z0 as Value,
        }
    }

    /// Returns the 8 corner indices `[x, y, z]` of the cell.
    ///
    /// ```text
    ///  0 = f000 (x0, y0, z0)    4 = f101 (x1, y0, z1)
    ///  1 = f100 (x1, y0, z0)    5 = f011 (x0, y1, z1)
    ///  2 = f010 (x0, y1, z0)    6 = f110 (x1, y1, z0)
    ///  3 = f001 (x0, y0, z1)    7 = f111 (x1, y1, z1)
    /// ```
    #[inline]
    pub fn corners(&self) -> [[usize; 3]; 8] {
        let Self {
            x0,
            x1,
            y0,
            y1,
            z0,
            z1,
            ..
        } = *self;
        [
            [x0, y0, z0],
            [x1, y0, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x1, y0, z1],
            [x0, y1, z1],
            [x1, y1, z0],
            [x1, y1, z1],
        ]
    }

    /// Blends the 8 corner samples (ordered as [`corners`](LatticeCell::corners)).
    ///
    /// Near-Z face and far-Z face are weighted by `(1-dZ)` and `dZ`, the shared
    /// `f110/f111` edge is factored out by `dX*dY`. The order of operations is
    /// part of the contract: reordering changes rounding.
    #[inline]
    pub fn blend<T>(&self, f: [T; 8]) -> T
    where
        T: Copy + Add<Output = T> + Mul<Value, Output = T>,
    {
        let [f000, f100, f010, f001, f101, f011, f110, f111] = f;

        let one_min_x = 1.0 - self.dx;
        let one_min_y = 1.0 - self.dy;
        let one_min_z = 1.0 - self.dz;
        let one_min_x_one_min_y = one_min_x * one_min_y;
        let dx_one_min_y = self.dx * one_min_y;

        (f000 * one_min_x_one_min_y + f100 * dx_one_min_y + f010 * one_min_x * self.dy)
            * one_min_z
            + (f001 * one_min_x_one_min_y + f101 * dx_one_min_y + f011 * one_min_x * self.dy)
                * self.dz
            + (f110 * one_min_z + f111 * self.dz) * (self.dx * self.dy)
    }
}

/// Rounds a lattice-space position to the nearest lattice point.
#[inline]
pub fn nearest_index(p: &Point) -> [usize; 3] {
    [
        (p.x + 0.5) as usize,
        (p.y + 0.5) as usize,
        (p.z + 0.5) as usize,
    ]
}
