use std::ops::Range;

use crate::{
    csg::{CsgOperation, CsgOperationSource},
    error::{Result, VolumeError},
    field::ScalarField,
    geometry::{Aabb, Ray},
    interp::{LatticeCell, nearest_index},
    storage::{GradientKernel, LatticeStorage},
    types::{Point, Sample, Value, Vector, sample},
};

/// Immutable sampling configuration of a [`GridSource`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// World → lattice multiplier per axis.
    pub scale: Vector,
    /// Length of one lattice unit in world units.
    pub volume_to_world_factor: Value,
    /// Trilinear value reconstruction, nearest lattice point otherwise.
    pub trilinear_value: bool,
    /// Trilinear gradient reconstruction, nearest lattice point otherwise.
    pub trilinear_gradient: bool,
    /// Per-point gradients use [`GradientKernel::Sobel`] instead of central differences.
    pub sobel_gradient: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            scale: Vector::new(1.0, 1.0, 1.0),
            volume_to_world_factor: 1.0,
            trilinear_value: true,
            trilinear_gradient: true,
            sobel_gradient: false,
        }
    }
}

impl GridConfig {
    /// Derives scale and volume factor for a lattice of `dims` cells covering
    /// `world_extent` world units, anchored at the world origin.
    pub fn from_extent(dims: [usize; 3], world_extent: Vector) -> Result<Self> {
        if dims.contains(&0) || world_extent.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(VolumeError::EmptyLattice);
        }
        let dims = Vector::new(dims[0] as Value, dims[1] as Value, dims[2] as Value);
        Ok(Self {
            scale: dims.component_div(&world_extent),
            volume_to_world_factor: world_extent.x / dims.x,
            ..Default::default()
        })
    }

    /// Sets the world → lattice multiplier per axis.
    pub fn with_scale(mut self, scale: Vector) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the length of one lattice unit in world units.
    pub fn with_volume_to_world_factor(mut self, factor: Value) -> Self {
        self.volume_to_world_factor = factor;
        self
    }

    /// Chooses trilinear (`true`) or nearest-neighbour (`false`) value sampling.
    pub fn with_trilinear_value(mut self, trilinear: bool) -> Self {
        self.trilinear_value = trilinear;
        self
    }

    /// Chooses trilinear (`true`) or nearest-neighbour (`false`) gradient sampling.
    pub fn with_trilinear_gradient(mut self, trilinear: bool) -> Self {
        self.trilinear_gradient = trilinear;
        self
    }

    /// Uses the Sobel kernel for per-point gradients instead of central differences.
    pub fn with_sobel_gradient(mut self, sobel: bool) -> Self {
        self.sobel_gradient = sobel;
        self
    }

    /// Checks that every scale factor and the volume factor are finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(VolumeError::InvalidScale(self.scale));
        }
        let factor = self.volume_to_world_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(VolumeError::InvalidVolumeFactor(factor));
        }
        Ok(())
    }

    #[inline]
    fn gradient_kernel(&self) -> GradientKernel {
        GradientKernel::from_sobel_flag(self.sobel_gradient)
    }
}

/// Scalar field reconstructed from a regular lattice of samples.
///
/// Positions are mapped to lattice space by a per-axis scale; the lattice box
/// spans `[0, width] × [0, height] × [0, depth]` in lattice units. The
/// configuration is fixed for the lifetime of the source; only the backing
/// storage changes, through [`combine_with_source`](GridSource::combine_with_source)
/// or [`storage_mut`](GridSource::storage_mut).
#[derive(Debug, Clone)]
pub struct GridSource<S> {
    storage: S,
    config: GridConfig,
}

impl<S: LatticeStorage> GridSource<S> {
    /// Wraps `storage` after validating `config`.
    pub fn new(storage: S, config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { storage, config })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Direct access to the samples, bypassing the bake.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// `[width, height, depth]` of the lattice.
    pub fn dimensions(&self) -> [usize; 3] {
        self.storage.dimensions()
    }

    /// Lattice box in lattice units.
    pub fn bounds(&self) -> Aabb {
        let [w, h, d] = self.dimensions();
        Aabb::from_extent(Vector::new(w as Value, h as Value, d as Value))
    }

    /// Maps a world-space position into lattice space.
    #[inline]
    pub fn to_lattice(&self, position: &Point) -> Point {
        Point::from(position.coords.component_mul(&self.config.scale))
    }

    /// Where `ray` enters the lattice box.
    ///
    /// Returns the origin itself when it is already inside, and also when the
    /// ray misses the box; callers must tolerate an empty traversal then.
    pub fn intersection_start(&self, ray: &Ray) -> Point {
        let bounds = self.bounds();
        if bounds.contains(&ray.origin) {
            return ray.origin;
        }

        ray.normalized()
            .and_then(|ray| ray.intersect_aabb(&bounds).map(|t| ray.at(t)))
            .unwrap_or(ray.origin)
    }

    /// Where `ray` leaves the lattice box.
    ///
    /// Marches forward by the box diagonal and intersects the reversed ray. An
    /// origin more than a diagonal in front of the box can march into it; that
    /// point is returned as-is. If the reversed ray misses, the result is
    /// `origin + direction * max_distance`. The fallback also triggers on
    /// spurious misses caused by rounding when the ray grazes an edge of the box.
    pub fn intersection_end(&self, ray: &Ray, max_distance: Value) -> Point {
        let Some(ray) = ray.normalized() else {
            return ray.origin;
        };
        let bounds = self.bounds();

        let inverted = Ray::new(ray.at(bounds.size().norm()), -ray.direction);
        match inverted.intersect_aabb(&bounds) {
            Some(t) => inverted.at(t),
            None => ray.at(max_distance),
        }
    }

    /// Entry and exit points of `ray`, see [`intersection_start`](GridSource::intersection_start)
    /// and [`intersection_end`](GridSource::intersection_end).
    pub fn intersection(&self, ray: &Ray, max_distance: Value) -> (Point, Point) {
        (
            self.intersection_start(ray),
            self.intersection_end(ray, max_distance),
        )
    }

    /// Borrowed view of this grid sampling values trilinearly or not,
    /// regardless of the configured mode. Gradients keep the configured mode.
    pub fn override_value_sampling(&self, trilinear: bool) -> SamplingOverride<'_, S> {
        SamplingOverride {
            grid: self,
            trilinear_value: trilinear,
        }
    }

    fn value_with(&self, position: &Point, trilinear: bool) -> Value {
        let p = self.to_lattice(position);
        if trilinear {
            let cell = LatticeCell::containing(&p);
            cell.blend(cell.corners().map(|[x, y, z]| self.storage.value(x, y, z)))
        } else {
            let [x, y, z] = nearest_index(&p);
            self.storage.value(x, y, z)
        }
    }

    fn normal_at(&self, position: &Point) -> Vector {
        let p = self.to_lattice(position);
        let kernel = self.config.gradient_kernel();
        let gradient = if self.config.trilinear_gradient {
            let cell = LatticeCell::containing(&p);
            cell.blend(
                cell.corners()
                    .map(|[x, y, z]| self.storage.gradient(x, y, z, kernel)),
            )
        } else {
            let [x, y, z] = nearest_index(&p);
            self.storage.gradient(x, y, z, kernel)
        };
        -gradient
    }

    fn sample_with(&self, position: &Point, trilinear_value: bool) -> Sample {
        sample(
            self.normal_at(position),
            self.value_with(position, trilinear_value),
        )
    }
}

impl<S: LatticeStorage + Sync> GridSource<S> {
    /// Bakes `operation(self, source)` into the lattice around a world-space sphere.
    ///
    /// Every lattice point in the sphere's bounding box, clamped to
    /// `[0, dim)` per axis, is overwritten with the combined value at its world
    /// position. Operand A samples this grid with nearest-neighbour values and
    /// sees the lattice as it was before the bake. Returns the number of samples
    /// written.
    pub fn combine_with_source<O>(
        &mut self,
        operation: &O,
        source: &dyn ScalarField,
        center: &Point,
        radius: Value,
    ) -> usize
    where
        O: CsgOperation + ?Sized,
    {
        let _span = tracing::debug_span!("combine_with_source", ?center, radius).entered();

        let world_scale = self.config.scale.map(|s| 1.0 / s);
        let [w, h, d] = self.dimensions();
        let xs = lattice_range(center.x, radius, self.config.scale.x, w);
        let ys = lattice_range(center.y, radius, self.config.scale.y, h);
        let zs = lattice_range(center.z, radius, self.config.scale.z, d);
        tracing::trace!(?xs, ?ys, ?zs, "bake region");

        let staged: Vec<Value> = {
            let this = self.override_value_sampling(false);
            let mut bound = CsgOperationSource::new(operation);
            bound.bind_operand_a(&this);
            bound.bind_operand_b(source);

            region_indices(xs.clone(), ys.clone(), zs.clone())
                .map(|[x, y, z]| {
                    let position = Point::new(
                        x as Value * world_scale.x,
                        y as Value * world_scale.y,
                        z as Value * world_scale.z,
                    );
                    bound.evaluate(&position)
                })
                .collect()
        };

        for ([x, y, z], &value) in region_indices(xs, ys, zs).zip(&staged) {
            self.storage.set_value(x, y, z, value);
        }

        tracing::debug!(written = staged.len(), "baked region");
        staged.len()
    }
}

/// Lattice points of a box region, x fastest, then y, then z.
fn region_indices(
    xs: Range<usize>,
    ys: Range<usize>,
    zs: Range<usize>,
) -> impl Iterator<Item = [usize; 3]> {
    zs.flat_map(move |z| {
        let xs = xs.clone();
        ys.clone().flat_map(move |y| xs.clone().map(move |x| [x, y, z]))
    })
}

/// Lattice indices covered by `[c - r, c + r]` on one axis, clamped to `[0, dim]`.
fn lattice_range(c: Value, r: Value, scale: Value, dim: usize) -> Range<usize> {
    let to_index = |v: Value| ((v * scale) as i64).clamp(0, dim as i64) as usize;
    to_index(c - r)..to_index(c + r)
}

impl<S: LatticeStorage + Sync> ScalarField for GridSource<S> {
    fn value_at(&self, position: &Point) -> Value {
        self.value_with(position, self.config.trilinear_value)
    }

    fn value_and_gradient_at(&self, position: &Point) -> Sample {
        self.sample_with(position, self.config.trilinear_value)
    }

    fn width(&self) -> usize {
        self.dimensions()[0]
    }

    fn height(&self) -> usize {
        self.dimensions()[1]
    }

    fn depth(&self) -> usize {
        self.dimensions()[2]
    }

    fn volume_to_world_factor(&self) -> Value {
        self.config.volume_to_world_factor
    }
}

/// A [`GridSource`] seen with an overridden value sampling mode.
///
/// Created by [`GridSource::override_value_sampling`]. The grid itself is never
/// modified, so the override ends when the view goes out of scope.
pub struct SamplingOverride<'a, S> {
    grid: &'a GridSource<S>,
    trilinear_value: bool,
}

impl<S: LatticeStorage + Sync> ScalarField for SamplingOverride<'_, S> {
    fn value_at(&self, position: &Point) -> Value {
        self.grid.value_with(position, self.trilinear_value)
    }

    fn value_and_gradient_at(&self, position: &Point) -> Sample {
        self.grid.sample_with(position, self.trilinear_value)
    }

    fn width(&self) -> usize {
        self.grid.width()
    }

    fn height(&self) -> usize {
        self.grid.height()
    }

    fn depth(&self) -> usize {
        self.grid.depth()
    }

    fn volume_to_world_factor(&self) -> Value {
        self.grid.volume_to_world_factor()
    }
}
