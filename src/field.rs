use crate::types::{CompiledFunction, Point, Sample, Value, Vector, sample};

/// A continuous scalar field that can be sampled in world space.
///
/// Values above zero are inside. Normals returned by
/// [`value_and_gradient_at`](ScalarField::value_and_gradient_at) point away from
/// increasing values, i.e. out of the surface.
pub trait ScalarField: Sync {
    /// Scalar value at `position`.
    fn value_at(&self, position: &Point) -> Value;

    /// Outward normal (`xyz`) and value (`w`) at `position`.
    fn value_and_gradient_at(&self, position: &Point) -> Sample;

    /// Lattice width, `0` for fields without a backing lattice.
    fn width(&self) -> usize {
        0
    }

    /// Lattice height, `0` for fields without a backing lattice.
    fn height(&self) -> usize {
        0
    }

    /// Lattice depth, `0` for fields without a backing lattice.
    fn depth(&self) -> usize {
        0
    }

    /// Length of one lattice unit in world units, for converting distances such
    /// as raymarch step sizes.
    fn volume_to_world_factor(&self) -> Value {
        1.0
    }
}

/// Solid sphere: `radius - |p - center|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereField {
    pub center: Point,
    pub radius: Value,
}

impl SphereField {
    pub fn new(center: Point, radius: Value) -> Self {
        Self { center, radius }
    }
}

impl ScalarField for SphereField {
    fn value_at(&self, position: &Point) -> Value {
        self.radius - (position - self.center).norm()
    }

    fn value_and_gradient_at(&self, position: &Point) -> Sample {
        let offset = position - self.center;
        let normal = offset
            .try_normalize(Value::EPSILON)
            .unwrap_or_else(Vector::zeros);
        sample(normal, self.radius - offset.norm())
    }
}

/// Wraps a plain closure as a [`ScalarField`].
///
/// Gradients are estimated by central differences with spacing `2 * step`.
pub struct FunctionField {
    function: Box<CompiledFunction>,
    step: Value,
}

impl FunctionField {
    pub fn new(function: Box<CompiledFunction>) -> Self {
        Self {
            function,
            step: 0.01,
        }
    }

    /// Sets the central-difference half spacing used for gradients.
    pub fn with_step(mut self, step: Value) -> Self {
        self.step = step;
        self
    }
}

impl ScalarField for FunctionField {
    fn value_at(&self, position: &Point) -> Value {
        (self.function)(*position)
    }

    fn value_and_gradient_at(&self, position: &Point) -> Sample {
        let h = self.step;
        let f = &self.function;
        let diff = |axis: Vector| f(position + axis * h) - f(position - axis * h);
        let gradient = Vector::new(diff(Vector::x()), diff(Vector::y()), diff(Vector::z())) / (2.0 * h);
        sample(-gradient, f(*position))
    }
}
