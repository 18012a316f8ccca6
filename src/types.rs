use nalgebra::{Point3, Vector3, Vector4};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// Combined field sample: `xyz` is the (outward) normal, `w` the scalar value.
pub type Sample = Vector4<Value>;

/// A scalar field function: maps a [`Point`] to a [`Value`].
///
/// Values **above** zero are considered "inside" the surface.
pub type CompiledFunction = dyn Fn(Point) -> Value + Sync;

/// Packs a normal and a value into a [`Sample`].
#[inline]
pub fn sample(normal: Vector, value: Value) -> Sample {
    Sample::new(normal.x, normal.y, normal.z, value)
}
