use crate::types::{Point, Value, Vector};

/// Axis-aligned box given by its `min` and `max` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Box spanning `[0, w] × [0, h] × [0, d]`.
    pub fn from_extent(extent: Vector) -> Self {
        Self::new(Point::origin(), Point::from(extent))
    }

    /// Edge lengths of the box.
    #[inline]
    pub fn size(&self) -> Vector {
        self.max - self.min
    }

    /// Whether `p` lies inside the box or on its boundary.
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// A half-line starting at `origin`.
///
/// `direction` is not required to be unit length; distances returned by
/// [`intersect_aabb`](Ray::intersect_aabb) are measured in multiples of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vector,
}

impl Ray {
    pub fn new(origin: Point, direction: Vector) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: Value) -> Point {
        self.origin + self.direction * t
    }

    /// Copy of the ray with a unit direction, or `None` for a zero direction.
    pub fn normalized(&self) -> Option<Self> {
        self.direction
            .try_normalize(Value::EPSILON)
            .map(|direction| Self::new(self.origin, direction))
    }

    /// Slab test against `aabb`, boundaries included.
    ///
    /// Returns the distance to the nearest hit in front of the origin, `0.0` if the
    /// origin is inside the box, or `None` if the ray misses. A ray running inside
    /// a face plane or along an edge of the box hits it.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<Value> {
        let mut tmin = Value::NEG_INFINITY;
        let mut tmax = Value::INFINITY;

        for axis in 0..3 {
            let (o, d) = (self.origin[axis], self.direction[axis]);
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            // Parallel to this slab: inside it or never.
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        (tmax >= tmin && tmax >= 0.0).then_some(tmin.max(0.0))
    }
}
