use bevy_volume_grid::{
    GridConfig, GridSource,
    csg::{Difference, Union},
    field::{ScalarField, SphereField},
    geometry::Ray,
    lattice::DenseLattice,
    storage::LatticeStorage,
    types::{Point, Value, Vector},
};

/// Storage that records every write it receives.
struct RecordingLattice {
    inner: DenseLattice,
    writes: Vec<[usize; 3]>,
}

impl LatticeStorage for RecordingLattice {
    fn dimensions(&self) -> [usize; 3] {
        self.inner.dimensions()
    }

    fn value(&self, x: usize, y: usize, z: usize) -> Value {
        self.inner.value(x, y, z)
    }

    fn set_value(&mut self, x: usize, y: usize, z: usize, value: Value) {
        self.writes.push([x, y, z]);
        self.inner.set_value(x, y, z, value);
    }
}

/// 4×4×4 lattice, all samples 1.0 except (2, 2, 2) = 5.0.
fn peak() -> GridSource<DenseLattice> {
    let mut lattice = DenseLattice::new(4, 4, 4, 1.0);
    lattice.set_value(2, 2, 2, 5.0);
    GridSource::new(lattice, GridConfig::default()).unwrap()
}

fn close(a: Point, b: Point) -> bool {
    (a - b).norm() < 1e-4
}

#[test]
fn peak_scenario() {
    let grid = peak();
    assert_eq!(grid.value_at(&Point::new(2.0, 2.0, 2.0)), 5.0);
    assert_eq!(grid.value_at(&Point::new(1.5, 2.0, 2.0)), 3.0);
}

#[test]
fn trilinear_at_lattice_points_is_exact() {
    let lattice =
        DenseLattice::from_fn(4, 4, 4, |x, y, z| (x * 7 + y * 3 + z * z) as Value * 0.1).unwrap();
    let grid = GridSource::new(lattice, GridConfig::default()).unwrap();
    for [x, y, z] in [[0, 0, 0], [1, 2, 3], [4, 4, 4], [3, 0, 2]] {
        let p = Point::new(x as Value, y as Value, z as Value);
        assert_eq!(grid.value_at(&p), grid.storage().value(x, y, z));
    }
}

#[test]
fn trilinear_is_continuous_across_cells() {
    let grid = peak();
    let below = grid.value_at(&Point::new(1.9999, 2.3, 1.7));
    let at = grid.value_at(&Point::new(2.0, 2.3, 1.7));
    let above = grid.value_at(&Point::new(2.0001, 2.3, 1.7));
    assert!((below - at).abs() < 1e-3);
    assert!((above - at).abs() < 1e-3);
}

#[test]
fn nearest_value_rounds_to_closest_sample() {
    let lattice = DenseLattice::from_fn(4, 4, 4, |x, y, z| (x + 10 * y + 100 * z) as Value).unwrap();
    let grid = GridSource::new(lattice, GridConfig::default().with_trilinear_value(false)).unwrap();
    assert_eq!(grid.value_at(&Point::new(1.4, 2.0, 3.0)), 321.0);
    assert_eq!(grid.value_at(&Point::new(1.6, 2.0, 3.0)), 322.0);
}

#[test]
fn normal_opposes_increasing_values() {
    let lattice = DenseLattice::from_fn(4, 4, 4, |x, _, _| x as Value).unwrap();
    for sobel in [false, true] {
        for trilinear in [false, true] {
            let config = GridConfig::default()
                .with_sobel_gradient(sobel)
                .with_trilinear_gradient(trilinear);
            let grid = GridSource::new(lattice.clone(), config).unwrap();
            let s = grid.value_and_gradient_at(&Point::new(1.7, 2.2, 2.0));
            assert!(s.x < 0.0, "sobel={sobel} trilinear={trilinear}: {s:?}");
            assert_eq!(s.y, 0.0);
            assert_eq!(s.z, 0.0);
        }
    }
}

#[test]
fn entry_inside_is_origin() {
    let grid = peak();
    let ray = Ray::new(Point::new(1.0, 3.5, 0.25), Vector::new(0.3, -2.0, 1.0));
    assert_eq!(grid.intersection_start(&ray), ray.origin);
}

#[test]
fn entry_and_exit_through_box() {
    let grid = peak();
    let ray = Ray::new(Point::new(-1.0, 1.0, 2.0), Vector::new(5.0, 0.0, 0.0));
    let (start, end) = grid.intersection(&ray, 100.0);
    assert!(close(start, Point::new(0.0, 1.0, 2.0)), "{start:?}");
    assert!(close(end, Point::new(4.0, 1.0, 2.0)), "{end:?}");
}

#[test]
fn ray_along_min_and_max_faces() {
    let grid = peak();
    for y in [0.0, 4.0] {
        let ray = Ray::new(Point::new(-1.0, y, 2.0), Vector::x());
        let (start, end) = grid.intersection(&ray, 100.0);
        assert!(close(start, Point::new(0.0, y, 2.0)), "y={y}: {start:?}");
        assert!(close(end, Point::new(4.0, y, 2.0)), "y={y}: {end:?}");
    }
}

#[test]
fn ray_along_box_edge() {
    let grid = peak();
    let ray = Ray::new(Point::new(-1.0, 0.0, 0.0), Vector::x());
    let (start, end) = grid.intersection(&ray, 100.0);
    assert!(close(start, Point::origin()), "{start:?}");
    assert!(close(end, Point::new(4.0, 0.0, 0.0)), "{end:?}");
}

#[test]
fn ray_through_opposite_corners() {
    let grid = peak();
    let ray = Ray::new(Point::new(-0.5, -0.5, 2.0), Vector::new(1.0, 1.0, 0.0));
    let (start, end) = grid.intersection(&ray, 100.0);
    assert!(close(start, Point::new(0.0, 0.0, 2.0)), "{start:?}");
    assert!(close(end, Point::new(4.0, 4.0, 2.0)), "{end:?}");
}

#[test]
fn ray_grazing_edge_enters_at_edge() {
    let grid = peak();
    let ray = Ray::new(Point::new(-1.0, 3.0, 2.0), Vector::new(1.0, 1.0, 0.0));
    let start = grid.intersection_start(&ray);
    assert!(close(start, Point::new(0.0, 4.0, 2.0)), "{start:?}");
}

#[test]
fn exit_marched_into_box_is_returned_as_is() {
    let grid = peak();
    let ray = Ray::new(Point::new(-3.0, 1.0, 2.0), Vector::x());
    let diagonal = (3.0 * 16.0 as Value).sqrt();
    let end = grid.intersection_end(&ray, 100.0);
    assert!(close(end, Point::new(diagonal - 3.0, 1.0, 2.0)), "{end:?}");
}

#[test]
fn exit_from_inside_reaches_far_face() {
    let grid = peak();
    let ray = Ray::new(Point::new(1.0, 1.0, 1.0), Vector::new(0.0, 0.0, 1.0));
    assert!(close(grid.intersection_end(&ray, 100.0), Point::new(1.0, 1.0, 4.0)));
}

#[test]
fn miss_falls_back_to_origin_and_max_distance() {
    let grid = peak();
    let ray = Ray::new(Point::new(-5.0, 10.0, 2.0), Vector::new(2.0, 0.0, 1.0));
    let (start, end) = grid.intersection(&ray, 7.0);
    assert_eq!(start, ray.origin);
    let expected = ray.origin + ray.direction.normalize() * 7.0;
    assert!(close(end, expected), "{end:?} != {expected:?}");
}

#[test]
fn bake_never_writes_outside_lattice() {
    let storage = RecordingLattice {
        inner: DenseLattice::new(4, 4, 4, 0.0),
        writes: Vec::new(),
    };
    let mut grid = GridSource::new(storage, GridConfig::default()).unwrap();
    let brush = SphereField::new(Point::new(3.5, -1.0, 4.5), 3.0);
    let written = grid.combine_with_source(&Union, &brush, &brush.center, brush.radius);

    let writes = &grid.storage().writes;
    assert_eq!(written, writes.len());
    assert!(!writes.is_empty());
    assert!(writes.iter().all(|&[x, y, z]| x < 4 && y < 4 && z < 4));
}

#[test]
fn bake_restores_value_interpolation() {
    let mut grid = peak();
    let p = Point::new(1.5, 2.0, 2.0);
    let before = grid.value_at(&p);

    // Far below every sample, so the union leaves the lattice unchanged.
    let floor = SphereField::new(Point::new(-100.0, -100.0, -100.0), 0.0);
    grid.combine_with_source(&Union, &floor, &Point::new(2.0, 2.0, 2.0), 2.0);

    assert_eq!(grid.value_at(&p), before);
    assert_eq!(before, 3.0);
}

#[test]
fn zero_radius_writes_nothing() {
    for center in [Point::new(2.2, 1.7, 3.0), Point::new(2.0, 2.0, 2.0)] {
        let mut grid = peak();
        let before = grid.storage().clone();
        let brush = SphereField::new(center, 0.0);
        let written = grid.combine_with_source(&Difference, &brush, &center, 0.0);
        assert_eq!(written, 0, "{center:?}");
        assert_eq!(grid.storage(), &before, "{center:?}");
    }
}

#[test]
fn bake_respects_world_scale() {
    let config = GridConfig::from_extent([8, 8, 8], Vector::new(4.0, 4.0, 4.0)).unwrap();
    let mut grid = GridSource::new(DenseLattice::new(8, 8, 8, -1.0), config).unwrap();
    let brush = SphereField::new(Point::new(2.0, 2.0, 2.0), 1.0);
    let written = grid.combine_with_source(&Union, &brush, &brush.center, brush.radius);

    // [1, 3] world → lattice [2, 6) per axis.
    assert_eq!(written, 4 * 4 * 4);
    assert_eq!(grid.storage().value(4, 4, 4), 1.0);
    assert_eq!(grid.value_at(&brush.center), 1.0);
    assert_eq!(grid.volume_to_world_factor(), 0.5);
}

#[test]
fn dimension_accessors() {
    let grid = GridSource::new(DenseLattice::new(3, 5, 7, 0.0), GridConfig::default()).unwrap();
    assert_eq!((grid.width(), grid.height(), grid.depth()), (3, 5, 7));
    assert_eq!(grid.volume_to_world_factor(), 1.0);
}
