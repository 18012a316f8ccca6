use std::collections::VecDeque;

use bevy::prelude::*;

use crate::{
    csg::CsgKind,
    field::SphereField,
    grid::GridSource,
    lattice::DenseLattice,
    types::{Point, Value},
};

/// System sets for the sculpting pipeline.
///
/// Order your own systems relative to edits, e.g. to re-upload a volume texture
/// once the lattice has changed:
///
/// ```rust,ignore
/// app.add_systems(Update, upload_volume.after(VolumeGridSet::Sculpt));
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum VolumeGridSet {
    /// Applies queued [`SculptEdit`]s to [`GridVolume`]s.
    Sculpt,
}

/// A dense, sculptable scalar field grid.
///
/// Query with `Changed<GridVolume>` to react to baked edits.
#[derive(Component, Deref, DerefMut)]
pub struct GridVolume(pub GridSource<DenseLattice>);

/// A spherical brush stroke combined into a [`GridVolume`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SculptEdit {
    pub operation: CsgKind,
    /// World-space brush centre.
    pub center: Point,
    /// World-space brush radius.
    pub radius: Value,
}

impl SculptEdit {
    /// Adds material inside the sphere.
    pub fn add(center: Point, radius: Value) -> Self {
        Self {
            operation: CsgKind::Union,
            center,
            radius,
        }
    }

    /// Removes material inside the sphere.
    pub fn carve(center: Point, radius: Value) -> Self {
        Self {
            operation: CsgKind::Difference,
            center,
            radius,
        }
    }

    /// Bakes the edit into `grid`, returning the number of samples written.
    pub fn apply(&self, grid: &mut GridSource<DenseLattice>) -> usize {
        let brush = SphereField::new(self.center, self.radius);
        grid.combine_with_source(&self.operation, &brush, &self.center, self.radius)
    }
}

/// Pending edits for a [`GridVolume`], applied front to back.
#[derive(Component, Default, Debug, Deref, DerefMut)]
pub struct SculptQueue(pub VecDeque<SculptEdit>);

impl SculptQueue {
    pub fn push(&mut self, edit: SculptEdit) {
        self.0.push_back(edit);
    }
}

/// Runtime configuration for sculpting.
///
/// Inserted as a resource by [`VolumeGridPlugin`]. Modify it at any time:
///
/// ```rust,ignore
/// fn my_system(mut config: ResMut<VolumeGridConfig>) {
///     config.max_edits_per_frame = 1; // keep frame times stable during heavy sculpting
/// }
/// ```
#[derive(Resource)]
pub struct VolumeGridConfig {
    /// Maximum number of edits baked per frame, across all volumes.
    ///
    /// Bakes are synchronous; large brushes on a big lattice can stall a frame.
    /// Default: `4`.
    pub max_edits_per_frame: usize,
}

impl Default for VolumeGridConfig {
    fn default() -> Self {
        Self {
            max_edits_per_frame: 4,
        }
    }
}

/// Bevy plugin that bakes queued [`SculptEdit`]s into [`GridVolume`]s.
///
/// ```text
/// SculptQueue::push
///   → apply_sculpt_edits     (VolumeGridSet::Sculpt, up to max_edits_per_frame)
///   → GridVolume changed     (your upload / remesh systems)
/// ```
pub struct VolumeGridPlugin {
    /// Initial value for [`VolumeGridConfig::max_edits_per_frame`].
    pub max_edits_per_frame: usize,
}

impl Default for VolumeGridPlugin {
    fn default() -> Self {
        Self {
            max_edits_per_frame: VolumeGridConfig::default().max_edits_per_frame,
        }
    }
}

impl Plugin for VolumeGridPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(VolumeGridConfig {
            max_edits_per_frame: self.max_edits_per_frame,
        });

        #[cfg(feature = "auto_apply")]
        app.configure_sets(Update, VolumeGridSet::Sculpt).add_systems(
            Update,
            apply_sculpt_edits.in_set(VolumeGridSet::Sculpt),
        );
    }
}

/// Pops and bakes queued edits, at most [`VolumeGridConfig::max_edits_per_frame`] per frame.
///
/// Leftover edits stay queued for the next frame.
pub fn apply_sculpt_edits(
    config: Res<VolumeGridConfig>,
    mut query: Query<(Entity, &mut GridVolume, &mut SculptQueue)>,
) {
    let mut budget = config.max_edits_per_frame;

    for (entity, mut volume, mut queue) in query.iter_mut() {
        if budget == 0 {
            break;
        }
        if queue.is_empty() {
            continue;
        }

        while budget > 0 {
            let Some(edit) = queue.pop_front() else {
                break;
            };
            let written = edit.apply(&mut volume);
            tracing::debug!(?entity, ?edit.operation, written, "applied sculpt edit");
            budget -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::ScalarField, grid::GridConfig};

    fn volume() -> GridSource<DenseLattice> {
        GridSource::new(DenseLattice::new(8, 8, 8, -1.0), GridConfig::default()).unwrap()
    }

    #[test]
    fn add_then_carve() {
        let mut grid = volume();
        let center = Point::new(4.0, 4.0, 4.0);

        SculptEdit::add(center, 2.0).apply(&mut grid);
        assert_eq!(grid.value_at(&center), 2.0);

        SculptEdit::carve(center, 1.0).apply(&mut grid);
        assert_eq!(grid.value_at(&center), -1.0);
        // On the carve brush surface.
        assert_eq!(grid.value_at(&Point::new(3.0, 4.0, 4.0)), 0.0);
    }
}
