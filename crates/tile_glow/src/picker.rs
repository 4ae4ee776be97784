use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};
use glow_helpers::viewport::ViewportSize;

use crate::grid::{GridLayout, GridRoot, TileCoord, TileGrid};

/// The tile under the pointer after a pointer move, `None` when it is over nothing.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerHover(pub Option<TileCoord>);

/// World space ray leaving the camera through a point in normalized device coordinates.
pub fn camera_ray(camera: &Camera, camera_transform: &GlobalTransform, ndc: Vec2) -> Option<Ray3d> {
    ray_through_ndc(camera.clip_from_view(), camera_transform, ndc)
}

/// Same as [`camera_ray`], for a bare projection matrix.
pub fn ray_through_ndc(
    clip_from_view: Mat4,
    camera_transform: &GlobalTransform,
    ndc: Vec2,
) -> Option<Ray3d> {
    let world_from_ndc = camera_transform.compute_matrix() * clip_from_view.inverse();
    // Bevy uses reverse z, the near plane sits at 1
    let near = world_from_ndc.project_point3(ndc.extend(1.0));
    let far = world_from_ndc.project_point3(ndc.extend(f32::EPSILON));
    if near.is_nan() || far.is_nan() {
        return None;
    }
    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d {
        origin: near,
        direction,
    })
}

/// Nearest tile hit by a world space ray, if any.
///
/// The ray is moved into grid local space, where every tile lies in the z = 0 plane.
pub fn pick_tile(
    layout: &GridLayout,
    grid_transform: &GlobalTransform,
    ray: Ray3d,
) -> Option<TileCoord> {
    let to_local = grid_transform.affine().inverse();
    let origin = to_local.transform_point3(ray.origin);
    let direction = to_local.transform_vector3(*ray.direction);

    if direction.z.abs() <= f32::EPSILON {
        return None;
    }
    let distance = -origin.z / direction.z;
    if distance < 0.0 {
        return None;
    }

    layout.tile_at((origin + direction * distance).truncate())
}

pub struct PickerPlugin;

impl Plugin for PickerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PointerHover>();
    }
}

/// Resolves the hovered tile for every pointer move of the frame, in order.
pub fn pick_hovered_tiles(
    mut moved: EventReader<CursorMoved>,
    mut left: EventReader<CursorLeft>,
    viewport: Res<ViewportSize>,
    grid: Option<Res<TileGrid>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    grid_roots: Query<&GlobalTransform, With<GridRoot>>,
    mut hovers: EventWriter<PointerHover>,
) {
    if moved.is_empty() && left.is_empty() {
        return;
    }

    let Some(grid) = grid else {
        moved.clear();
        left.clear();
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        warn!("Expected exactly one 3d camera to pick tiles with");
        moved.clear();
        left.clear();
        return;
    };
    let Ok(grid_transform) = grid_roots.get_single() else {
        error!("Tile grid has no root entity");
        moved.clear();
        left.clear();
        return;
    };

    for event in moved.read() {
        let ndc = viewport.to_ndc(event.position);
        let hovered = camera_ray(camera, camera_transform, ndc)
            .and_then(|ray| pick_tile(grid.layout(), grid_transform, ray));
        hovers.send(PointerHover(hovered));
    }

    if left.read().count() > 0 {
        hovers.send(PointerHover(None));
    }
}
