use core::f32::consts::FRAC_PI_2;

use bevy::pbr::light_consts;
use bevy::prelude::*;

use crate::highlight::TileSpotlight;

const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 3.0, 15.0);
const FIELD_OF_VIEW_DEGREES: f32 = 75.0;

const FOG_START: f32 = 10.0;
const FOG_END: f32 = 25.0;

/// Dim fill, about a third of the key light.
const AMBIENT_BRIGHTNESS: f32 = 300.0;
const SUN_POSITION: Vec3 = Vec3::new(5.0, 10.0, 10.0);

const SPOTLIGHT_RANGE: f32 = 30.0;
const SPOTLIGHT_PENUMBRA: f32 = 0.5;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: AMBIENT_BRIGHTNESS,
        })
        .add_systems(Startup, spawn_scene);
    }
}

/// Inner cone angle giving a soft edge over `penumbra` of the outer cone.
pub fn spot_inner_angle(outer_angle: f32, penumbra: f32) -> f32 {
    outer_angle * (1.0 - penumbra.clamp(0.0, 1.0))
}

pub fn spawn_scene(mut commands: Commands) {
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FIELD_OF_VIEW_DEGREES.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        Transform::from_translation(CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::BLACK,
            falloff: FogFalloff::Linear {
                start: FOG_START,
                end: FOG_END,
            },
            ..default()
        },
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Dark until a tile is hovered, then aimed and driven by the oscillation
    commands.spawn((
        Name::new("TileSpotlight"),
        TileSpotlight,
        SpotLight {
            color: Color::WHITE,
            intensity: 0.0,
            range: SPOTLIGHT_RANGE,
            outer_angle: FRAC_PI_2,
            inner_angle: spot_inner_angle(FRAC_PI_2, SPOTLIGHT_PENUMBRA),
            ..default()
        },
        Transform::default(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penumbra_softens_half_of_the_cone() {
        assert!(
            (spot_inner_angle(FRAC_PI_2, 0.5) - FRAC_PI_2 / 2.0).abs() < f32::EPSILON,
            "half penumbra halves the inner cone"
        );
        assert!(
            (spot_inner_angle(1.0, 0.0) - 1.0).abs() < f32::EPSILON,
            "no penumbra is a hard edge"
        );
        assert!(spot_inner_angle(1.0, 3.0).abs() < f32::EPSILON, "penumbra is clamped");
    }

    #[test]
    fn scene_spawns_one_camera_and_a_dark_spotlight() {
        let mut app = App::new();
        app.add_systems(Startup, spawn_scene);
        app.update();

        let world = app.world_mut();
        let cameras = world.query::<&Camera3d>().iter(world).count();
        assert_eq!(cameras, 1, "single camera");

        let (spotlight, _) = world
            .query::<(&SpotLight, &TileSpotlight)>()
            .single(world);
        assert!(spotlight.intensity.abs() < f32::EPSILON, "starts dark");
        assert!(
            (spotlight.range - SPOTLIGHT_RANGE).abs() < f32::EPSILON,
            "configured range"
        );

        let fog = world.query::<&DistanceFog>().single(world);
        assert!(
            matches!(fog.falloff, FogFalloff::Linear { start, end } if (start - FOG_START).abs() < f32::EPSILON && (end - FOG_END).abs() < f32::EPSILON),
            "linear fog from 10 to 25"
        );
    }
}
