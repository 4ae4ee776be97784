//! Per frame animation: tile tweens, the throttled light and fog swing, and the shader clock.

use core::time::Duration;

use bevy::prelude::*;

use crate::gap_shader::GapGlowMaterial;
use crate::grid::TileGrid;
use crate::highlight::{TileHighlighter, TileSpotlight};
use crate::settings::OscillationSettings;
use crate::tween::Tweens;

/// One evaluation of the light and fog oscillators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillationSample {
    pub light_intensity: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl OscillationSettings {
    pub fn sample(&self, seconds: f32) -> OscillationSample {
        OscillationSample {
            light_intensity: self.light.sample(seconds),
            fog_near: self.fog_near.sample(seconds),
            fog_far: self.fog_far.sample(seconds),
        }
    }

    /// Shader clock value after `elapsed` time since startup.
    pub fn shader_time(&self, elapsed: Duration) -> f32 {
        (elapsed.as_secs_f64() * 1000.0 * f64::from(self.shader_time_scale)) as f32
    }
}

/// Throttles the oscillation bundle, independently of the frame rate.
#[derive(Resource, Debug, Default)]
pub struct OscillationClock {
    last_update: Option<Duration>,
}

impl OscillationClock {
    /// `true` when at least `interval` passed since the last accepted tick, which `now` becomes.
    pub fn try_tick(&mut self, now: Duration, interval: Duration) -> bool {
        let due = self
            .last_update
            .is_none_or(|last| now.saturating_sub(last) >= interval);
        if due {
            self.last_update = Some(now);
        }
        due
    }
}

pub struct DriverPlugin;

impl Plugin for DriverPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<OscillationSettings>()
            .init_resource::<OscillationSettings>()
            .init_resource::<OscillationClock>();
    }
}

/// Advances every tween by the frame time and pushes the new looks into the tile materials.
pub fn animate_tiles(
    time: Res<Time>,
    grid: Option<ResMut<TileGrid>>,
    mut tweens: ResMut<Tweens>,
    tiles: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(mut grid) = grid else {
        return;
    };
    if tweens.is_empty() {
        return;
    }

    for coord in tweens.advance_all(time.delta(), &mut grid) {
        let (Some(tile), Some(entity)) = (grid.tile(coord), grid.entity(coord)) else {
            continue;
        };
        let Ok(material) = tiles.get(entity) else {
            warn!("Tile {coord:?} lost its material");
            continue;
        };
        let Some(material) = materials.get_mut(material.0.id()) else {
            continue;
        };

        let appearance = tile.appearance();
        material.base_color = appearance.color.into();
        material.emissive = appearance.emissive_output();
    }
}

/// Swings the spotlight and the fog while a tile is hovered, at most `updates_per_second` times.
pub fn oscillate_light_and_fog(
    time: Res<Time>,
    settings: Res<OscillationSettings>,
    highlighter: Res<TileHighlighter>,
    mut clock: ResMut<OscillationClock>,
    mut spotlights: Query<&mut SpotLight, With<TileSpotlight>>,
    mut fogs: Query<&mut DistanceFog>,
) {
    if highlighter.primary().is_none() {
        return;
    }
    if !clock.try_tick(time.elapsed(), settings.interval()) {
        return;
    }

    let sample = settings.sample(time.elapsed_secs());
    for mut spotlight in &mut spotlights {
        spotlight.intensity = sample.light_intensity * settings.lumens_per_unit;
    }
    for mut fog in &mut fogs {
        fog.falloff = FogFalloff::Linear {
            start: sample.fog_near,
            end: sample.fog_far,
        };
    }
}

/// Feeds the continuous clock to the gap overlay, every frame.
pub fn advance_gap_shader_clock(
    time: Res<Time>,
    settings: Res<OscillationSettings>,
    overlays: Query<&MeshMaterial3d<GapGlowMaterial>>,
    mut materials: ResMut<Assets<GapGlowMaterial>>,
) {
    let shader_time = settings.shader_time(time.elapsed());
    for overlay in &overlays {
        if let Some(material) = materials.get_mut(overlay.0.id()) {
            material.set_time(shader_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{TileAppearance, TileCoord, spawn_grid};
    use crate::settings::GridSettings;
    use crate::tween::{Easing, TileProperty};

    const INTERVAL: Duration = Duration::from_nanos(33_333_333);

    #[test]
    fn oscillation_at_zero() {
        let sample = OscillationSettings::default().sample(0.0);

        assert_eq!(
            sample,
            OscillationSample {
                light_intensity: 15.0,
                fog_near: 15.0,
                fog_far: 30.0,
            },
            "sin(0) leaves every base untouched"
        );
    }

    #[test]
    fn oscillation_stays_within_amplitude() {
        let settings = OscillationSettings::default();

        for step in 0..200 {
            let sample = settings.sample(step as f32 * 0.137);
            assert!(
                (12.0..=18.0).contains(&sample.light_intensity),
                "light {}",
                sample.light_intensity
            );
            assert!((13.0..=17.0).contains(&sample.fog_near), "near {}", sample.fog_near);
            assert!((28.0..=32.0).contains(&sample.fog_far), "far {}", sample.fog_far);
        }
    }

    #[test]
    fn clock_accepts_first_tick_then_throttles() {
        let mut clock = OscillationClock::default();
        let start = Duration::from_millis(1000);

        assert!(clock.try_tick(start, INTERVAL), "first tick always runs");
        assert!(
            !clock.try_tick(start + Duration::from_millis(16), INTERVAL),
            "one 60 fps frame later is too soon"
        );
        assert!(
            !clock.try_tick(start + Duration::from_millis(33), INTERVAL),
            "just under the interval"
        );
        assert!(
            clock.try_tick(start + Duration::from_millis(34), INTERVAL),
            "interval elapsed"
        );
        assert!(
            !clock.try_tick(start + Duration::from_millis(50), INTERVAL),
            "measured from the last accepted tick"
        );
    }

    #[test]
    fn clock_updates_about_thirty_times_per_second_at_sixty_fps() {
        let mut clock = OscillationClock::default();
        let frame = Duration::from_nanos(16_666_667);
        let interval = OscillationSettings::default().interval();

        let updates = (0..60)
            .filter(|&index| clock.try_tick(frame * index, interval))
            .count();

        assert_eq!(updates, 30, "every other frame");
    }

    #[test]
    fn shader_clock_runs_at_half_a_unit_per_second() {
        let settings = OscillationSettings::default();

        assert!(
            settings.shader_time(Duration::ZERO).abs() < f32::EPSILON,
            "starts at zero"
        );
        assert!(
            (settings.shader_time(Duration::from_secs(4)) - 2.0).abs() < 1e-5,
            "4000 ms * 0.0005"
        );
    }

    #[test]
    fn finished_tweens_reach_the_tile_material() {
        let mut app = App::new();
        app.insert_resource(GridSettings {
            size: 3,
            ..default()
        })
        .init_resource::<Time>()
        .init_resource::<Tweens>()
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .add_systems(Startup, spawn_grid)
        .add_systems(Update, animate_tiles);
        app.update();

        let coord = TileCoord::new(1, 2);
        let world = app.world_mut();
        let tile = world
            .resource::<TileGrid>()
            .tile(coord)
            .expect("tile exists")
            .clone();
        let target = TileAppearance::glowing(LinearRgba::rgb(0.8, 0.4, 0.2), 2.0);
        {
            let mut tweens = world.resource_mut::<Tweens>();
            for property in [
                TileProperty::Color,
                TileProperty::Emissive,
                TileProperty::EmissiveIntensity,
            ] {
                tweens.start(
                    &tile,
                    property,
                    target.get(property),
                    Duration::from_millis(500),
                    Easing::Linear,
                );
            }
        }
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(600));

        app.update();

        let world = app.world();
        let entity = world
            .resource::<TileGrid>()
            .entity(coord)
            .expect("tile has an entity");
        let handle = world
            .get::<MeshMaterial3d<StandardMaterial>>(entity)
            .expect("tile has a material");
        let material = world
            .resource::<Assets<StandardMaterial>>()
            .get(handle.0.id())
            .expect("material asset exists");

        assert_eq!(
            material.base_color.to_linear(),
            LinearRgba::rgb(0.8, 0.4, 0.2),
            "base color reached the target"
        );
        assert_eq!(
            material.emissive,
            LinearRgba::rgb(1.6, 0.8, 0.4),
            "emissive is the color scaled by the intensity"
        );
        assert!(world.resource::<Tweens>().is_empty(), "tweens retired");

        let untouched = world
            .resource::<TileGrid>()
            .entity(TileCoord::new(0, 0))
            .and_then(|entity| world.get::<MeshMaterial3d<StandardMaterial>>(entity))
            .and_then(|handle| {
                world
                    .resource::<Assets<StandardMaterial>>()
                    .get(handle.0.id())
            })
            .expect("other tile has a material");
        assert_eq!(
            untouched.emissive,
            LinearRgba::BLACK,
            "other tiles keep their own material"
        );
    }
}
