use core::f32::consts::PI;
use core::time::Duration;

use bevy::prelude::*;
use strum::Display;

use crate::tween::Easing;

/// Shape and resting look of the tile lattice.
#[derive(Reflect, Resource, Debug, Clone)]
#[reflect(Resource)]
pub struct GridSettings {
    /// Tiles per side, the grid holds `size * size` tiles
    pub size: u32,
    pub tile_size: f32,
    pub gap: f32,
    /// Rotation around X, applied before `tilt_z`
    pub tilt_x: f32,
    pub tilt_z: f32,
    pub default_color: Color,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 100,
            tile_size: 2.0,
            gap: 0.07,
            tilt_x: -PI / 4.0,
            tilt_z: PI / 6.0,
            default_color: Color::srgb_u8(0x22, 0x22, 0x22),
        }
    }
}

/// What happens to the glowing neighbors of the previous primary tile when the pointer moves on.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum NeighborTrail {
    /// They keep glowing until the pointer leaves the grid, leaving a trail behind the cursor.
    #[default]
    Persist,
    /// They fade out together with the previous primary tile.
    Clear,
}

#[derive(Reflect, Resource, Debug, Clone)]
#[reflect(Resource)]
pub struct HighlightSettings {
    /// One color is drawn per hovered tile and shared with its neighbors
    pub palette: Vec<Color>,
    pub primary_intensity: f32,
    /// Neighbor intensity is drawn uniformly from `[min, max)`
    pub neighbor_intensity_min: f32,
    pub neighbor_intensity_max: f32,
    /// How many of the 8 surrounding positions are drawn, before dropping the out of grid ones
    pub neighbor_picks: usize,
    pub transition: Duration,
    pub easing: Easing,
    pub trail: NeighborTrail,
    /// World z offset of the spotlight above the primary tile.
    pub spotlight_height: f32,
    /// World z offset below the primary tile that the spotlight aims at.
    pub spotlight_depth: f32,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            palette: vec![
                Color::srgb_u8(0xff, 0x55, 0x55),
                Color::srgb_u8(0x55, 0xaa, 0xff),
                Color::srgb_u8(0x55, 0xff, 0x77),
                Color::srgb_u8(0xff, 0xcc, 0x55),
            ],
            primary_intensity: 2.0,
            neighbor_intensity_min: 0.2,
            neighbor_intensity_max: 0.5,
            neighbor_picks: 4,
            transition: Duration::from_millis(500),
            easing: Easing::Linear,
            trail: NeighborTrail::Persist,
            spotlight_height: 5.0,
            spotlight_depth: 2.0,
        }
    }
}

/// A value swinging around `base` as `base + amplitude * sin(frequency * t)`.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub base: f32,
    pub amplitude: f32,
    /// Radians per second
    pub frequency: f32,
}

impl Oscillator {
    pub const fn new(base: f32, amplitude: f32, frequency: f32) -> Self {
        Self {
            base,
            amplitude,
            frequency,
        }
    }

    pub fn sample(&self, seconds: f32) -> f32 {
        self.amplitude
            .mul_add((seconds * self.frequency).sin(), self.base)
    }
}

#[derive(Reflect, Resource, Debug, Clone)]
#[reflect(Resource)]
pub struct OscillationSettings {
    /// Light and fog are only recomputed this many times per second
    pub updates_per_second: f32,
    pub light: Oscillator,
    pub fog_near: Oscillator,
    pub fog_far: Oscillator,
    /// Converts the light oscillator into spotlight lumens
    pub lumens_per_unit: f32,
    /// Shader clock advance per elapsed millisecond
    pub shader_time_scale: f32,
}

impl Default for OscillationSettings {
    fn default() -> Self {
        Self {
            updates_per_second: 30.0,
            light: Oscillator::new(15.0, 3.0, 4.0),
            fog_near: Oscillator::new(15.0, 2.0, 1.0),
            fog_far: Oscillator::new(30.0, 2.0, 0.5),
            lumens_per_unit: 50_000.0,
            shader_time_scale: 0.0005,
        }
    }
}

impl OscillationSettings {
    pub fn interval(&self) -> Duration {
        // f32 seconds round a thirtieth up past two 60 fps frames
        Duration::from_secs_f64(1.0 / f64::from(self.updates_per_second.max(f32::EPSILON)))
    }
}

#[derive(Reflect, Resource, Debug, Clone)]
#[reflect(Resource)]
pub struct GapGlowSettings {
    pub color: Color,
    pub intensity: f32,
    /// Grid lines per side of the overlay
    pub line_density: f32,
    /// World z of the overlay, slightly behind the tiles
    pub depth: f32,
}

impl Default for GapGlowSettings {
    fn default() -> Self {
        Self {
            color: Color::srgb_u8(0x00, 0xcc, 0xff),
            intensity: 0.9,
            line_density: 50.0,
            depth: -0.1,
        }
    }
}
