use bevy::prelude::*;

pub mod driver;
pub mod gap_shader;
pub mod grid;
pub mod highlight;
pub mod picker;
pub mod scene;
pub mod settings;
pub mod tween;

use driver::{DriverPlugin, advance_gap_shader_clock, animate_tiles, oscillate_light_and_fog};
use gap_shader::GapOverlayPlugin;
use grid::GridPlugin;
use highlight::{HighlightPlugin, aim_tile_spotlight, apply_pointer_hover};
use picker::{PickerPlugin, pick_hovered_tiles};
use scene::ScenePlugin;
use settings::{GapGlowSettings, GridSettings, HighlightSettings, OscillationSettings};

/// Frame phases: the pointer is resolved before highlights change, which happens before animation.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileGlowSet {
    Input,
    Highlight,
    Animate,
}

/// The whole hover glow effect, configured through its settings.
#[derive(Debug, Clone, Default)]
pub struct TileGlowPlugin {
    pub grid: GridSettings,
    pub highlight: HighlightSettings,
    pub oscillation: OscillationSettings,
    pub gap_glow: GapGlowSettings,
}

impl Plugin for TileGlowPlugin {
    fn build(&self, app: &mut App) {
        // Inserted first, the sub plugins only fill in what is missing
        app.insert_resource(self.grid.clone())
            .insert_resource(self.highlight.clone())
            .insert_resource(self.oscillation.clone())
            .insert_resource(self.gap_glow.clone());

        app.add_plugins((
            GridPlugin,
            PickerPlugin,
            HighlightPlugin,
            DriverPlugin,
            GapOverlayPlugin,
            ScenePlugin,
        ))
        .configure_sets(
            Update,
            (
                TileGlowSet::Input,
                TileGlowSet::Highlight,
                TileGlowSet::Animate,
            )
                .chain(),
        )
        .add_systems(Update, pick_hovered_tiles.in_set(TileGlowSet::Input))
        .add_systems(
            Update,
            (apply_pointer_hover, aim_tile_spotlight)
                .chain()
                .in_set(TileGlowSet::Highlight),
        )
        .add_systems(
            Update,
            (animate_tiles, oscillate_light_and_fog, advance_gap_shader_clock)
                .in_set(TileGlowSet::Animate),
        );
    }
}

pub fn run() {
    glow_helpers::get_default_app(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .add_plugins(TileGlowPlugin::default())
        .run();
}
