//! Which tiles glow, and how they get there.
//!
//! The tile under the pointer is the primary tile. It glows at full intensity, a few of its
//! neighbors glow faintly in the same color, and the spotlight follows it. Every change of
//! look goes through [`Tweens`], so tiles fade in and out instead of snapping.

use bevy::prelude::*;
use bevy::utils::HashMap;
use strum::IntoEnumIterator;

use crate::grid::{TileAppearance, TileCoord, TileGrid};
use crate::picker::PointerHover;
use crate::settings::{HighlightSettings, NeighborTrail};
use crate::tween::{TileProperty, Tweens};

/// Why a tile is in the active highlight set and how bright it should glow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightState {
    pub color: LinearRgba,
    pub is_primary: bool,
    pub intensity: f32,
}

/// Where the tile spotlight should sit and what it should point at, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotlightAim {
    pub position: Vec3,
    pub target: Vec3,
}

/// Outcome of a hover change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HoverTransition {
    /// The pointer is still over the primary tile, or still over nothing.
    #[default]
    Unchanged,
    /// The pointer left the grid and every active tile faded out.
    Cleared { deactivated: Vec<TileCoord> },
    /// A new primary tile lit up.
    Moved {
        primary: TileCoord,
        deactivated: Vec<TileCoord>,
        neighbors: Vec<TileCoord>,
    },
}

/// What the highlighter reads and animates, borrowed for the duration of a hover change.
pub struct HighlightContext<'a> {
    pub grid: &'a TileGrid,
    pub tweens: &'a mut Tweens,
    pub settings: &'a HighlightSettings,
}

/// Owns the active highlight set and the primary tile.
#[derive(Resource, Debug)]
pub struct TileHighlighter {
    active: HashMap<TileCoord, HighlightState>,
    primary: Option<TileCoord>,
    spotlight: Option<SpotlightAim>,
    rng: fastrand::Rng,
    activations: u64,
    deactivations: u64,
}

impl Default for TileHighlighter {
    fn default() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }
}

impl TileHighlighter {
    /// Highlighter with reproducible color and neighbor draws.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        Self {
            active: HashMap::default(),
            primary: None,
            spotlight: None,
            rng,
            activations: 0,
            deactivations: 0,
        }
    }

    pub const fn primary(&self) -> Option<TileCoord> {
        self.primary
    }

    pub fn state(&self, coord: TileCoord) -> Option<&HighlightState> {
        self.active.get(&coord)
    }

    pub fn is_active(&self, coord: TileCoord) -> bool {
        self.active.contains_key(&coord)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn active_tiles(&self) -> impl Iterator<Item = (&TileCoord, &HighlightState)> {
        self.active.iter()
    }

    /// Last aim given to the spotlight, `None` until a tile was first hovered.
    pub const fn spotlight(&self) -> Option<SpotlightAim> {
        self.spotlight
    }

    /// Activations since creation, primary and neighbors alike.
    pub const fn activations(&self) -> u64 {
        self.activations
    }

    pub const fn deactivations(&self) -> u64 {
        self.deactivations
    }

    /// Reacts to the pointer moving onto `hovered`, or off the grid when `None`.
    pub fn on_hover_change(
        &mut self,
        hovered: Option<TileCoord>,
        ctx: &mut HighlightContext<'_>,
    ) -> HoverTransition {
        let layout = *ctx.grid.layout();
        let hovered = hovered.filter(|&coord| layout.contains(coord));

        let Some(hovered) = hovered else {
            self.primary = None;
            let deactivated = self.deactivate_all(ctx);
            if deactivated.is_empty() {
                return HoverTransition::Unchanged;
            }
            return HoverTransition::Cleared { deactivated };
        };

        if self.primary == Some(hovered) {
            return HoverTransition::Unchanged;
        }

        let deactivated = match (ctx.settings.trail, self.primary) {
            (NeighborTrail::Clear, _) => self.deactivate_all(ctx),
            (NeighborTrail::Persist, Some(previous)) => {
                if self.deactivate(previous, ctx) {
                    vec![previous]
                } else {
                    Vec::new()
                }
            }
            (NeighborTrail::Persist, None) => Vec::new(),
        };

        let color = self
            .rng
            .choice(ctx.settings.palette.iter())
            .copied()
            .unwrap_or(Color::WHITE)
            .to_linear();

        self.activate(hovered, color, true, ctx);
        self.primary = Some(hovered);

        let mut offsets = TileCoord::NEIGHBOR_OFFSETS;
        self.rng.shuffle(&mut offsets);
        let mut neighbors = Vec::with_capacity(ctx.settings.neighbor_picks);
        for neighbor in offsets
            .iter()
            .take(ctx.settings.neighbor_picks)
            .filter_map(|&offset| hovered.offset(offset))
            .filter(|&coord| layout.contains(coord))
        {
            if !self.active.contains_key(&neighbor) {
                self.activate(neighbor, color, false, ctx);
                neighbors.push(neighbor);
            }
        }

        tracing::debug!(
            "Primary tile {hovered:?} with {} neighbors, {} faded",
            neighbors.len(),
            deactivated.len()
        );

        HoverTransition::Moved {
            primary: hovered,
            deactivated,
            neighbors,
        }
    }

    fn activate(
        &mut self,
        coord: TileCoord,
        color: LinearRgba,
        is_primary: bool,
        ctx: &mut HighlightContext<'_>,
    ) {
        let grid = ctx.grid;
        let settings = ctx.settings;
        let Some(tile) = grid.tile(coord) else {
            return;
        };

        let intensity = if is_primary {
            settings.primary_intensity
        } else {
            let spread = settings.neighbor_intensity_max - settings.neighbor_intensity_min;
            self.rng.f32().mul_add(spread, settings.neighbor_intensity_min)
        };

        self.active.insert(
            coord,
            HighlightState {
                color,
                is_primary,
                intensity,
            },
        );

        let target = TileAppearance::glowing(color, intensity);
        for property in TileProperty::iter() {
            ctx.tweens.start(
                tile,
                property,
                target.get(property),
                settings.transition,
                settings.easing,
            );
        }

        if is_primary {
            let center = grid.layout().world_position(coord);
            self.spotlight = Some(SpotlightAim {
                position: center + Vec3::Z * settings.spotlight_height,
                target: center - Vec3::Z * settings.spotlight_depth,
            });
        }

        self.activations += 1;
    }

    /// Removes a tile from the active set and fades it back to rest.
    ///
    /// The fade keeps running after the tile left the set.
    fn deactivate(&mut self, coord: TileCoord, ctx: &mut HighlightContext<'_>) -> bool {
        if self.active.remove(&coord).is_none() {
            return false;
        }
        self.deactivations += 1;

        let grid = ctx.grid;
        let settings = ctx.settings;
        let Some(tile) = grid.tile(coord) else {
            return true;
        };
        let target = TileAppearance::resting(tile.default_color());
        for property in TileProperty::iter() {
            ctx.tweens.start(
                tile,
                property,
                target.get(property),
                settings.transition,
                settings.easing,
            );
        }
        true
    }

    fn deactivate_all(&mut self, ctx: &mut HighlightContext<'_>) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.active.keys().copied().collect();
        coords.sort_unstable();
        coords.retain(|&coord| self.deactivate(coord, ctx));
        coords
    }
}

/// Marks the spotlight that follows the primary tile.
#[derive(Component, Debug)]
pub struct TileSpotlight;

pub struct HighlightPlugin;

impl Plugin for HighlightPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HighlightSettings>()
            .init_resource::<HighlightSettings>()
            .init_resource::<TileHighlighter>()
            .init_resource::<Tweens>();
    }
}

/// Feeds every hover event, in order, to the highlighter.
pub fn apply_pointer_hover(
    mut hovers: EventReader<PointerHover>,
    grid: Option<Res<TileGrid>>,
    settings: Res<HighlightSettings>,
    mut highlighter: ResMut<TileHighlighter>,
    mut tweens: ResMut<Tweens>,
) {
    let Some(grid) = grid else {
        hovers.clear();
        return;
    };

    for PointerHover(hovered) in hovers.read() {
        let mut ctx = HighlightContext {
            grid: &*grid,
            tweens: &mut *tweens,
            settings: &*settings,
        };
        let transition = highlighter.on_hover_change(*hovered, &mut ctx);
        if transition != HoverTransition::Unchanged {
            trace!("{transition:?}");
        }
    }
}

/// Moves the spotlight onto the primary tile whenever it changes.
pub fn aim_tile_spotlight(
    highlighter: Res<TileHighlighter>,
    mut spotlights: Query<&mut Transform, With<TileSpotlight>>,
) {
    if !highlighter.is_changed() {
        return;
    }
    let Some(aim) = highlighter.spotlight() else {
        return;
    };

    for mut transform in &mut spotlights {
        *transform = Transform::from_translation(aim.position).looking_at(aim.target, Vec3::Y);
    }
}
