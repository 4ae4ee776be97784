use core::time::Duration;

use bevy::prelude::*;
use strum::{Display, EnumIter};

use crate::grid::{Tile, TileCoord, TileGrid};

/// Animatable properties of a tile material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TileProperty {
    Color,
    Emissive,
    EmissiveIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    Color(LinearRgba),
    Scalar(f32),
}

impl TweenValue {
    /// Interpolates towards `end`. Mismatched kinds jump straight to `end`.
    pub fn lerp(self, end: Self, t: f32) -> Self {
        match (self, end) {
            (Self::Color(from), Self::Color(to)) => Self::Color(LinearRgba::new(
                (to.red - from.red).mul_add(t, from.red),
                (to.green - from.green).mul_add(t, from.green),
                (to.blue - from.blue).mul_add(t, from.blue),
                (to.alpha - from.alpha).mul_add(t, from.alpha),
            )),
            (Self::Scalar(from), Self::Scalar(to)) => Self::Scalar((to - from).mul_add(t, from)),
            (_, end) => end,
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Easing {
    #[default]
    Linear,
    /// Fast start, gentle landing
    CubicOut,
}

impl Easing {
    pub fn apply(self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicOut => {
                let remaining = 1.0 - t;
                (-remaining * remaining).mul_add(remaining, 1.0)
            }
        }
    }
}

/// Identifies a running tween, for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(u64);

#[derive(Debug, Clone)]
struct Tween {
    handle: TweenHandle,
    tile: TileCoord,
    property: TileProperty,
    from: TweenValue,
    to: TweenValue,
    easing: Easing,
    timer: Timer,
}

/// Every running tile tween.
///
/// A tile property is driven by at most one tween: starting a new one replaces the old one,
/// which picks up from wherever the property currently is.
#[derive(Resource, Debug, Default)]
pub struct Tweens {
    running: Vec<Tween>,
    next_handle: u64,
}

impl Tweens {
    /// Starts animating `property` of `tile` from its current value to `to`.
    pub fn start(
        &mut self,
        tile: &Tile,
        property: TileProperty,
        to: TweenValue,
        duration: Duration,
        easing: Easing,
    ) -> TweenHandle {
        let coord = tile.coord();
        if let Some(replaced) = self.cancel_property(coord, property) {
            tracing::trace!("{replaced:?} on {coord:?} {property} replaced");
        }

        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        self.running.push(Tween {
            handle,
            tile: coord,
            property,
            from: tile.appearance().get(property),
            to,
            easing,
            timer: Timer::new(duration, TimerMode::Once),
        });
        handle
    }

    /// Stops a tween where it is, `false` if it already finished or was cancelled.
    pub fn cancel(&mut self, handle: TweenHandle) -> bool {
        let before = self.running.len();
        self.running.retain(|tween| tween.handle != handle);
        self.running.len() != before
    }

    /// Stops whatever tween drives this tile property.
    pub fn cancel_property(&mut self, tile: TileCoord, property: TileProperty) -> Option<TweenHandle> {
        let position = self
            .running
            .iter()
            .position(|tween| tween.tile == tile && tween.property == property)?;
        Some(self.running.remove(position).handle)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Moves every tween forward and writes the new values into the grid.
    ///
    /// Finished tweens land exactly on their end value and are dropped.
    /// Returns the tiles whose appearance changed, each once.
    pub fn advance_all(&mut self, delta: Duration, grid: &mut TileGrid) -> Vec<TileCoord> {
        let mut touched = Vec::with_capacity(self.running.len());

        self.running.retain_mut(|tween| {
            let Some(tile) = grid.tile_mut(tween.tile) else {
                return false;
            };

            tween.timer.tick(delta);
            let value = if tween.timer.finished() {
                tween.to
            } else {
                let progress = tween.easing.apply(tween.timer.fraction());
                tween.from.lerp(tween.to, progress)
            };
            tile.appearance_mut().set(tween.property, value);
            touched.push(tween.tile);

            !tween.timer.finished()
        });

        touched.sort_unstable();
        touched.dedup();
        touched
    }
}
