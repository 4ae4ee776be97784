use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use thiserror::Error;

use crate::{WINDOW_HEIGHT, WINDOW_WIDTH};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ViewportError {
    #[error("Viewport has a degenerate size {width}x{height}")]
    Degenerate { width: f32, height: f32 },
}

/// Logical size of the primary window.
///
/// Always strictly positive, so aspect ratios and pointer normalization never divide by zero.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize(Vec2);

impl Default for ViewportSize {
    fn default() -> Self {
        Self(Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT))
    }
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Result<Self, ViewportError> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self(Vec2::new(width, height)))
        } else {
            Err(ViewportError::Degenerate { width, height })
        }
    }

    pub const fn size(self) -> Vec2 {
        self.0
    }

    pub fn aspect_ratio(self) -> f32 {
        self.0.x / self.0.y
    }

    /// Maps a position in window pixels to normalized device coordinates.
    ///
    /// The result spans [-1, 1] on both axes with y pointing up, the way cameras expect it.
    pub fn to_ndc(self, position: Vec2) -> Vec2 {
        Vec2::new(
            (position.x / self.0.x).mul_add(2.0, -1.0),
            (-(position.y / self.0.y)).mul_add(2.0, 1.0),
        )
    }
}

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportSize>()
            .add_systems(Startup, read_initial_viewport)
            .add_systems(PreUpdate, track_viewport_resize);
    }
}

fn read_initial_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportSize>,
) {
    let Ok(window) = windows.get_single() else {
        warn!("No primary window, keeping default viewport {:?}", viewport.size());
        return;
    };

    match ViewportSize::new(window.width(), window.height()) {
        Ok(size) => *viewport = size,
        Err(err) => warn!("{err}, keeping default viewport {:?}", viewport.size()),
    }
}

// Bevy keeps the camera projection in sync with the window on its own,
// this only mirrors the size for pointer normalization.
fn track_viewport_resize(
    mut resized: EventReader<WindowResized>,
    mut viewport: ResMut<ViewportSize>,
) {
    for event in resized.read() {
        match ViewportSize::new(event.width, event.height) {
            Ok(size) => {
                info!(
                    "Viewport resized to {}x{} (aspect {:.3})",
                    event.width,
                    event.height,
                    size.aspect_ratio()
                );
                *viewport = size;
            }
            Err(err) => warn!("{err}, ignoring resize"),
        }
    }
}
