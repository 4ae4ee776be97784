#[cfg(target_arch = "wasm32")]
use bevy::prelude::*;
#[cfg(target_arch = "wasm32")]
use bevy::window::PrimaryWindow;

// Surfaces larger than this fail to configure on most WebGL2 devices:
// "`Surface` width and height must be within the maximum supported texture size."
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_EXTENT: f32 = 2048.0;

#[cfg(target_arch = "wasm32")]
fn browser_inner_size() -> Option<Vec2> {
    let browser = web_sys::window()?;
    let width = browser.inner_width().ok()?.as_f64()?;
    let height = browser.inner_height().ok()?.as_f64()?;
    Some(Vec2::new(width as f32, height as f32))
}

/// Keeps the primary window the size of the browser viewport.
#[cfg(target_arch = "wasm32")]
pub fn fit_window_to_browser(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Some(target) = browser_inner_size() else {
        return;
    };
    // A collapsed browser viewport would hand a zero extent to the surface
    if target.x <= 0.0 || target.y <= 0.0 {
        return;
    }
    let target = target.min(Vec2::splat(MAX_SURFACE_EXTENT));

    for mut window in &mut windows {
        let current = Vec2::new(window.resolution.width(), window.resolution.height());
        if (current - target).abs().max_element() > f32::EPSILON {
            window.resolution.set(target.x, target.y);
        }
    }
}
