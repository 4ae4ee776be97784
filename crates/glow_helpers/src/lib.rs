mod app;
pub use app::*;

pub mod viewport;

mod window_resizing;
