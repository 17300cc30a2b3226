pub mod render;

pub use render::{Scene, SkiaRenderer, placeholder_background, render_text_pixmap};
