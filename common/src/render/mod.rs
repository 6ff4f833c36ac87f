mod canvas;
mod renderer;

pub use canvas::{Canvas, Rgba};
pub use renderer::{Palette, Renderer};
