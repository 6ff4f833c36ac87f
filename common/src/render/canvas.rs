#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_hex(0xffffff);

    /// `0xRRGGBB`, fully opaque.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
            a: 0xff,
        }
    }
}

/// Minimal 2D drawing surface in pixel coordinates, origin at the top-left.
pub trait Canvas {
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
    fn fill_circle(&mut self, center_x: f32, center_y: f32, radius: f32, color: Rgba);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba);
}
