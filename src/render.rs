//! Raster rendering of a finished module matrix.
//!
//! Every module becomes a solid square of `module_size_px` pixels, dark
//! modules in the foreground color and everything else (light modules and
//! the quiet zone) in the background color. No anti-aliasing or
//! interpolation: decoders rely on hard module boundaries.

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::matrix::ModuleMatrix;

/// Rendering parameters: pixel scale, quiet zone width, and colors.
///
/// `foreground == background` is a degenerate but accepted configuration;
/// producing an unscannable image is the caller's choice, not an engine
/// error.
#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Side length in pixels of one module.
    pub module_size_px: u32,
    /// Width of the blank border, in modules. The standard requires 4.
    pub quiet_zone_modules: u32,
    /// Color of dark modules.
    pub foreground: Rgba<u8>,
    /// Color of light modules and the quiet zone.
    pub background: Rgba<u8>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            module_size_px: 8,
            quiet_zone_modules: 4,
            foreground: Rgba([0, 0, 0, 255]),
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

impl RenderConfig {
    /// Output image side length in pixels for a grid of `grid_side` modules.
    pub fn raster_side_px(&self, grid_side: usize) -> u32 {
        (grid_side as u32 + 2 * self.quiet_zone_modules) * self.module_size_px
    }
}

/// Rasterizes the matrix into a freshly allocated RGBA buffer owned by the
/// caller.
pub(crate) fn render(matrix: &ModuleMatrix, config: &RenderConfig) -> RgbaImage {
    let scale = config.module_size_px.max(1);
    let side = config.raster_side_px(matrix.side()).max(scale);
    let mut img = ImageBuffer::new(side, side);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / scale) as i32 - config.quiet_zone_modules as i32;
        let qr_y = (y / scale) as i32 - config.quiet_zone_modules as i32;
        *pixel = if matrix.is_dark(qr_x, qr_y) {
            config.foreground
        } else {
            config.background
        };
    }
    img
}

/// Renders the matrix as text, two characters per module, with a border of
/// `border` quiet modules. Useful for terminal previews and debugging.
pub fn to_console_string(matrix: &ModuleMatrix, border: i32) -> String {
    assert!(border >= 0, "Border must be non-negative");
    let side = matrix.side() as i32;
    let mut result = String::new();
    for y in -border..side + border {
        for x in -border..side + border {
            let c = if matrix.is_dark(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}
