//! Safe logo overlay compositing.
//!
//! The overlay budget comes from the error correction level: a level-H
//! symbol survives roughly 30% of its modules being damaged, so a centered
//! square covering at most that many modules can be painted over and the
//! symbol still decodes. The square is additionally kept strictly past the
//! corner regions, the timing lines, and the format info strips, and the
//! caller's logo is scaled down (never rejected) if it exceeds the budget.
//!
//! Compositing happens purely on raster pixels; the module matrix is never
//! touched, and neither is the caller's logo buffer.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::render::RenderConfig;
use crate::types::{EcLevel, Version};

/// A caller-supplied logo image and its requested on-raster size.
///
/// The compositor only reads the image; the caller keeps ownership and the
/// buffer comes back unmodified.
#[derive(Clone, Debug)]
pub struct LogoOverlay {
    /// Decoded logo pixels with alpha. Decoding a file into this buffer is
    /// the caller's job.
    pub image: RgbaImage,
    /// Desired side length in pixels. Clipped to the safe bound.
    pub requested_size_px: u32,
}

/// Side length in modules of the largest centered square that stays within
/// the repair budget of `level` and clear of every fixed pattern.
pub fn safe_logo_side_modules(version: Version, level: EcLevel) -> u32 {
    let side = version.side() as u32;
    let total = side * side;
    let budget = total * level.repair_percent() / 100;
    let mut safe = (budget as f64).sqrt() as u32;
    // The centered square must start past row/column 8 on every side, so
    // it stays clear of the finders, separators, timing lines, the format
    // info strips, and the dark module.
    safe = safe.min(side.saturating_sub(18));
    // Odd side so the square centers exactly on the odd-sided grid.
    if safe > 0 && safe % 2 == 0 {
        safe -= 1;
    }
    safe
}

/// Alpha-composites the logo onto a copy of the rendered raster, centered,
/// scaled down to the safe bound if necessary. Returns a new buffer; both
/// inputs are left untouched.
pub(crate) fn composite(
    raster: &RgbaImage,
    version: Version,
    level: EcLevel,
    config: &RenderConfig,
    logo: &LogoOverlay,
) -> RgbaImage {
    let mut out = raster.clone();
    let safe_px = safe_logo_side_modules(version, level) * config.module_size_px;
    let target = logo.requested_size_px.min(safe_px).min(out.width());
    if target == 0 || logo.image.width() == 0 || logo.image.height() == 0 {
        return out;
    }
    if logo.requested_size_px > safe_px {
        log::debug!(
            "logo request {}px clipped to safe bound {}px at {:?}",
            logo.requested_size_px,
            safe_px,
            level
        );
    }
    let scaled;
    let logo_pixels = if logo.image.dimensions() == (target, target) {
        &logo.image
    } else {
        scaled = imageops::resize(&logo.image, target, target, FilterType::Triangle);
        &scaled
    };
    let corner = i64::from((out.width() - target) / 2);
    imageops::overlay(&mut out, logo_pixels, corner, corner);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_logo(side: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(side, side, color)
    }

    #[test]
    fn safe_bound_grows_with_level() {
        let v = Version::new(10);
        let l = safe_logo_side_modules(v, EcLevel::L);
        let m = safe_logo_side_modules(v, EcLevel::M);
        let q = safe_logo_side_modules(v, EcLevel::Q);
        let h = safe_logo_side_modules(v, EcLevel::H);
        assert!(l < m && m < q && q < h);
    }

    #[test]
    fn safe_square_covers_only_data_and_alignment_modules() {
        use crate::matrix::{ModuleMatrix, Role};
        for ver in [1u8, 2, 3, 4, 7, 20, 40] {
            let version = Version::new(ver);
            let matrix = ModuleMatrix::with_function_patterns(version);
            for &level in &[EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H] {
                let safe = safe_logo_side_modules(version, level) as usize;
                assert!(safe == 0 || safe % 2 == 1);
                let start = (version.side() - safe) / 2;
                for y in start..start + safe {
                    for x in start..start + safe {
                        let role = matrix.role_at(x as i32, y as i32);
                        assert!(
                            matches!(role, Role::Data | Role::Alignment),
                            "v{ver} {level:?}: safe square covers {role:?} at ({x},{y})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn version_1_budgets_are_capped_by_geometry() {
        // 7% of 441 modules budgets a 5-module square and 30% an 11-module
        // one, but a 21-module grid only has a 3-module square clear of the
        // format info strips at row/column 8.
        assert_eq!(safe_logo_side_modules(Version::new(1), EcLevel::L), 3);
        assert_eq!(safe_logo_side_modules(Version::new(1), EcLevel::H), 3);
    }

    #[test]
    fn oversized_logo_is_clipped_not_rejected() {
        let version = Version::new(2);
        let config = RenderConfig::default();
        let raster = RgbaImage::from_pixel(
            config.raster_side_px(version.side()),
            config.raster_side_px(version.side()),
            Rgba([255, 255, 255, 255]),
        );
        let logo = LogoOverlay {
            image: solid_logo(500, Rgba([255, 0, 0, 255])),
            requested_size_px: 10_000,
        };
        let out = composite(&raster, version, EcLevel::H, &config, &logo);
        let safe_px = safe_logo_side_modules(version, EcLevel::H) * config.module_size_px;
        let center = out.width() / 2;
        let half = safe_px / 2;
        // Inside the safe square: logo pixels.
        assert_eq!(*out.get_pixel(center, center), Rgba([255, 0, 0, 255]));
        // Just outside the safe square: untouched raster.
        assert_eq!(
            *out.get_pixel(center - half - 1, center),
            Rgba([255, 255, 255, 255])
        );
    }

    #[test]
    fn transparent_logo_pixels_leave_raster_visible() {
        let version = Version::new(3);
        let config = RenderConfig::default();
        let side_px = config.raster_side_px(version.side());
        let raster = RgbaImage::from_pixel(side_px, side_px, Rgba([0, 0, 255, 255]));
        let logo = LogoOverlay {
            image: solid_logo(16, Rgba([255, 0, 0, 0])),
            requested_size_px: 16,
        };
        let out = composite(&raster, version, EcLevel::Q, &config, &logo);
        let center = out.width() / 2;
        assert_eq!(*out.get_pixel(center, center), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn compositing_never_mutates_inputs() {
        let version = Version::new(2);
        let config = RenderConfig::default();
        let side_px = config.raster_side_px(version.side());
        let raster = RgbaImage::from_pixel(side_px, side_px, Rgba([255, 255, 255, 255]));
        let logo = LogoOverlay {
            image: solid_logo(32, Rgba([0, 255, 0, 255])),
            requested_size_px: 32,
        };
        let raster_before = raster.clone();
        let logo_before = logo.image.clone();
        let _ = composite(&raster, version, EcLevel::M, &config, &logo);
        assert_eq!(raster, raster_before);
        assert_eq!(logo.image, logo_before);
    }

    #[test]
    fn zero_budget_returns_unmodified_copy() {
        let version = Version::new(1);
        let config = RenderConfig::default();
        let side_px = config.raster_side_px(version.side());
        let raster = RgbaImage::from_pixel(side_px, side_px, Rgba([255, 255, 255, 255]));
        let logo = LogoOverlay {
            image: solid_logo(8, Rgba([1, 2, 3, 255])),
            requested_size_px: 0,
        };
        let out = composite(&raster, version, EcLevel::L, &config, &logo);
        assert_eq!(out, raster);
    }
}
