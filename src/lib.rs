//! # qrforge
//!
//! A QR symbol encoding engine with colored raster rendering and
//! decode-safe logo overlays.
//!
//! `qrforge` converts text or binary payloads into QR Code Model 2 symbols:
//! it selects the smallest fitting version (1-40), packs the payload into
//! codewords, computes Reed-Solomon error correction over GF(256), lays out
//! the module grid, picks the lowest-penalty mask, and rasterizes the result
//! with caller-chosen colors. An optional center logo is composited onto the
//! raster, clipped to the error correction budget so the symbol stays
//! decodable.
//!
//! ## Features
//!
//! - Numeric, alphanumeric, and byte encoding modes, with automatic mode
//!   detection.
//! - All four error correction levels: L, M, Q, H.
//! - RGBA raster output with configurable module size, quiet zone, and
//!   foreground/background colors.
//! - Logo overlay sized to the error correction repair budget.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! ```rust
//! use qrforge::{encode, EcLevel, ModeHint, RenderConfig, SymbolRequest};
//!
//! let request = SymbolRequest::new("HELLO WORLD", EcLevel::M, ModeHint::Auto);
//! let raster = encode(&request, &RenderConfig::default()).unwrap();
//! assert_eq!(raster.width(), raster.height());
//! ```
//!
//! With a logo:
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use qrforge::{encode_with_logo, EcLevel, LogoOverlay, ModeHint, RenderConfig, SymbolRequest};
//!
//! let request = SymbolRequest::new("https://example.com", EcLevel::H, ModeHint::Auto);
//! let logo = LogoOverlay {
//!     image: RgbaImage::from_pixel(64, 64, Rgba([255, 165, 0, 255])),
//!     requested_size_px: 64,
//! };
//! let raster = encode_with_logo(&request, &RenderConfig::default(), &logo).unwrap();
//! ```
//!
//! Encoding a raster to a file format (PNG etc.) and writing it to disk are
//! the caller's job; the engine stops at the pixel buffer.

#![forbid(unsafe_code)]

mod ecc;
mod error;
mod gf256;
mod segment;

pub mod mask;
pub mod matrix;
pub mod overlay;
pub mod render;
pub mod types;

pub use error::QrError;
pub use mask::Mask;
pub use matrix::{ModuleMatrix, Role};
pub use overlay::{safe_logo_side_modules, LogoOverlay};
pub use render::{to_console_string, RenderConfig};
pub use types::{select_version, EcLevel, Mode, ModeHint, SymbolRequest, Version};

use image::RgbaImage;

/// Encodes a request into a frozen module matrix, without rasterizing.
///
/// Runs the pipeline through mask selection: version selection, data
/// codeword packing, Reed-Solomon coding, matrix layout, and masking.
pub fn encode_matrix(request: &SymbolRequest) -> Result<ModuleMatrix, QrError> {
    encode_matrix_with_mask(request, None)
}

/// Like [`encode_matrix`], but pins the mask pattern instead of scoring all
/// eight candidates.
pub fn encode_matrix_with_mask(
    request: &SymbolRequest,
    mask: Option<Mask>,
) -> Result<ModuleMatrix, QrError> {
    let payload = request.payload();
    let level = request.level();
    let mode = request.mode().resolve(payload);
    let version = select_version(payload.len(), mode, level)?;
    let codewords = segment::build_codewords(payload, mode, version, level);
    let blocks = ecc::EcBlockSet::build(&codewords, version, level);
    let mut matrix = ModuleMatrix::with_function_patterns(version);
    matrix.place_codewords(&blocks.interleave());
    mask::select_and_apply(&mut matrix, level, mask);
    Ok(matrix)
}

/// End-to-end entry point: encodes the request and rasterizes it.
///
/// The returned buffer is owned exclusively by the caller. The only
/// possible failure is [`QrError::CapacityExceeded`], raised before any
/// encoding work begins.
pub fn encode(request: &SymbolRequest, config: &RenderConfig) -> Result<RgbaImage, QrError> {
    let matrix = encode_matrix(request)?;
    Ok(render::render(&matrix, config))
}

/// Encodes the request, rasterizes it, and composites `logo` into the
/// center, clipped to the error correction budget of the request's level.
pub fn encode_with_logo(
    request: &SymbolRequest,
    config: &RenderConfig,
    logo: &LogoOverlay,
) -> Result<RgbaImage, QrError> {
    let matrix = encode_matrix(request)?;
    let raster = render::render(&matrix, config);
    Ok(overlay::composite(
        &raster,
        matrix.version(),
        request.level(),
        config,
        logo,
    ))
}
