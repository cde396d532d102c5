//! Module matrix construction.
//!
//! A [`ModuleMatrix`] is the square grid of dark/light modules, each tagged
//! with the role it plays in the symbol. Fixed patterns (finder, separator,
//! timing, alignment, dark module) and the reserved format/version-info
//! areas are placed first; everything left over is a data module. The
//! interleaved codeword sequence is then placed into the data modules with
//! the standard two-column zig-zag sweep from the bottom-right corner.

use crate::ecc;
use crate::types::Version;

/// The role a module plays in the symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    /// Carries a bit of the interleaved data/correction stream.
    Data,
    Finder,
    Separator,
    Timing,
    Alignment,
    FormatInfo,
    VersionInfo,
    DarkModule,
    /// The blank border around the symbol; reported for out-of-bounds
    /// coordinates, never stored in the grid.
    Quiet,
}

impl Role {
    /// Whether the mask selector may flip this module.
    pub(crate) fn is_maskable(self) -> bool {
        self == Role::Data
    }
}

#[derive(Clone, Copy)]
struct Module {
    dark: bool,
    role: Role,
}

/// A square grid of role-tagged modules.
///
/// Mutable only inside the crate; by the time a caller sees one, mask
/// selection has finished and the grid is frozen.
#[derive(Clone)]
pub struct ModuleMatrix {
    version: Version,
    side: usize,
    modules: Vec<Module>,
}

impl ModuleMatrix {
    /// Allocates the grid for `version` and places all fixed patterns and
    /// reserved areas. Remaining modules are light data modules.
    pub(crate) fn with_function_patterns(version: Version) -> Self {
        let side = version.side();
        let mut m = Self {
            version,
            side,
            modules: vec![
                Module {
                    dark: false,
                    role: Role::Data,
                };
                side * side
            ],
        };
        m.place_finders_and_separators();
        m.place_timing();
        m.place_alignment();
        m.reserve_format_info();
        m.reserve_version_info();
        m.set(8, side - 8, true, Role::DarkModule);
        m
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Side length in modules, between 21 and 177.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules.
    /// Coordinates outside the grid return `false`.
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        let range = 0..self.side as i32;
        range.contains(&x) && range.contains(&y) && self.get(x as usize, y as usize).dark
    }

    /// The role of the module at the given coordinates; [`Role::Quiet`] for
    /// coordinates outside the grid.
    pub fn role_at(&self, x: i32, y: i32) -> Role {
        let range = 0..self.side as i32;
        if range.contains(&x) && range.contains(&y) {
            self.get(x as usize, y as usize).role
        } else {
            Role::Quiet
        }
    }

    /// Number of dark modules in the grid.
    pub(crate) fn dark_count(&self) -> usize {
        self.modules.iter().filter(|m| m.dark).count()
    }

    fn get(&self, x: usize, y: usize) -> Module {
        self.modules[y * self.side + x]
    }

    fn set(&mut self, x: usize, y: usize, dark: bool, role: Role) {
        self.modules[y * self.side + x] = Module { dark, role };
    }

    /// Sets the color of a module without changing its role.
    pub(crate) fn set_dark(&mut self, x: usize, y: usize, dark: bool) {
        self.modules[y * self.side + x].dark = dark;
    }

    /// Flips a data module; fixed and reserved modules are left untouched.
    pub(crate) fn flip_if_maskable(&mut self, x: usize, y: usize, flip: bool) {
        let m = &mut self.modules[y * self.side + x];
        if m.role.is_maskable() {
            m.dark ^= flip;
        }
    }

    fn place_finders_and_separators(&mut self) {
        let side = self.side;
        let corners = [(0usize, 0usize), (side - 7, 0), (0, side - 7)];
        for &(left, top) in &corners {
            for dy in 0..7 {
                for dx in 0..7 {
                    // Dark ring pattern: everything except the ring at
                    // Chebyshev distance 2 from the center.
                    let dist = (dx as i32 - 3).abs().max((dy as i32 - 3).abs());
                    self.set(left + dx, top + dy, dist != 2, Role::Finder);
                }
            }
        }
        // One-module light strips between each finder and the interior.
        for i in 0..8 {
            self.set(7, i, false, Role::Separator);
            self.set(i, 7, false, Role::Separator);
            self.set(side - 8, i, false, Role::Separator);
            self.set(side - 8 + i, 7, false, Role::Separator);
            self.set(7, side - 8 + i, false, Role::Separator);
            self.set(i, side - 8, false, Role::Separator);
        }
    }

    fn place_timing(&mut self) {
        for i in 8..self.side - 8 {
            let dark = i % 2 == 0;
            self.set(i, 6, dark, Role::Timing);
            self.set(6, i, dark, Role::Timing);
        }
    }

    fn place_alignment(&mut self) {
        let positions = alignment_positions(self.version);
        let last = positions.len().saturating_sub(1);
        for (i, &cx) in positions.iter().enumerate() {
            for (j, &cy) in positions.iter().enumerate() {
                // Skip the three corners occupied by finder patterns.
                if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                    continue;
                }
                for dy in -2i32..=2 {
                    for dx in -2i32..=2 {
                        let dark = dx.abs().max(dy.abs()) != 1;
                        self.set(
                            (cx as i32 + dx) as usize,
                            (cy as i32 + dy) as usize,
                            dark,
                            Role::Alignment,
                        );
                    }
                }
            }
        }
    }

    fn reserve_format_info(&mut self) {
        for (x, y) in format_info_positions(self.side) {
            self.set(x, y, false, Role::FormatInfo);
        }
    }

    fn reserve_version_info(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let side = self.side;
        for i in 0..18 {
            let a = side - 11 + i % 3;
            let b = i / 3;
            self.set(a, b, false, Role::VersionInfo);
            self.set(b, a, false, Role::VersionInfo);
        }
    }

    /// Places the interleaved codeword bits into the data modules, sweeping
    /// two-module columns from the right edge, alternating upward and
    /// downward, and skipping the vertical timing column. Data modules past
    /// the end of the stream are the version's remainder bits and stay zero.
    pub(crate) fn place_codewords(&mut self, codewords: &[u8]) {
        let expected = ecc::raw_data_modules(self.version);
        assert_eq!(
            codewords.len() * 8 + (expected & 7),
            expected,
            "codeword stream does not match the grid's data module count"
        );
        let side = self.side as i32;
        let mut i: usize = 0;
        let mut right: i32 = side - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..side {
                for j in 0..2 {
                    let x = (right - j) as usize;
                    let upward = ((right + 1) & 2) == 0;
                    let y = (if upward { side - 1 - vert } else { vert }) as usize;
                    if self.get(x, y).role == Role::Data && i < codewords.len() * 8 {
                        let dark = (codewords[i >> 3] >> (7 - (i & 7))) & 1 != 0;
                        self.set_dark(x, y, dark);
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, codewords.len() * 8);
    }
}

/// Center coordinates of the alignment patterns, in ascending order. Empty
/// for version 1. The closed form reproduces the standard position table,
/// including the version 32 irregularity.
pub(crate) fn alignment_positions(version: Version) -> Vec<usize> {
    let ver = usize::from(version.value());
    if ver == 1 {
        return Vec::new();
    }
    let numalign = ver / 7 + 2;
    let step = if ver == 32 {
        26
    } else {
        ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
    };
    let side = version.side();
    let mut result: Vec<usize> = (0..numalign - 1).map(|i| side - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

/// The 15 module coordinates of each format info copy, in bit order 0..15.
/// The first copy wraps the top-left finder; the second splits between the
/// top-right and bottom-left finders.
pub(crate) fn format_info_positions(side: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(30);
    for i in 0..6 {
        out.push((8, i));
    }
    out.push((8, 7));
    out.push((8, 8));
    out.push((7, 8));
    for i in (0..6).rev() {
        out.push((i, 8));
    }
    for i in 0..8 {
        out.push((side - 1 - i, 8));
    }
    for i in 8..15 {
        out.push((8, side - 15 + i));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Version;

    fn data_module_count(m: &ModuleMatrix) -> usize {
        let side = m.side() as i32;
        let mut count = 0;
        for y in 0..side {
            for x in 0..side {
                if m.role_at(x, y) == Role::Data {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn alignment_positions_match_standard_table() {
        assert!(alignment_positions(Version::new(1)).is_empty());
        assert_eq!(alignment_positions(Version::new(2)), vec![6, 18]);
        assert_eq!(alignment_positions(Version::new(7)), vec![6, 22, 38]);
        assert_eq!(alignment_positions(Version::new(14)), vec![6, 26, 46, 66]);
        assert_eq!(alignment_positions(Version::new(32)), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(
            alignment_positions(Version::new(40)),
            vec![6, 30, 58, 86, 114, 142, 170]
        );
    }

    #[test]
    fn data_module_count_matches_raw_capacity() {
        for v in [1u8, 2, 6, 7, 14, 32, 40] {
            let version = Version::new(v);
            let m = ModuleMatrix::with_function_patterns(version);
            assert_eq!(
                data_module_count(&m),
                ecc::raw_data_modules(version),
                "version {v}"
            );
        }
    }

    #[test]
    fn finder_corners_are_dark_and_quiet_zone_is_outside() {
        let m = ModuleMatrix::with_function_patterns(Version::new(1));
        assert!(m.is_dark(0, 0));
        assert!(m.is_dark(20, 0));
        assert!(m.is_dark(0, 20));
        assert_eq!(m.role_at(0, 0), Role::Finder);
        assert_eq!(m.role_at(-1, 0), Role::Quiet);
        assert_eq!(m.role_at(0, 21), Role::Quiet);
        assert!(!m.is_dark(-1, -1));
    }

    #[test]
    fn timing_pattern_alternates_starting_dark() {
        let m = ModuleMatrix::with_function_patterns(Version::new(2));
        assert!(m.is_dark(8, 6));
        assert!(!m.is_dark(9, 6));
        assert_eq!(m.role_at(8, 6), Role::Timing);
        assert_eq!(m.role_at(6, 8), Role::Timing);
    }

    #[test]
    fn dark_module_is_fixed() {
        let m = ModuleMatrix::with_function_patterns(Version::new(3));
        let side = m.side() as i32;
        assert!(m.is_dark(8, side - 8));
        assert_eq!(m.role_at(8, side - 8), Role::DarkModule);
    }

    #[test]
    fn format_info_reserves_fifteen_modules_per_copy() {
        let positions = format_info_positions(21);
        assert_eq!(positions.len(), 30);
        // The timing row/column modules are never part of format info.
        assert!(!positions.contains(&(8, 6)));
        assert!(!positions.contains(&(6, 8)));
    }

    #[test]
    fn version_info_reserved_from_version_7() {
        let m6 = ModuleMatrix::with_function_patterns(Version::new(6));
        let m7 = ModuleMatrix::with_function_patterns(Version::new(7));
        let side6 = m6.side() as i32;
        let side7 = m7.side() as i32;
        assert_eq!(m6.role_at(side6 - 11, 0), Role::Data);
        assert_eq!(m7.role_at(side7 - 11, 0), Role::VersionInfo);
        assert_eq!(m7.role_at(0, side7 - 11), Role::VersionInfo);
    }

    #[test]
    fn codeword_placement_fills_every_data_module() {
        let version = Version::new(1);
        let mut m = ModuleMatrix::with_function_patterns(version);
        let codewords = vec![0xFFu8; ecc::total_codeword_count(version)];
        m.place_codewords(&codewords);
        let side = m.side() as i32;
        for y in 0..side {
            for x in 0..side {
                if m.role_at(x, y) == Role::Data {
                    assert!(m.is_dark(x, y), "data module ({x},{y}) not placed");
                }
            }
        }
    }

    #[test]
    fn first_codeword_bit_lands_bottom_right() {
        let version = Version::new(1);
        let mut m = ModuleMatrix::with_function_patterns(version);
        let mut codewords = vec![0u8; ecc::total_codeword_count(version)];
        codewords[0] = 0x80;
        m.place_codewords(&codewords);
        assert!(m.is_dark(20, 20));
        assert!(!m.is_dark(19, 20));
    }
}
