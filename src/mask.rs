//! Mask selection and format/version information.
//!
//! Each of the 8 standard mask predicates is XOR-ed into the data modules,
//! the result is scored with the four penalty rules, and the lowest-penalty
//! candidate wins (ties to the lowest mask id). The winning mask id and the
//! error correction level are written into the format info area under its
//! own 15-bit BCH code, so a scanner can recover them under partial damage.

use crate::matrix::{format_info_positions, ModuleMatrix};
use crate::types::EcLevel;

/// A mask pattern id (0-7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this mask flips the module at `(x, y)`.
    fn flips(self, x: i32, y: i32) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

/// Trials all 8 masks on `matrix`, applies the winner, and writes the
/// format info (and version info for versions >= 7). Pass `forced` to pin
/// a specific mask instead of scoring.
///
/// After this returns the matrix is complete and must not change again.
pub(crate) fn select_and_apply(matrix: &mut ModuleMatrix, level: EcLevel, forced: Option<Mask>) {
    draw_version_info(matrix);
    let mask = forced.unwrap_or_else(|| {
        let mut best = Mask::new(0);
        let mut minpenalty = i32::MAX;
        for id in 0u8..8 {
            let mask = Mask::new(id);
            apply_mask(matrix, mask);
            draw_format_info(matrix, level, mask);
            let penalty = penalty_score(matrix);
            log::trace!("mask {id} penalty {penalty}");
            if penalty < minpenalty {
                best = mask;
                minpenalty = penalty;
            }
            apply_mask(matrix, mask); // Undoes the mask due to XOR
        }
        log::debug!("selected mask {} (penalty {minpenalty})", best.value());
        best
    });
    apply_mask(matrix, mask);
    draw_format_info(matrix, level, mask);
}

/// XORs the mask predicate into every data module. Self-inverse.
fn apply_mask(matrix: &mut ModuleMatrix, mask: Mask) {
    for y in 0..matrix.side() {
        for x in 0..matrix.side() {
            matrix.flip_if_maskable(x, y, mask.flips(x as i32, y as i32));
        }
    }
}

/// The 15-bit format sequence: 2 EC-level bits and 3 mask bits, 10 BCH
/// check bits, all XOR-ed with the fixed mask constant 0x5412.
pub(crate) fn format_info_bits(level: EcLevel, mask: Mask) -> u32 {
    let data = u32::from((level.format_bits() << 3) | mask.value());
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// The 18-bit version sequence: 6 version bits and 12 BCH check bits.
pub(crate) fn version_info_bits(version: u8) -> u32 {
    debug_assert!(version >= 7);
    let ver = u32::from(version);
    let mut rem = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    (ver << 12) | rem
}

fn draw_format_info(matrix: &mut ModuleMatrix, level: EcLevel, mask: Mask) {
    let bits = format_info_bits(level, mask);
    let positions = format_info_positions(matrix.side());
    debug_assert_eq!(positions.len(), 30);
    for (i, &(x, y)) in positions.iter().enumerate() {
        matrix.set_dark(x, y, bits >> (i % 15) & 1 != 0);
    }
}

fn draw_version_info(matrix: &mut ModuleMatrix) {
    let version = matrix.version().value();
    if version < 7 {
        return;
    }
    let bits = version_info_bits(version);
    let side = matrix.side();
    for i in 0..18 {
        let dark = bits >> i & 1 != 0;
        let a = side - 11 + i % 3;
        let b = i / 3;
        matrix.set_dark(a, b, dark);
        matrix.set_dark(b, a, dark);
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Scores a candidate with the four standard penalty rules: long runs,
/// 2x2 blocks, finder-lookalike sequences, and dark-ratio deviation.
pub(crate) fn penalty_score(matrix: &ModuleMatrix) -> i32 {
    let size = matrix.side() as i32;
    let mut result: i32 = 0;

    // Adjacent modules in row having same color, and finder-like patterns
    for y in 0..size {
        let mut runcolor = false;
        let mut runx: i32 = 0;
        let mut runhistory = FinderPenalty::new(size);
        for x in 0..size {
            if matrix.is_dark(x, y) == runcolor {
                runx += 1;
                if runx == 5 {
                    result += PENALTY_N1;
                } else if runx > 5 {
                    result += 1;
                }
            } else {
                runhistory.add_history(runx);
                if !runcolor {
                    result += runhistory.count_patterns() * PENALTY_N3;
                }
                runcolor = matrix.is_dark(x, y);
                runx = 1;
            }
        }
        result += runhistory.terminate_and_count(runcolor, runx) * PENALTY_N3;
    }
    // Adjacent modules in column having same color, and finder-like patterns
    for x in 0..size {
        let mut runcolor = false;
        let mut runy: i32 = 0;
        let mut runhistory = FinderPenalty::new(size);
        for y in 0..size {
            if matrix.is_dark(x, y) == runcolor {
                runy += 1;
                if runy == 5 {
                    result += PENALTY_N1;
                } else if runy > 5 {
                    result += 1;
                }
            } else {
                runhistory.add_history(runy);
                if !runcolor {
                    result += runhistory.count_patterns() * PENALTY_N3;
                }
                runcolor = matrix.is_dark(x, y);
                runy = 1;
            }
        }
        result += runhistory.terminate_and_count(runcolor, runy) * PENALTY_N3;
    }

    // 2x2 blocks of modules having same color
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = matrix.is_dark(x, y);
            if color == matrix.is_dark(x + 1, y)
                && color == matrix.is_dark(x, y + 1)
                && color == matrix.is_dark(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    // Balance of dark and light modules
    let dark = matrix.dark_count() as i32;
    let total = size * size;
    let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

/// Sliding run-length history for the 1:1:3:1:1 finder-lookalike rule,
/// including the light border extension at both ends of a line.
struct FinderPenalty {
    size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: i32) -> Self {
        Self {
            size,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.size; // Add light border to initial run
        }
        let len = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        i32::from(
            n > 0
                && rh[2] == n
                && rh[3] == n * 3
                && rh[4] == n
                && rh[5] == n
                && (rh[0] >= n * 4 || rh[6] >= n * 4),
        )
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.size; // Add light border to final run
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}
