//! Reed-Solomon error correction coder and the block structure tables.
//!
//! The codeword stream is split into the block layout mandated by
//! `(version, level)`; each data block gets its own correction codewords
//! computed over GF(256). The resulting [`EcBlockSet`] is later interleaved
//! into the single sequence the matrix constructor places.

use crate::gf256;
use crate::types::{EcLevel, Version};

// Tables from the QR Code Model 2 specification. Index: [level][version].
static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // L
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // M
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Q
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // H
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // L
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // M
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Q
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // H
];

fn table_get(table: &'static [[i8; 41]; 4], version: Version, level: EcLevel) -> usize {
    table[level.ordinal()][usize::from(version.value())] as usize
}

/// Number of data modules available in the grid, counting remainder bits.
pub(crate) fn raw_data_modules(version: Version) -> usize {
    let ver = usize::from(version.value());
    let mut result = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

/// Number of codewords (data plus correction) the grid holds.
pub(crate) fn total_codeword_count(version: Version) -> usize {
    raw_data_modules(version) / 8
}

/// Number of data codewords at `(version, level)`.
pub(crate) fn data_codeword_count(version: Version, level: EcLevel) -> usize {
    total_codeword_count(version)
        - table_get(&ECC_CODEWORDS_PER_BLOCK, version, level)
            * table_get(&NUM_ERROR_CORRECTION_BLOCKS, version, level)
}

/// One Reed-Solomon block: data codewords and their correction codewords.
pub(crate) struct EcBlock {
    pub data: Vec<u8>,
    pub ecc: Vec<u8>,
}

/// The ordered block structure for one symbol.
pub(crate) struct EcBlockSet {
    blocks: Vec<EcBlock>,
}

impl EcBlockSet {
    /// Splits the codeword stream into blocks and computes correction
    /// codewords for each. Some versions use two block sizes; the shorter
    /// blocks always come first.
    pub fn build(codewords: &[u8], version: Version, level: EcLevel) -> Self {
        assert_eq!(codewords.len(), data_codeword_count(version, level));
        let numblocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, version, level);
        let blockecclen = table_get(&ECC_CODEWORDS_PER_BLOCK, version, level);
        let rawcodewords = total_codeword_count(version);
        let numshortblocks = numblocks - rawcodewords % numblocks;
        let shortblockdatalen = rawcodewords / numblocks - blockecclen;

        let gen = generator(blockecclen);
        let mut blocks = Vec::with_capacity(numblocks);
        let mut rest = codewords;
        for i in 0..numblocks {
            let datalen = shortblockdatalen + usize::from(i >= numshortblocks);
            let (data, tail) = rest.split_at(datalen);
            blocks.push(EcBlock {
                data: data.to_vec(),
                ecc: remainder(data, &gen),
            });
            rest = tail;
        }
        debug_assert!(rest.is_empty());
        Self { blocks }
    }

    /// Interleaves the blocks into the placement sequence: round-robin one
    /// codeword at a time across data blocks, then across correction blocks.
    pub fn interleave(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let maxdatalen = self.blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
        for i in 0..maxdatalen {
            for block in &self.blocks {
                if let Some(&cw) = block.data.get(i) {
                    out.push(cw);
                }
            }
        }
        let ecclen = self.blocks.first().map_or(0, |b| b.ecc.len());
        for i in 0..ecclen {
            for block in &self.blocks {
                out.push(block.ecc[i]);
            }
        }
        out
    }

    #[cfg(test)]
    pub fn blocks(&self) -> &[EcBlock] {
        &self.blocks
    }
}

/// The generator polynomial for `degree` correction codewords: the product
/// of `(x - α^i)` for `i` in `0..degree`. Coefficients are returned highest
/// power first, leading coefficient included.
fn generator(degree: usize) -> Vec<u8> {
    assert!((1..=30).contains(&degree), "degree out of range");
    let mut poly = vec![1u8];
    for i in 0..degree {
        let root = gf256::exp(i);
        let mut next = vec![0u8; poly.len() + 1];
        for (j, &c) in poly.iter().enumerate() {
            next[j] ^= c;
            next[j + 1] ^= gf256::mul(c, root);
        }
        poly = next;
    }
    poly
}

/// Polynomial remainder of `data * x^degree` divided by the generator.
fn remainder(data: &[u8], gen: &[u8]) -> Vec<u8> {
    let degree = gen.len() - 1;
    let mut rem = vec![0u8; degree];
    for &b in data {
        let factor = b ^ rem[0];
        rem.rotate_left(1);
        rem[degree - 1] = 0;
        for (r, &g) in rem.iter_mut().zip(&gen[1..]) {
            *r ^= gf256::mul(g, factor);
        }
    }
    rem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment;
    use crate::types::Mode;

    /// Evaluates a polynomial (highest power first) at `x`.
    fn poly_eval(coeffs: &[u8], x: u8) -> u8 {
        coeffs
            .iter()
            .fold(0u8, |acc, &c| gf256::mul(acc, x) ^ c)
    }

    #[test]
    fn codeword_counts_match_standard() {
        assert_eq!(total_codeword_count(Version::new(1)), 26);
        assert_eq!(data_codeword_count(Version::new(1), EcLevel::L), 19);
        assert_eq!(data_codeword_count(Version::new(1), EcLevel::M), 16);
        assert_eq!(data_codeword_count(Version::new(1), EcLevel::Q), 13);
        assert_eq!(data_codeword_count(Version::new(1), EcLevel::H), 9);
        assert_eq!(data_codeword_count(Version::new(40), EcLevel::L), 2956);
    }

    #[test]
    fn generator_is_monic_with_expected_degree() {
        for degree in [7, 10, 13, 30] {
            let g = generator(degree);
            assert_eq!(g.len(), degree + 1);
            assert_eq!(g[0], 1);
        }
    }

    #[test]
    fn generator_roots_are_consecutive_alpha_powers() {
        let g = generator(13);
        for i in 0..13 {
            assert_eq!(poly_eval(&g, gf256::exp(i)), 0, "α^{i} must be a root");
        }
        assert_ne!(poly_eval(&g, gf256::exp(13)), 0);
    }

    #[test]
    fn data_plus_remainder_is_divisible_by_generator() {
        let data = b"HELLO WORLD CODEWORDS";
        let gen = generator(10);
        let ecc = remainder(data, &gen);
        let mut full = data.to_vec();
        full.extend_from_slice(&ecc);
        for i in 0..10 {
            assert_eq!(poly_eval(&full, gf256::exp(i)), 0);
        }
    }

    #[test]
    fn zero_data_has_zero_remainder() {
        let gen = generator(17);
        assert_eq!(remainder(&[0u8; 40], &gen), vec![0u8; 17]);
    }

    #[test]
    fn block_split_covers_stream_exactly() {
        // Version 5 at H uses 4 blocks of (11 + 22) with 46 data codewords.
        let version = Version::new(5);
        let cw = segment::build_codewords(b"BLOCK SPLIT", Mode::Alphanumeric, version, EcLevel::H);
        let set = EcBlockSet::build(&cw, version, EcLevel::H);
        assert_eq!(set.blocks().len(), 4);
        let datalen: usize = set.blocks().iter().map(|b| b.data.len()).sum();
        assert_eq!(datalen, cw.len());
        for block in set.blocks() {
            assert_eq!(block.ecc.len(), 22);
        }
        assert_eq!(set.interleave().len(), total_codeword_count(version));
    }

    #[test]
    fn interleave_round_robins_data_then_ecc() {
        let set = EcBlockSet {
            blocks: vec![
                EcBlock {
                    data: vec![1, 2],
                    ecc: vec![90, 91],
                },
                EcBlock {
                    data: vec![3, 4, 5],
                    ecc: vec![92, 93],
                },
            ],
        };
        assert_eq!(set.interleave(), vec![1, 3, 2, 4, 5, 90, 92, 91, 93]);
    }
}
