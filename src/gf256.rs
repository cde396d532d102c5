//! GF(256) arithmetic for Reed-Solomon coding.
//!
//! QR codes use the field generated by the primitive polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (0x11D) with primitive element 2. Multiplication
//! and division go through log/antilog tables built once at compile time; the
//! antilog table is doubled so products of logs never need a reduction step.

const PRIMITIVE_POLY: u16 = 0x11D;

struct Tables {
    exp: [u8; 512],
    log: [u8; 256],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    // exp[510..512] are never reached: log(a) + log(b) <= 508.
    Tables { exp, log }
}

static TABLES: Tables = build_tables();

/// Field multiplication.
pub(crate) fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let la = TABLES.log[a as usize] as usize;
    let lb = TABLES.log[b as usize] as usize;
    TABLES.exp[la + lb]
}

/// Field division.
///
/// # Panics
///
/// Panics on division by zero.
#[allow(dead_code)]
pub(crate) fn div(a: u8, b: u8) -> u8 {
    assert!(b != 0, "GF(256) division by zero");
    if a == 0 {
        return 0;
    }
    let la = TABLES.log[a as usize] as usize;
    let lb = TABLES.log[b as usize] as usize;
    TABLES.exp[la + 255 - lb]
}

/// The `i`-th power of the primitive element.
pub(crate) fn exp(i: usize) -> u8 {
    TABLES.exp[i % 255]
}
