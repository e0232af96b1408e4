//! Process-lifetime lookup tables derived from the codec.
//!
//! Every scalar operation in the crate is a table lookup. The tables are
//! built once, on first use, by running [`crate::codec`] over the 8-bit
//! domain: the 256-entry decode table first, then the single-operand tables,
//! then the four 256×256 binary-operation tables as
//! `encode(decode(a) ⊕ decode(b))`. After construction they are immutable and
//! safe for unsynchronized concurrent reads.
//!
//! The sentinel rules fall out of the codec itself: decoding NaR yields NaN,
//! any arithmetic on NaN yields NaN, and encoding NaN (or the infinities a
//! zero divisor produces) yields NaR.
//!
//! Total footprint: `256·8 + 3·256 + 4·65536` = 264 960 bytes.

use once_cell::sync::Lazy;

use crate::codec::{decode, encode};

/// The NaR code point, the sole non-numeric octet.
pub(crate) const NAR: u8 = 0x80;

pub(crate) type BinTable = [[u8; 256]; 256];

pub(crate) static DECODE: Lazy<[f64; 256]> = Lazy::new(|| {
    let mut t = [0.0f64; 256];
    for (p, slot) in t.iter_mut().enumerate() {
        *slot = decode(p as u8);
    }
    t
});

pub(crate) static NEG: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut t = [0u8; 256];
    for (p, slot) in t.iter_mut().enumerate() {
        *slot = (p as u8).wrapping_neg();
    }
    t
});

pub(crate) static ABS: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut t = [0u8; 256];
    for (p, slot) in t.iter_mut().enumerate() {
        let p = p as u8;
        // NaR maps to itself: 0x80 is its own two's complement.
        *slot = if (p as i8) < 0 { p.wrapping_neg() } else { p };
    }
    t
});

pub(crate) static RECIP: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut t = [0u8; 256];
    for (p, slot) in t.iter_mut().enumerate() {
        let p = p as u8;
        *slot = if p == 0x00 || p == NAR {
            NAR
        } else {
            encode(1.0 / DECODE[p as usize])
        };
    }
    t
});

fn binary_table(op: fn(f64, f64) -> f64) -> Box<BinTable> {
    let mut t = Box::new([[0u8; 256]; 256]);
    for (a, row) in t.iter_mut().enumerate() {
        for (b, slot) in row.iter_mut().enumerate() {
            *slot = encode(op(DECODE[a], DECODE[b]));
        }
    }
    t
}

pub(crate) static ADD: Lazy<Box<BinTable>> = Lazy::new(|| binary_table(|a, b| a + b));
pub(crate) static SUB: Lazy<Box<BinTable>> = Lazy::new(|| binary_table(|a, b| a - b));
pub(crate) static MUL: Lazy<Box<BinTable>> = Lazy::new(|| binary_table(|a, b| a * b));
pub(crate) static DIV: Lazy<Box<BinTable>> = Lazy::new(|| binary_table(|a, b| a / b));

/// The 256-entry decode table: `decode_table()[p] == decode(p)`, with a quiet
/// NaN in the NaR slot.
///
/// This is the table the wide-accumulation kernels read, and the one a device
/// back end uploads at initialization.
pub fn decode_table() -> &'static [f64; 256] {
    &DECODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_table_matches_codec() {
        let t = decode_table();
        for p in 0u16..=255 {
            let p = p as u8;
            if p == NAR {
                assert!(t[p as usize].is_nan());
            } else {
                assert_eq!(t[p as usize], decode(p));
            }
        }
    }

    #[test]
    fn nar_propagates_through_every_binary_op() {
        for q in 0u16..=255 {
            let q = q as usize;
            for t in [&ADD, &SUB, &MUL, &DIV] {
                assert_eq!(t[NAR as usize][q], NAR);
                assert_eq!(t[q][NAR as usize], NAR);
            }
        }
    }

    #[test]
    fn add_and_mul_are_commutative() {
        for a in 0usize..256 {
            for b in 0usize..256 {
                assert_eq!(ADD[a][b], ADD[b][a]);
                assert_eq!(MUL[a][b], MUL[b][a]);
            }
        }
    }

    #[test]
    fn additive_identity_and_multiplicative_annihilator() {
        for p in 0u16..=255 {
            let p = p as u8;
            if p == NAR {
                continue;
            }
            assert_eq!(ADD[p as usize][0x00], p);
            assert_eq!(ADD[0x00][p as usize], p);
            assert_eq!(MUL[p as usize][0x00], 0x00);
        }
    }

    #[test]
    fn multiplicative_identity_is_exact() {
        let one = encode(1.0) as usize;
        for p in 0u16..=255 {
            let p = p as u8;
            if p == NAR {
                continue;
            }
            // decode(p) * 1.0 re-encodes bit-exactly by the round-trip
            // property, so the identity holds exactly, not just within a ULP.
            assert_eq!(MUL[p as usize][one], p);
        }
    }

    #[test]
    fn zero_divisor_yields_nar() {
        for p in 0u16..=255 {
            assert_eq!(DIV[p as usize][0x00], NAR);
        }
    }

    #[test]
    fn division_by_self_is_one() {
        let one = encode(1.0);
        for p in 1u16..=255 {
            let p = p as u8;
            if p == NAR {
                continue;
            }
            assert_eq!(DIV[p as usize][p as usize], one);
        }
    }

    #[test]
    fn recip_sentinels_and_involution() {
        assert_eq!(RECIP[0x00], NAR);
        assert_eq!(RECIP[NAR as usize], NAR);
        for p in 1u16..=255 {
            let p = p as u8;
            if p == NAR {
                continue;
            }
            let back = RECIP[RECIP[p as usize] as usize];
            let ulps = (back as i8 as i32 - p as i8 as i32).abs();
            assert!(ulps <= 1, "recip(recip(0x{p:02X})) = 0x{back:02X}");
        }
    }

    #[test]
    fn recip_of_powers_of_two_is_exact() {
        assert_eq!(RECIP[0x50], encode(0.5));
        assert_eq!(RECIP[0x7F], 0x01);
        assert_eq!(RECIP[0x01], 0x7F);
        assert_eq!(RECIP[0x40], 0x40);
    }
}
