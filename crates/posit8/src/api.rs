//! Vector and matrix kernels with wide accumulation.
//!
//! The kernels decode operands through the shared 256-entry table, accumulate
//! in binary64, and encode exactly once per output element. Buffer lengths
//! are validated against the stated dimensions before anything is written;
//! a mismatch fails fast with [`Error::DimensionMismatch`].
//!
//! Within one output element the summation order is fixed (`t = 0..k`), so
//! results are bit-for-bit reproducible for a given dimensions triple, in the
//! sequential and the data-parallel variant alike.

use crate::codec::encode;
use crate::error::{Error, Result};
use crate::tables;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[inline]
fn check_len(buffer: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch {
            buffer,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Elementwise P8 addition: `out[i] = a[i] + b[i]` through the add table.
///
/// All three buffers must have the same length.
///
/// # Example
///
/// ```
/// use posit8::{add_vector, encode};
///
/// let a = [encode(1.0), encode(2.0)];
/// let b = [encode(3.0), encode(4.0)];
/// let mut out = [0u8; 2];
/// add_vector(&a, &b, &mut out).unwrap();
/// assert_eq!(out, [encode(4.0), encode(6.0)]);
/// ```
pub fn add_vector(a: &[u8], b: &[u8], out: &mut [u8]) -> Result<()> {
    check_len("b", a.len(), b.len())?;
    check_len("out", a.len(), out.len())?;
    for ((&x, &y), slot) in a.iter().zip(b).zip(out.iter_mut()) {
        *slot = tables::ADD[x as usize][y as usize];
    }
    Ok(())
}

/// Dot product of two P8 vectors, accumulated in binary64.
///
/// Each pair is decoded through the shared table and `aᵢ·bᵢ` is summed
/// sequentially in binary64; no intermediate result is re-encoded, which
/// avoids the double rounding a pure-P8 reduction would suffer. The result
/// is returned as binary64; encode it with [`crate::encode`] if a P8 sink is
/// wanted.
pub fn dot_product(a: &[u8], b: &[u8]) -> Result<f64> {
    check_len("b", a.len(), b.len())?;
    let dec = tables::decode_table();
    let mut acc = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        acc += dec[x as usize] * dec[y as usize];
    }
    Ok(acc)
}

/// Dot product reduced entirely through the mul and add tables.
///
/// Every intermediate product and partial sum is quantized back to P8, so
/// this trades accuracy for pure table throughput. Prefer [`dot_product`]
/// unless the double rounding is acceptable.
pub fn dot_product_quantized(a: &[u8], b: &[u8]) -> Result<u8> {
    check_len("b", a.len(), b.len())?;
    let mut acc = 0x00u8;
    for (&x, &y) in a.iter().zip(b) {
        acc = tables::ADD[acc as usize][tables::MUL[x as usize][y as usize] as usize];
    }
    Ok(acc)
}

/// One output row of the matrix product: the pure per-grid-index kernel that
/// the sequential loop, the worker pool, and the device grid all visit.
fn matmul_row(a_row: &[u8], b: &[u8], out_row: &mut [u8], k: usize) {
    let dec = tables::decode_table();
    let n = out_row.len();
    for (j, slot) in out_row.iter_mut().enumerate() {
        let mut acc = 0.0f64;
        for t in 0..k {
            acc += dec[a_row[t] as usize] * dec[b[t * n + j] as usize];
        }
        *slot = encode(acc);
    }
}

fn validate_matmul(a: &[u8], b: &[u8], c: &[u8], m: usize, k: usize, n: usize) -> Result<()> {
    check_len("A", m * k, a.len())?;
    check_len("B", k * n, b.len())?;
    check_len("C", m * n, c.len())?;
    Ok(())
}

/// Dense matrix multiply, `C[i,j] = Σ_t A[i,t]·B[t,j]`, row-major.
///
/// All `k` multiply-adds for one output element accumulate in binary64;
/// exactly one encode happens per element of `C`. Dimensions are validated
/// against all three buffer lengths before any write.
///
/// # Example
///
/// ```
/// use posit8::{encode, matmul};
///
/// let e = |x: f64| encode(x);
/// let a = [e(1.0), e(2.0), e(3.0), e(4.0)];
/// let id = [e(1.0), e(0.0), e(0.0), e(1.0)];
/// let mut c = [0u8; 4];
/// matmul(&a, &id, &mut c, 2, 2, 2).unwrap();
/// assert_eq!(c, a);
/// ```
pub fn matmul(a: &[u8], b: &[u8], c: &mut [u8], m: usize, k: usize, n: usize) -> Result<()> {
    validate_matmul(a, b, c, m, k, n)?;
    if m == 0 || n == 0 {
        return Ok(());
    }
    for (i, c_row) in c.chunks_mut(n).enumerate() {
        matmul_row(&a[i * k..(i + 1) * k], b, c_row, k);
    }
    Ok(())
}

/// [`matmul`] with the output rows fanned across a worker pool.
///
/// Identical contract and identical bits: each output element is still
/// accumulated in the fixed `t = 0..k` order, workers share only the
/// immutable decode table, and each writes a disjoint row range of `C`. The
/// call joins all workers before returning.
#[cfg(feature = "parallel")]
pub fn matmul_parallel(
    a: &[u8],
    b: &[u8],
    c: &mut [u8],
    m: usize,
    k: usize,
    n: usize,
) -> Result<()> {
    validate_matmul(a, b, c, m, k, n)?;
    if m == 0 || n == 0 {
        return Ok(());
    }
    // Force table construction on the caller before fanning out.
    let _ = tables::decode_table();
    c.par_chunks_mut(n).enumerate().for_each(|(i, c_row)| {
        matmul_row(&a[i * k..(i + 1) * k], b, c_row, k);
    });
    Ok(())
}

/// Allocating convenience wrapper around [`matmul`].
pub fn matmul_alloc(a: &[u8], b: &[u8], m: usize, k: usize, n: usize) -> Result<Vec<u8>> {
    let mut c = vec![0u8; m * n];
    matmul(a, b, &mut c, m, k, n)?;
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    fn enc(xs: &[f64]) -> Vec<u8> {
        xs.iter().copied().map(encode).collect()
    }

    #[test]
    fn add_vector_basic_and_nar() {
        let a = enc(&[1.0, 2.0, 0.0]);
        let mut b = enc(&[1.0, -2.0, 5.0]);
        b[2] = 0x80;
        let mut out = [0u8; 3];
        add_vector(&a, &b, &mut out).unwrap();
        assert_eq!(out[0], encode(2.0));
        assert_eq!(out[1], 0x00);
        assert_eq!(out[2], 0x80);
    }

    #[test]
    fn add_vector_length_mismatch() {
        let a = [0x40u8; 4];
        let b = [0x40u8; 3];
        let mut out = [0u8; 4];
        let err = add_vector(&a, &b, &mut out).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                buffer: "b",
                expected: 4,
                actual: 3
            }
        );

        let b = [0x40u8; 4];
        let mut short = [0u8; 2];
        assert!(add_vector(&a, &b, &mut short).is_err());
    }

    #[test]
    fn dot_product_matches_reference_order() {
        let a = enc(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = enc(&[2.0, 2.0, 2.0, 2.0, 2.0]);

        let mut reference = 0.0f64;
        for (&x, &y) in a.iter().zip(&b) {
            reference += decode(x) * decode(y);
        }
        let got = dot_product(&a, &b).unwrap();
        assert_eq!(got.to_bits(), reference.to_bits());
        assert_eq!(got, 30.0);
    }

    #[test]
    fn dot_product_rejects_mismatched_lengths() {
        assert!(dot_product(&[0x40], &[0x40, 0x40]).is_err());
    }

    #[test]
    fn dot_product_quantized_small_case() {
        let a = enc(&[1.0, 2.0]);
        let b = enc(&[2.0, 2.0]);
        assert_eq!(dot_product_quantized(&a, &b).unwrap(), encode(6.0));
    }

    #[test]
    fn matmul_identity_and_scaling() {
        let a = enc(&[1.0, 2.0, 3.0, 4.0]);
        let id = enc(&[1.0, 0.0, 0.0, 1.0]);
        let mut c = [0u8; 4];
        matmul(&a, &id, &mut c, 2, 2, 2).unwrap();
        assert_eq!(&c[..], &a[..]);

        let twice = enc(&[2.0, 0.0, 0.0, 2.0]);
        matmul(&a, &twice, &mut c, 2, 2, 2).unwrap();
        assert_eq!(&c[..], &enc(&[2.0, 4.0, 6.0, 8.0])[..]);
    }

    #[test]
    fn matmul_non_square() {
        // (1x3) · (3x1) is just a dot product.
        let a = enc(&[1.0, 2.0, 3.0]);
        let b = enc(&[4.0, 5.0, 6.0]);
        let mut c = [0u8; 1];
        matmul(&a, &b, &mut c, 1, 3, 1).unwrap();
        assert_eq!(c[0], encode(32.0));
    }

    #[test]
    fn matmul_validates_before_writing() {
        let a = [0x40u8; 3]; // wrong: 2x2 needs 4
        let b = [0x40u8; 4];
        let mut c = [0xAAu8; 4];
        let err = matmul(&a, &b, &mut c, 2, 2, 2).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                buffer: "A",
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(c, [0xAA; 4], "output must be untouched on failure");

        // Bad C length is also caught before any write.
        let a = [0x40u8; 4];
        let mut c = [0xAAu8; 3];
        assert!(matmul(&a, &b, &mut c, 2, 2, 2).is_err());
        assert_eq!(c, [0xAA; 3]);
    }

    #[test]
    fn matmul_empty_dimensions() {
        let mut c = [0u8; 0];
        matmul(&[], &[], &mut c, 0, 0, 0).unwrap();
        matmul(&[], &[], &mut c, 0, 3, 0).unwrap();

        // k = 0 with non-empty output: every element is the empty sum.
        let mut c = [0xAAu8; 4];
        matmul(&[], &[], &mut c, 2, 0, 2).unwrap();
        assert_eq!(c, [0x00; 4]);
    }

    #[test]
    fn matmul_nar_corrupts_only_its_elements() {
        let mut a = enc(&[1.0, 2.0, 3.0, 4.0]);
        a[0] = 0x80;
        let id = enc(&[1.0, 0.0, 0.0, 1.0]);
        let mut c = [0u8; 4];
        matmul(&a, &id, &mut c, 2, 2, 2).unwrap();
        // NaR flows into the whole first row, leaves the second intact.
        assert_eq!(c[0], 0x80);
        assert_eq!(c[1], 0x80);
        assert_eq!(c[2], encode(3.0));
        assert_eq!(c[3], encode(4.0));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matmul_matches_sequential_bit_for_bit() {
        let (m, k, n) = (17, 13, 9);
        // Cover the whole octet domain, NaR and zero included.
        let a: Vec<u8> = (0..m * k).map(|i| (i * 37 % 256) as u8).collect();
        let b: Vec<u8> = (0..k * n).map(|i| (i * 101 % 256) as u8).collect();

        let mut c_seq = vec![0u8; m * n];
        matmul(&a, &b, &mut c_seq, m, k, n).unwrap();

        let mut c_par = vec![0u8; m * n];
        matmul_parallel(&a, &b, &mut c_par, m, k, n).unwrap();

        assert_eq!(c_seq, c_par);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matmul_validates_dimensions() {
        let mut c = [0xAAu8; 4];
        assert!(matmul_parallel(&[0x40; 3], &[0x40; 4], &mut c, 2, 2, 2).is_err());
        assert_eq!(c, [0xAA; 4]);
    }
}
