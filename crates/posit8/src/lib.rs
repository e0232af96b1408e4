//! 8-bit posit (es = 1) arithmetic with table-driven operations and
//! wide-accumulation linear algebra kernels.
//!
//! A P8 value is a single octet: sign bit, run-length-encoded regime, one
//! exponent bit when there is room, and an implicit-leading-one fraction in
//! whatever bits remain. `0x00` is exact zero and `0x80` is NaR ("not a
//! real"), the sole non-numeric code point. The [`codec`] module implements
//! the bit-exact conversion to and from binary64 with round-to-nearest-even;
//! everything else in the crate is derived from it through
//! once-per-process lookup tables.
//!
//! # Quick start
//!
//! ```
//! use posit8::{add, decode, dot_product, encode, Posit8};
//!
//! // Scalar arithmetic is a table lookup per operation.
//! let one = encode(1.0);
//! assert_eq!(one, 0x40);
//! assert_eq!(add(one, one), encode(2.0));
//! assert_eq!(decode(0x50), 2.0);
//!
//! // NaR propagates in-band instead of raising errors.
//! assert_eq!(posit8::div(one, 0x00), 0x80);
//!
//! // Reductions accumulate in binary64 and quantize only at the sink.
//! let a: Vec<u8> = [1.0, 2.0, 3.0].map(encode).to_vec();
//! let b: Vec<u8> = [2.0, 2.0, 2.0].map(encode).to_vec();
//! assert_eq!(dot_product(&a, &b).unwrap(), 12.0);
//!
//! // Or stay in the wrapper type.
//! assert_eq!(Posit8::from_f64(2.0) * Posit8::from_f64(3.0), Posit8::from_f64(6.0));
//! ```
//!
//! # Layers
//!
//! - [`codec`]: `encode`/`decode` between an octet and binary64.
//! - [`tables`]: lazily-built, immutable lookup tables (the 256-entry decode
//!   table plus 256×256 tables for the binary ops).
//! - [`scalar`]: O(1) scalar operations and the [`Posit8`] newtype.
//! - [`api`]: `add_vector`, `dot_product`, and dense `matmul`, sequential and
//!   data-parallel (the latter behind the default `parallel` feature).
//!
//! A CUDA back end for the matrix multiply lives in the companion
//! `posit8-cuda` crate; it uploads the same decode table and runs a kernel
//! with identical decode/accumulate/encode semantics.
//!
//! # Errors
//!
//! Scalar operations cannot fail: invalid inputs produce NaR. The kernels
//! validate buffer lengths against their stated dimensions and return
//! [`Error::DimensionMismatch`] before writing anything.

pub mod api;
pub mod codec;
mod error;
pub mod scalar;
pub mod tables;

pub use api::{add_vector, dot_product, dot_product_quantized, matmul, matmul_alloc};
#[cfg(feature = "parallel")]
pub use api::matmul_parallel;
pub use codec::{decode, encode};
pub use error::{Error, Result};
pub use scalar::{abs, add, compare, div, mul, neg, recip, sub, Posit8};
pub use tables::decode_table;
