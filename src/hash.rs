//! Feature hashing compatible with Vowpal Wabbit.
//!
//! VW addresses its weight table with a 32-bit MurmurHash3 (x86, 32-bit
//! variant) over namespace and feature names, and combines two feature hashes
//! for quadratic interactions with a single FNV-style multiply/xor. Every bucket
//! this crate computes goes through the functions here, so they must agree with
//! the upstream implementation bit for bit.
//!
//! # Example
//!
//! ```
//! use vw_slim::hash::{hash32, interaction_hash};
//!
//! let ns = hash32(b"user", 0);
//! let a = hash32(b"age=30", ns);
//! let b = hash32(b"country=nl", ns);
//! let _quadratic = interaction_hash(a, b);
//! ```

// =============================================================================
// Constants
// =============================================================================

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const BLOCK_MIX: u32 = 0xe654_6b64;
const FMIX1: u32 = 0x85eb_ca6b;
const FMIX2: u32 = 0xc2b2_ae35;

/// Multiplier used to combine two feature hashes into an interaction hash.
pub const FNV_PRIME: i32 = 16_777_619;

/// Hash of the implicit bias feature ("Constant") in VW.
pub const INTERCEPT_HASH: i32 = 11_650_396;

// =============================================================================
// Hash functions
// =============================================================================

#[inline]
fn fmix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(FMIX1);
    h ^= h >> 13;
    h = h.wrapping_mul(FMIX2);
    h ^= h >> 16;
    h
}

#[inline]
fn mix_k1(k1: u32) -> u32 {
    k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

/// MurmurHash3 x86/32 over `data`, as used by VW's `uniform_hash`.
///
/// Input bytes are read as unsigned little-endian words; all arithmetic wraps
/// at 32 bits. The seed and the result are reinterpreted as `i32` because the
/// hashes are added to and multiplied with signed integer ids downstream.
pub fn hash32(data: &[u8], seed: i32) -> i32 {
    let mut h1 = seed as u32;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(BLOCK_MIX);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k1 = tail
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &byte)| acc ^ ((byte as u32) << (8 * i)));
        h1 ^= mix_k1(k1);
    }

    h1 ^= data.len() as u32;
    fmix(h1) as i32
}

/// Convenience wrapper hashing the UTF-8 bytes of `s`.
#[inline]
pub fn hash_str(s: &str, seed: i32) -> i32 {
    hash32(s.as_bytes(), seed)
}

/// Combined identity of a quadratic feature pair.
///
/// Not a Murmur hash: VW multiplies the left hash by the FNV prime and xors the
/// right hash in, with no modulo before bucket addressing.
#[inline]
pub fn interaction_hash(left: i32, right: i32) -> i32 {
    left.wrapping_mul(FNV_PRIME) ^ right
}

// =============================================================================
// Tests
// =============================================================================
