//! Bit-exact polynomial encodings.
//!
//! All fixed-width encodings are little-endian bit streams as in FIPS-204:
//! coefficient 0 occupies the lowest bits of the first bytes. The hint
//! encoding is the FIPS-204 run-length form, ω index bytes followed by K
//! cumulative counts.

use crate::params::{
    ETA, GAMMA1, HINT_SIZE, K, N, OMEGA, POLY_LEQ_ETA_SIZE, POLY_LE_GAMMA1_SIZE, POLY_Q_SIZE,
    POLY_T1_SIZE, POLY_W1_SIZE, Q,
};
use crate::poly::Poly;
use crate::vec::{PolyVec, VecK, VecL};

/// Packs the coefficients of `p`, mapped by `map`, at `bits` bits each.
fn pack_bits(p: &Poly, bits: usize, map: impl Fn(u32) -> u32, buf: &mut [u8]) {
    debug_assert_eq!(buf.len(), N * bits / 8);
    let mask = (1u64 << bits) - 1;
    let mut acc: u64 = 0;
    let mut nbits = 0;
    let mut off = 0;
    for &c in p.c.iter() {
        acc |= (map(c) as u64 & mask) << nbits;
        nbits += bits;
        while nbits >= 8 {
            buf[off] = acc as u8;
            acc >>= 8;
            nbits -= 8;
            off += 1;
        }
    }
}

/// Reads `bits`-bit values from `buf` and maps them back to coefficients.
fn unpack_bits(buf: &[u8], bits: usize, map: impl Fn(u32) -> u32) -> Poly {
    debug_assert_eq!(buf.len(), N * bits / 8);
    let mask = (1u64 << bits) - 1;
    let mut p = Poly::zero();
    let mut acc: u64 = 0;
    let mut nbits = 0;
    let mut off = 0;
    for c in p.c.iter_mut() {
        while nbits < bits {
            acc |= (buf[off] as u64) << nbits;
            nbits += 8;
            off += 1;
        }
        *c = map((acc & mask) as u32);
        acc >>= bits;
        nbits -= bits;
    }
    p
}

/// Packs a polynomial of norm ≤ η (3 bits per coefficient, value η − c).
pub(crate) fn pack_leq_eta(p: &Poly, buf: &mut [u8]) {
    pack_bits(p, 3, |c| if c <= ETA { ETA - c } else { ETA + Q - c }, buf)
}

pub(crate) fn unpack_leq_eta(buf: &[u8]) -> Poly {
    unpack_bits(buf, 3, |t| if t <= ETA { ETA - t } else { Q + ETA - t })
}

/// Packs a polynomial of norm < γ₁ (18 bits per coefficient, value γ₁ − c).
pub(crate) fn pack_le_gamma1(p: &Poly, buf: &mut [u8]) {
    pack_bits(
        p,
        18,
        |c| if c <= GAMMA1 { GAMMA1 - c } else { GAMMA1 + Q - c },
        buf,
    )
}

pub(crate) fn unpack_le_gamma1(buf: &[u8]) -> Poly {
    unpack_bits(
        buf,
        18,
        |t| if t <= GAMMA1 { GAMMA1 - t } else { Q + GAMMA1 - t },
    )
}

/// Packs a t₁ polynomial (10 bits per coefficient).
pub(crate) fn pack_t1(p: &Poly, buf: &mut [u8]) {
    pack_bits(p, 10, |c| c, buf)
}

pub(crate) fn unpack_t1(buf: &[u8]) -> Poly {
    unpack_bits(buf, 10, |t| t)
}

/// Packs a w₁ polynomial (6 bits per coefficient, values in [0, 44)).
pub(crate) fn pack_w1(p: &Poly, buf: &mut [u8]) {
    pack_bits(p, 6, |c| c, buf)
}

/// Packs a full-range commitment polynomial (23 bits per coefficient).
pub(crate) fn pack_q(p: &Poly, buf: &mut [u8]) {
    pack_bits(p, 23, |c| c, buf)
}

pub(crate) fn unpack_q(buf: &[u8]) -> Poly {
    unpack_bits(buf, 23, |t| t)
}

pub(crate) fn pack_vec_leq_eta<const M: usize>(v: &PolyVec<M>, buf: &mut [u8]) {
    for (i, p) in v.v.iter().enumerate() {
        pack_leq_eta(p, &mut buf[i * POLY_LEQ_ETA_SIZE..(i + 1) * POLY_LEQ_ETA_SIZE]);
    }
}

pub(crate) fn unpack_vec_leq_eta<const M: usize>(buf: &[u8]) -> PolyVec<M> {
    let mut v = PolyVec::<M>::zero();
    for (i, p) in v.v.iter_mut().enumerate() {
        *p = unpack_leq_eta(&buf[i * POLY_LEQ_ETA_SIZE..(i + 1) * POLY_LEQ_ETA_SIZE]);
    }
    v
}

pub(crate) fn pack_vec_le_gamma1(v: &VecL, buf: &mut [u8]) {
    for (i, p) in v.v.iter().enumerate() {
        pack_le_gamma1(p, &mut buf[i * POLY_LE_GAMMA1_SIZE..(i + 1) * POLY_LE_GAMMA1_SIZE]);
    }
}

pub(crate) fn unpack_vec_le_gamma1(buf: &[u8]) -> VecL {
    let mut v = VecL::zero();
    for (i, p) in v.v.iter_mut().enumerate() {
        *p = unpack_le_gamma1(&buf[i * POLY_LE_GAMMA1_SIZE..(i + 1) * POLY_LE_GAMMA1_SIZE]);
    }
    v
}

pub(crate) fn pack_vec_t1(v: &VecK, buf: &mut [u8]) {
    for (i, p) in v.v.iter().enumerate() {
        pack_t1(p, &mut buf[i * POLY_T1_SIZE..(i + 1) * POLY_T1_SIZE]);
    }
}

pub(crate) fn unpack_vec_t1(buf: &[u8]) -> VecK {
    let mut v = VecK::zero();
    for (i, p) in v.v.iter_mut().enumerate() {
        *p = unpack_t1(&buf[i * POLY_T1_SIZE..(i + 1) * POLY_T1_SIZE]);
    }
    v
}

pub(crate) fn pack_vec_w1(v: &VecK, buf: &mut [u8]) {
    for (i, p) in v.v.iter().enumerate() {
        pack_w1(p, &mut buf[i * POLY_W1_SIZE..(i + 1) * POLY_W1_SIZE]);
    }
}

pub(crate) fn pack_vec_q(v: &VecK, buf: &mut [u8]) {
    for (i, p) in v.v.iter().enumerate() {
        pack_q(p, &mut buf[i * POLY_Q_SIZE..(i + 1) * POLY_Q_SIZE]);
    }
}

pub(crate) fn unpack_vec_q(buf: &[u8]) -> VecK {
    let mut v = VecK::zero();
    for (i, p) in v.v.iter_mut().enumerate() {
        *p = unpack_q(&buf[i * POLY_Q_SIZE..(i + 1) * POLY_Q_SIZE]);
    }
    v
}

/// Packs a hint vector: indices of set bits, then K cumulative counts.
///
/// The caller must have checked that the weight is at most ω.
pub(crate) fn pack_hint(hint: &VecK, buf: &mut [u8]) {
    debug_assert_eq!(buf.len(), HINT_SIZE);
    buf.fill(0);
    let mut off = 0;
    for i in 0..K {
        for j in 0..N {
            if hint.v[i].c[j] != 0 {
                buf[off] = j as u8;
                off += 1;
            }
        }
        buf[OMEGA + i] = off as u8;
    }
}

/// Decodes a hint vector, rejecting any non-canonical encoding.
pub(crate) fn unpack_hint(buf: &[u8]) -> Option<VecK> {
    debug_assert_eq!(buf.len(), HINT_SIZE);
    let mut hint = VecK::zero();
    let mut prev = 0usize;
    for i in 0..K {
        let cur = buf[OMEGA + i] as usize;
        if cur < prev || cur > OMEGA {
            return None;
        }
        for j in prev..cur {
            // Indices within one polynomial must be strictly increasing.
            if j > prev && buf[j] <= buf[j - 1] {
                return None;
            }
            hint.v[i].c[buf[j] as usize] = 1;
        }
        prev = cur;
    }
    for b in buf.iter().take(OMEGA).skip(prev) {
        if *b != 0 {
            return None;
        }
    }
    Some(hint)
}
