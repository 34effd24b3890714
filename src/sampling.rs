// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! Rejection samplers over SHAKE output streams.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

use crate::fvec::{FVec, FVEC_DIM};
use crate::params::{ETA, L, N, Q, TAU};
use crate::poly::Poly;

/// Samples a uniform NTT-domain polynomial from SHAKE-128(ρ ‖ nonce),
/// rejecting 23-bit candidates outside [0, q). The low nonce byte is the
/// column index, the high byte the row, per FIPS-204 ExpandA.
pub(crate) fn poly_uniform(rho: &[u8; 32], nonce: u16) -> Poly {
    let mut h = Shake128::default();
    h.update(rho);
    h.update(&nonce.to_le_bytes());
    let mut xof = h.finalize_xof();

    let mut p = Poly::zero();
    let mut buf = [0u8; 3];
    let mut i = 0;
    while i < N {
        xof.read(&mut buf);
        let t = (buf[0] as u32) | (buf[1] as u32) << 8 | (buf[2] as u32) << 16;
        let t = t & 0x7FFFFF;
        if t < Q {
            p.c[i] = t;
            i += 1;
        }
    }
    p
}

/// Samples a polynomial with coefficients in [−η, η] from
/// SHAKE-256(seed ‖ nonce), one 4-bit nibble per candidate, rejecting 15.
pub(crate) fn poly_uniform_leq_eta(seed: &[u8; 64], nonce: u16) -> Poly {
    let mut h = Shake256::default();
    h.update(seed);
    h.update(&nonce.to_le_bytes());
    let mut xof = h.finalize_xof();

    let mut p = Poly::zero();
    let mut buf = [0u8; 1];
    let mut i = 0;
    while i < N {
        xof.read(&mut buf);
        for t in [buf[0] as u32 & 15, buf[0] as u32 >> 4] {
            if t < 15 && i < N {
                // η − (t mod 5) ∈ {−2..2}, stored normalized.
                let c = ETA as i32 - (t % 5) as i32;
                p.c[i] = c.rem_euclid(Q as i32) as u32;
                i += 1;
            }
        }
    }
    p
}

/// Expands c̃ into the τ-sparse ±1 challenge polynomial
/// (FIPS-204 SampleInBall).
pub(crate) fn poly_challenge(c_tilde: &[u8; 32]) -> Poly {
    let mut h = Shake256::default();
    h.update(c_tilde);
    let mut xof = h.finalize_xof();

    let mut sign_bytes = [0u8; 8];
    xof.read(&mut sign_bytes);
    let mut signs = u64::from_le_bytes(sign_bytes);

    let mut p = Poly::zero();
    let mut buf = [0u8; 1];
    for i in N - TAU..N {
        let j = loop {
            xof.read(&mut buf);
            if buf[0] as usize <= i {
                break buf[0] as usize;
            }
        };
        p.c[i] = p.c[j];
        p.c[j] = if signs & 1 == 1 { Q - 1 } else { 1 };
        signs >>= 1;
    }
    p
}

/// A uniform draw from (0, 1] with 53 bits of precision.
fn unit_uniform(xof: &mut impl XofReader) -> f64 {
    let mut buf = [0u8; 8];
    xof.read(&mut buf);
    ((u64::from_le_bytes(buf) >> 11) + 1) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Samples the joint (r*, e) mask: approximately uniform in the
/// (L+K)·n-dimensional ball of the given radius, with the y-block scaled
/// by ν. Box–Muller Gaussians are projected onto the ball by the radial
/// factor u^(1/dim), so [`FVec::excess`] with the same ν measures exactly
/// the sampled ellipsoid.
pub(crate) fn sample_hyperball(radius: f64, nu: f64, rhop: &[u8; 64], nonce: u16) -> FVec {
    let mut h = Shake256::default();
    h.update(rhop);
    h.update(&nonce.to_le_bytes());
    let mut xof = h.finalize_xof();

    let mut v = FVec::zero();
    let mut i = 0;
    while i < FVEC_DIM {
        let u1 = unit_uniform(&mut xof);
        let u2 = unit_uniform(&mut xof);
        let mag = (-2.0 * u1.ln()).sqrt();
        let (sin, cos) = (std::f64::consts::TAU * u2).sin_cos();
        v.c[i] = mag * cos;
        v.c[i + 1] = mag * sin;
        i += 2;
    }

    let norm = v.c.iter().map(|x| x * x).sum::<f64>().sqrt();
    let radial = radius * unit_uniform(&mut xof).powf(1.0 / FVEC_DIM as f64);
    for (i, x) in v.c.iter_mut().enumerate() {
        *x *= radial / norm;
        if i < L * N {
            *x *= nu;
        }
    }
    v
}
