// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! Arithmetic in R_q = ℤ_q[X]/(Xⁿ+1) for q = 8380417, n = 256.
//!
//! A [`Poly`] holds coefficients normalized in [0, q), in either the
//! positional or the NTT representation; which one is in effect is a
//! property of the surrounding code, as in FIPS-204 itself. The NTT uses
//! ζ = 1753, the standard 512-th root of unity, with the twiddle table
//! derived at first use in bit-reversed order.

use once_cell::sync::Lazy;
use zeroize::Zeroize;

use crate::params::{ALPHA, D, GAMMA2, N, Q};

/// ζ, a primitive 512-th root of unity mod q.
const ZETA: u64 = 1753;
/// 256⁻¹ mod q, the InvNTT scaling factor.
const INV_256: u32 = 8_347_681;

/// ζ^brv₈(m) mod q for m in 0..256.
static ZETAS: Lazy<[u32; N]> = Lazy::new(|| {
    let mut zetas = [0u32; N];
    for (m, z) in zetas.iter_mut().enumerate() {
        *z = pow_mod(ZETA, (m as u8).reverse_bits() as u64);
    }
    zetas
});

fn pow_mod(base: u64, mut exp: u64) -> u32 {
    let mut acc: u64 = 1;
    let mut base = base % Q as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * base % Q as u64;
        }
        base = base * base % Q as u64;
        exp >>= 1;
    }
    acc as u32
}

#[inline(always)]
pub(crate) fn add_q(a: u32, b: u32) -> u32 {
    let s = a + b;
    if s >= Q {
        s - Q
    } else {
        s
    }
}

#[inline(always)]
pub(crate) fn sub_q(a: u32, b: u32) -> u32 {
    if a >= b {
        a - b
    } else {
        a + Q - b
    }
}

#[inline(always)]
pub(crate) fn mul_q(a: u32, b: u32) -> u32 {
    (a as u64 * b as u64 % Q as u64) as u32
}

/// An element of R_q with coefficients in [0, q).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct Poly {
    pub(crate) c: [u32; N],
}

impl Default for Poly {
    fn default() -> Self {
        Poly { c: [0u32; N] }
    }
}

impl Poly {
    pub(crate) fn zero() -> Self {
        Poly::default()
    }

    pub(crate) fn add(&self, other: &Poly) -> Poly {
        let mut r = Poly::zero();
        for i in 0..N {
            r.c[i] = add_q(self.c[i], other.c[i]);
        }
        r
    }

    pub(crate) fn sub(&self, other: &Poly) -> Poly {
        let mut r = Poly::zero();
        for i in 0..N {
            r.c[i] = sub_q(self.c[i], other.c[i]);
        }
        r
    }

    /// In-place forward NTT (FIPS-204 Algorithm 41).
    pub(crate) fn ntt(&mut self) {
        let mut m = 0usize;
        let mut len = N / 2;
        while len >= 1 {
            let mut start = 0;
            while start < N {
                m += 1;
                let z = ZETAS[m];
                for j in start..start + len {
                    let t = mul_q(z, self.c[j + len]);
                    self.c[j + len] = sub_q(self.c[j], t);
                    self.c[j] = add_q(self.c[j], t);
                }
                start += 2 * len;
            }
            len >>= 1;
        }
    }

    /// In-place inverse NTT (FIPS-204 Algorithm 42).
    pub(crate) fn inv_ntt(&mut self) {
        let mut m = N;
        let mut len = 1;
        while len < N {
            let mut start = 0;
            while start < N {
                m -= 1;
                let z = Q - ZETAS[m];
                for j in start..start + len {
                    let t = self.c[j];
                    self.c[j] = add_q(t, self.c[j + len]);
                    self.c[j + len] = sub_q(t, self.c[j + len]);
                    self.c[j + len] = mul_q(z, self.c[j + len]);
                }
                start += 2 * len;
            }
            len <<= 1;
        }
        for c in self.c.iter_mut() {
            *c = mul_q(INV_256, *c);
        }
    }

    /// Pointwise product; both operands must be in the NTT domain.
    pub(crate) fn mul_hat(&self, other: &Poly) -> Poly {
        let mut r = Poly::zero();
        for i in 0..N {
            r.c[i] = mul_q(self.c[i], other.c[i]);
        }
        r
    }

    /// Multiplies every coefficient by 2^d mod q.
    pub(crate) fn mul_by_2d(&self) -> Poly {
        let mut r = Poly::zero();
        for i in 0..N {
            r.c[i] = mul_q(self.c[i], 1 << D);
        }
        r
    }

    /// Whether the centered ℓ∞ norm reaches `bound`.
    pub(crate) fn exceeds(&self, bound: u32) -> bool {
        self.c.iter().any(|&c| {
            let centered = if c > (Q - 1) / 2 { Q - c } else { c };
            centered >= bound
        })
    }

    /// Splits t into (t₀, t₁) with t = t₁·2^d + t₀ and t₀ ∈ (−2^(d−1), 2^(d−1)].
    ///
    /// t₀ is returned normalized into [0, q).
    pub(crate) fn power2round(&self) -> (Poly, Poly) {
        let mut t0 = Poly::zero();
        let mut t1 = Poly::zero();
        for i in 0..N {
            let r = self.c[i] as i32;
            let mut r0 = r & ((1 << D) - 1);
            if r0 > 1 << (D - 1) {
                r0 -= 1 << D;
            }
            t1.c[i] = ((r - r0) >> D) as u32;
            t0.c[i] = if r0 < 0 { (r0 + Q as i32) as u32 } else { r0 as u32 };
        }
        (t0, t1)
    }

    /// Splits w into (w₀, w₁) with w = w₁·α + w₀ and w₀ ∈ (−α/2, α/2].
    ///
    /// w₀ is returned normalized into [0, q).
    pub(crate) fn decompose(&self) -> (Poly, Poly) {
        let mut w0 = Poly::zero();
        let mut w1 = Poly::zero();
        for i in 0..N {
            let (r0, r1) = decompose_coeff(self.c[i]);
            w0.c[i] = if r0 < 0 { (r0 + Q as i32) as u32 } else { r0 as u32 };
            w1.c[i] = r1;
        }
        (w0, w1)
    }

    /// MakeHint over (w₀ + f, w₁); returns the hint and its weight.
    pub(crate) fn make_hint(w0pf: &Poly, w1: &Poly) -> (Poly, usize) {
        let mut hint = Poly::zero();
        let mut weight = 0;
        for i in 0..N {
            hint.c[i] = make_hint_coeff(w0pf.c[i], w1.c[i]);
            weight += hint.c[i] as usize;
        }
        (hint, weight)
    }

    /// Recovers w₁ from w + f given the hint.
    pub(crate) fn use_hint(&self, hint: &Poly) -> Poly {
        let mut w1 = Poly::zero();
        for i in 0..N {
            w1.c[i] = use_hint_coeff(self.c[i], hint.c[i]);
        }
        w1
    }
}

/// FIPS-204 Algorithm 36: r ↦ (r₀, r₁) with r = r₁·α + r₀ mod q,
/// r₀ ∈ (−α/2, α/2], and the wrap at q − 1 folded into r₁ = 0.
#[inline]
pub(crate) fn decompose_coeff(r: u32) -> (i32, u32) {
    let r = r as i32;
    let alpha = ALPHA as i32;
    let mut r0 = r % alpha;
    if r0 > alpha / 2 {
        r0 -= alpha;
    }
    if r - r0 == Q as i32 - 1 {
        (r0 - 1, 0)
    } else {
        (r0, ((r - r0) / alpha) as u32)
    }
}

/// Hint bit for a low part a₀ (normalized in [0, q)) and high part a₁.
#[inline]
fn make_hint_coeff(a0: u32, a1: u32) -> u32 {
    if a0 <= GAMMA2 || a0 > Q - GAMMA2 || (a0 == Q - GAMMA2 && a1 == 0) {
        0
    } else {
        1
    }
}

/// High bits of r, adjusted by the hint bit.
#[inline]
fn use_hint_coeff(r: u32, hint: u32) -> u32 {
    let (r0, r1) = decompose_coeff(r);
    if hint == 0 {
        return r1;
    }
    // (q-1)/α = 44, so the high bits live in ℤ/44.
    if r0 > 0 {
        if r1 == 43 {
            0
        } else {
            r1 + 1
        }
    } else if r1 == 0 {
        43
    } else {
        r1 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn random_poly(rng: &mut ChaChaRng) -> Poly {
        let mut p = Poly::zero();
        for c in p.c.iter_mut() {
            *c = rng.gen_range(0..Q);
        }
        p
    }

    /// Negacyclic schoolbook product, the reference for the NTT path.
    fn schoolbook_mul(a: &Poly, b: &Poly) -> Poly {
        let mut acc = [0i64; N];
        for i in 0..N {
            for j in 0..N {
                let prod = (a.c[i] as u64 * b.c[j] as u64 % Q as u64) as i64;
                if i + j < N {
                    acc[i + j] = (acc[i + j] + prod) % Q as i64;
                } else {
                    acc[i + j - N] = (acc[i + j - N] - prod).rem_euclid(Q as i64);
                }
            }
        }
        let mut r = Poly::zero();
        for i in 0..N {
            r.c[i] = acc[i] as u32;
        }
        r
    }

    #[test]
    fn zeta_table_has_order_512() {
        // ζ^256 = −1 mod q.
        assert_eq!(pow_mod(ZETA, 256), Q - 1);
        assert_eq!(pow_mod(ZETA, 512), 1);
        assert_eq!(mul_q(INV_256, 256), 1);
    }

    #[test]
    fn ntt_round_trips() {
        let mut rng = ChaChaRng::seed_from_u64(1);
        for _ in 0..8 {
            let p = random_poly(&mut rng);
            let mut q = p;
            q.ntt();
            q.inv_ntt();
            assert_eq!(p, q);
        }
    }

    #[test]
    fn ntt_multiplication_matches_schoolbook() {
        let mut rng = ChaChaRng::seed_from_u64(2);
        for _ in 0..4 {
            let a = random_poly(&mut rng);
            let b = random_poly(&mut rng);

            let mut ah = a;
            let mut bh = b;
            ah.ntt();
            bh.ntt();
            let mut prod = ah.mul_hat(&bh);
            prod.inv_ntt();

            assert_eq!(prod, schoolbook_mul(&a, &b));
        }
    }

    #[test]
    fn power2round_recomposes() {
        let mut rng = ChaChaRng::seed_from_u64(3);
        let p = random_poly(&mut rng);
        let (t0, t1) = p.power2round();
        for i in 0..N {
            let r0 = if t0.c[i] > Q / 2 {
                t0.c[i] as i64 - Q as i64
            } else {
                t0.c[i] as i64
            };
            assert!(r0 > -(1 << (D - 1)) && r0 <= 1 << (D - 1));
            let recomposed = (t1.c[i] as i64 * (1 << D) + r0).rem_euclid(Q as i64);
            assert_eq!(recomposed as u32, p.c[i]);
            assert!(t1.c[i] < 1 << (23 - D));
        }
    }

    #[test]
    fn decompose_recomposes() {
        for r in (0..Q).step_by(997).chain([0, 1, Q - 1, Q - 2, GAMMA2, Q - GAMMA2]) {
            let (r0, r1) = decompose_coeff(r);
            assert!(r1 < 44);
            assert!(r0 > -(ALPHA as i32 / 2) - 1 && r0 <= ALPHA as i32 / 2);
            let recomposed = (r1 as i64 * ALPHA as i64 + r0 as i64).rem_euclid(Q as i64);
            assert_eq!(recomposed as u32, r);
        }
    }

    #[test]
    fn hints_recover_high_bits() {
        // use_hint(w + f, make_hint(w0 + f, w1)) == w1 for ‖f‖∞ < γ₂.
        let mut rng = ChaChaRng::seed_from_u64(5);
        for _ in 0..2000 {
            let w: u32 = rng.gen_range(0..Q);
            let f_signed: i32 = rng.gen_range(-(GAMMA2 as i32 - 1)..GAMMA2 as i32);
            let f = f_signed.rem_euclid(Q as i32) as u32;

            let (w0, w1) = decompose_coeff(w);
            let w0n = if w0 < 0 { (w0 + Q as i32) as u32 } else { w0 as u32 };
            let w0pf = add_q(w0n, f);
            let h = make_hint_coeff(w0pf, w1);
            let recovered = use_hint_coeff(add_q(w, f), h);
            assert_eq!(recovered, w1, "w={} f={}", w, f_signed);
        }
    }

    #[test]
    fn exceeds_uses_centered_norm() {
        let mut p = Poly::zero();
        assert!(!p.exceeds(1));
        p.c[0] = Q - 5;
        assert!(!p.exceeds(6));
        assert!(p.exceeds(5));
        p.c[0] = 5;
        assert!(!p.exceeds(6));
        assert!(p.exceeds(5));
    }
}
