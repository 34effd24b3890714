// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! Vectors of ring elements and the expanded public matrix A.

use zeroize::Zeroize;

use crate::poly::Poly;
use crate::params::{K, L};
use crate::sampling::poly_uniform;

/// A fixed-length vector of ring elements, lifted coefficient-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolyVec<const M: usize> {
    pub(crate) v: [Poly; M],
}

/// A vector of L polynomials (the s₁ / y / z side).
pub type VecL = PolyVec<L>;
/// A vector of K polynomials (the s₂ / w side).
pub type VecK = PolyVec<K>;

impl<const M: usize> Default for PolyVec<M> {
    fn default() -> Self {
        PolyVec {
            v: [Poly::zero(); M],
        }
    }
}

impl<const M: usize> Zeroize for PolyVec<M> {
    fn zeroize(&mut self) {
        for p in self.v.iter_mut() {
            p.zeroize();
        }
    }
}

impl<const M: usize> PolyVec<M> {
    pub(crate) fn zero() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, other: &Self) -> Self {
        let mut r = Self::zero();
        for i in 0..M {
            r.v[i] = self.v[i].add(&other.v[i]);
        }
        r
    }

    pub(crate) fn sub(&self, other: &Self) -> Self {
        let mut r = Self::zero();
        for i in 0..M {
            r.v[i] = self.v[i].sub(&other.v[i]);
        }
        r
    }

    pub(crate) fn ntt(&mut self) {
        for p in self.v.iter_mut() {
            p.ntt();
        }
    }

    pub(crate) fn inv_ntt(&mut self) {
        for p in self.v.iter_mut() {
            p.inv_ntt();
        }
    }

    pub(crate) fn mul_hat_poly(&self, c: &Poly) -> Self {
        let mut r = Self::zero();
        for i in 0..M {
            r.v[i] = self.v[i].mul_hat(c);
        }
        r
    }

    pub(crate) fn mul_by_2d(&self) -> Self {
        let mut r = Self::zero();
        for i in 0..M {
            r.v[i] = self.v[i].mul_by_2d();
        }
        r
    }

    pub(crate) fn exceeds(&self, bound: u32) -> bool {
        self.v.iter().any(|p| p.exceeds(bound))
    }

    pub(crate) fn decompose(&self) -> (Self, Self) {
        let mut lo = Self::zero();
        let mut hi = Self::zero();
        for i in 0..M {
            let (l, h) = self.v[i].decompose();
            lo.v[i] = l;
            hi.v[i] = h;
        }
        (lo, hi)
    }

    pub(crate) fn power2round(&self) -> (Self, Self) {
        let mut lo = Self::zero();
        let mut hi = Self::zero();
        for i in 0..M {
            let (l, h) = self.v[i].power2round();
            lo.v[i] = l;
            hi.v[i] = h;
        }
        (lo, hi)
    }

    /// MakeHint over (w₀ + f, w₁); returns the hint vector and its weight.
    pub(crate) fn make_hint(w0pf: &Self, w1: &Self) -> (Self, usize) {
        let mut hint = Self::zero();
        let mut weight = 0;
        for i in 0..M {
            let (h, w) = Poly::make_hint(&w0pf.v[i], &w1.v[i]);
            hint.v[i] = h;
            weight += w;
        }
        (hint, weight)
    }

    pub(crate) fn use_hint(&self, hint: &Self) -> Self {
        let mut r = Self::zero();
        for i in 0..M {
            r.v[i] = self.v[i].use_hint(&hint.v[i]);
        }
        r
    }
}

/// The K×L matrix A = ExpandA(ρ), held in the NTT domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mat {
    pub(crate) rows: [VecL; K],
}

impl Mat {
    /// Expands ρ into A with SHAKE-128, row by row (FIPS-204 ExpandA).
    pub(crate) fn derive(rho: &[u8; 32]) -> Mat {
        let mut rows = [VecL::zero(); K];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, p) in row.v.iter_mut().enumerate() {
                *p = poly_uniform(rho, ((i as u16) << 8) + j as u16);
            }
        }
        Mat { rows }
    }

    /// A·v̂ for v̂ in the NTT domain; the result stays in the NTT domain.
    pub(crate) fn mul_vec(&self, v: &VecL) -> VecK {
        let mut r = VecK::zero();
        for i in 0..K {
            let mut acc = Poly::zero();
            for j in 0..L {
                acc = acc.add(&self.rows[i].v[j].mul_hat(&v.v[j]));
            }
            r.v[i] = acc;
        }
        r
    }
}
