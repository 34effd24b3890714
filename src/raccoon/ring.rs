//! A negacyclic ring ℤ_q[X]/(Xⁿ+1) over a runtime modulus.
//!
//! Unlike the fixed ML-DSA ring, this ring is built at runtime from
//! (n, q): the 2n-th root of unity is found by search and the NTT tables
//! are derived from it, so any NTT-friendly prime works. Products use
//! 128-bit intermediates.

use crate::error::Error;

/// A polynomial over the runtime ring; representation (positional or
/// NTT) is a property of the surrounding code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingPoly {
    pub(crate) c: Vec<u64>,
}

/// A vector of ring polynomials.
pub type RingVec = Vec<RingPoly>;

/// The ring context: modulus, degree and NTT twiddle tables.
#[derive(Clone, Debug)]
pub struct Ring {
    n: usize,
    q: u64,
    /// ψ^brv(m) for m in 0..n, ψ a primitive 2n-th root of unity.
    zetas: Vec<u64>,
    n_inv: u64,
}

fn pow_mod(base: u64, mut exp: u64, q: u64) -> u64 {
    let mut acc: u128 = 1;
    let mut b = base as u128 % q as u128;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * b % q as u128;
        }
        b = b * b % q as u128;
        exp >>= 1;
    }
    acc as u64
}

impl Ring {
    /// Builds the ring for degree `n` (a power of two) and modulus `q`
    /// with q ≡ 1 mod 2n.
    pub fn new(n: usize, q: u64) -> Result<Ring, Error> {
        if !n.is_power_of_two() || (q - 1) % (2 * n as u64) != 0 {
            return Err(Error::InvalidParameters);
        }

        // ψ = g^((q−1)/2n) for the first g that yields ψⁿ = −1; such a ψ
        // has order exactly 2n.
        let mut psi = 0;
        for g in 2u64.. {
            let candidate = pow_mod(g, (q - 1) / (2 * n as u64), q);
            if pow_mod(candidate, n as u64, q) == q - 1 {
                psi = candidate;
                break;
            }
        }

        let log_n = n.trailing_zeros();
        let zetas = (0..n)
            .map(|m| {
                let rev = (m as u64).reverse_bits() >> (64 - log_n);
                pow_mod(psi, rev, q)
            })
            .collect();

        Ok(Ring {
            n,
            q,
            zetas,
            n_inv: pow_mod(n as u64, q - 2, q),
        })
    }

    /// The ring degree n.
    pub fn degree(&self) -> usize {
        self.n
    }

    /// The ring modulus q.
    pub fn modulus(&self) -> u64 {
        self.q
    }

    /// The all-zero polynomial.
    pub fn zero(&self) -> RingPoly {
        RingPoly {
            c: vec![0u64; self.n],
        }
    }

    #[inline]
    fn addm(&self, a: u64, b: u64) -> u64 {
        let s = a + b;
        if s >= self.q {
            s - self.q
        } else {
            s
        }
    }

    #[inline]
    fn subm(&self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            a + self.q - b
        }
    }

    #[inline]
    fn mulm(&self, a: u64, b: u64) -> u64 {
        (a as u128 * b as u128 % self.q as u128) as u64
    }

    pub(crate) fn add(&self, a: &RingPoly, b: &RingPoly) -> RingPoly {
        RingPoly {
            c: a.c
                .iter()
                .zip(b.c.iter())
                .map(|(&x, &y)| self.addm(x, y))
                .collect(),
        }
    }

    pub(crate) fn sub(&self, a: &RingPoly, b: &RingPoly) -> RingPoly {
        RingPoly {
            c: a.c
                .iter()
                .zip(b.c.iter())
                .map(|(&x, &y)| self.subm(x, y))
                .collect(),
        }
    }

    /// Pointwise product of NTT-domain polynomials.
    pub(crate) fn mul(&self, a: &RingPoly, b: &RingPoly) -> RingPoly {
        RingPoly {
            c: a.c
                .iter()
                .zip(b.c.iter())
                .map(|(&x, &y)| self.mulm(x, y))
                .collect(),
        }
    }

    /// In-place forward negacyclic NTT.
    pub(crate) fn ntt(&self, p: &mut RingPoly) {
        let mut m = 0usize;
        let mut len = self.n / 2;
        while len >= 1 {
            let mut start = 0;
            while start < self.n {
                m += 1;
                let z = self.zetas[m];
                for j in start..start + len {
                    let t = self.mulm(z, p.c[j + len]);
                    p.c[j + len] = self.subm(p.c[j], t);
                    p.c[j] = self.addm(p.c[j], t);
                }
                start += 2 * len;
            }
            len >>= 1;
        }
    }

    /// In-place inverse negacyclic NTT.
    pub(crate) fn inv_ntt(&self, p: &mut RingPoly) {
        let mut m = self.n;
        let mut len = 1;
        while len < self.n {
            let mut start = 0;
            while start < self.n {
                m -= 1;
                let z = self.q - self.zetas[m];
                for j in start..start + len {
                    let t = p.c[j];
                    p.c[j] = self.addm(t, p.c[j + len]);
                    p.c[j + len] = self.subm(t, p.c[j + len]);
                    p.c[j + len] = self.mulm(z, p.c[j + len]);
                }
                start += 2 * len;
            }
            len <<= 1;
        }
        for c in p.c.iter_mut() {
            *c = self.mulm(self.n_inv, *c);
        }
    }

    pub(crate) fn zero_vec(&self, dim: usize) -> RingVec {
        (0..dim).map(|_| self.zero()).collect()
    }

    pub(crate) fn vec_add(&self, a: &[RingPoly], b: &[RingPoly]) -> RingVec {
        a.iter().zip(b.iter()).map(|(x, y)| self.add(x, y)).collect()
    }

    pub(crate) fn vec_sub(&self, a: &[RingPoly], b: &[RingPoly]) -> RingVec {
        a.iter().zip(b.iter()).map(|(x, y)| self.sub(x, y)).collect()
    }

    pub(crate) fn vec_ntt(&self, v: &mut [RingPoly]) {
        for p in v.iter_mut() {
            self.ntt(p);
        }
    }

    pub(crate) fn vec_inv_ntt(&self, v: &mut [RingPoly]) {
        for p in v.iter_mut() {
            self.inv_ntt(p);
        }
    }

    /// Matrix–vector product, all operands in the NTT domain.
    pub(crate) fn mat_vec_mul(&self, mat: &[RingVec], v: &[RingPoly]) -> RingVec {
        mat.iter()
            .map(|row| {
                let mut acc = self.zero();
                for (a, x) in row.iter().zip(v.iter()) {
                    acc = self.add(&acc, &self.mul(a, x));
                }
                acc
            })
            .collect()
    }

    /// Scalar–vector product: c·v, all in the NTT domain.
    pub(crate) fn vec_mul_poly(&self, v: &[RingPoly], c: &RingPoly) -> RingVec {
        v.iter().map(|p| self.mul(p, c)).collect()
    }

    /// Drops the low `shift` bits of every coefficient, with rounding,
    /// into the small domain mod `q_small`.
    pub(crate) fn round_vec(&self, v: &[RingPoly], shift: u32, q_small: u64) -> RingVec {
        v.iter()
            .map(|p| RingPoly {
                c: p.c
                    .iter()
                    .map(|&c| ((c + (1 << (shift - 1))) >> shift) % q_small)
                    .collect(),
            })
            .collect()
    }

    /// Lifts small-domain coefficients back by `shift` bits.
    pub(crate) fn restore_vec(&self, v: &[RingPoly], shift: u32) -> RingVec {
        v.iter()
            .map(|p| RingPoly {
                c: p.c
                    .iter()
                    .map(|&c| (((c as u128) << shift) % self.q as u128) as u64)
                    .collect(),
            })
            .collect()
    }

    /// Coefficient-wise difference in the small domain mod `q_small`.
    pub(crate) fn small_vec_sub(&self, a: &[RingPoly], b: &[RingPoly], q_small: u64) -> RingVec {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| RingPoly {
                c: x.c
                    .iter()
                    .zip(y.c.iter())
                    .map(|(&p, &r)| (p + q_small - r) % q_small)
                    .collect(),
            })
            .collect()
    }

    /// Coefficient-wise sum in the small domain mod `q_small`.
    pub(crate) fn small_vec_add(&self, a: &[RingPoly], b: &[RingPoly], q_small: u64) -> RingVec {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| RingPoly {
                c: x.c
                    .iter()
                    .zip(y.c.iter())
                    .map(|(&p, &r)| (p + r) % q_small)
                    .collect(),
            })
            .collect()
    }
}

/// Serializes a vector of polynomials as little-endian u64 coefficients.
pub(crate) fn vec_to_bytes(v: &[RingPoly]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * v.first().map_or(0, |p| p.c.len()) * 8);
    for p in v {
        for &c in p.c.iter() {
            out.extend_from_slice(&c.to_le_bytes());
        }
    }
    out
}

/// Reads back a vector of `dim` polynomials of degree `n`.
pub(crate) fn vec_from_bytes(buf: &[u8], dim: usize, n: usize) -> Option<RingVec> {
    if buf.len() != dim * n * 8 {
        return None;
    }
    let mut v = Vec::with_capacity(dim);
    let mut off = 0;
    for _ in 0..dim {
        let mut c = Vec::with_capacity(n);
        for _ in 0..n {
            c.push(u64::from_le_bytes(buf[off..off + 8].try_into().ok()?));
            off += 8;
        }
        v.push(RingPoly { c });
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raccoon::params::{DEGREE, Q};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn random_poly(ring: &Ring, rng: &mut ChaChaRng) -> RingPoly {
        let mut p = ring.zero();
        for c in p.c.iter_mut() {
            *c = rng.gen_range(0..ring.modulus());
        }
        p
    }

    fn schoolbook_mul(ring: &Ring, a: &RingPoly, b: &RingPoly) -> RingPoly {
        let n = ring.degree();
        let q = ring.modulus() as i128;
        let mut acc = vec![0i128; n];
        for i in 0..n {
            for j in 0..n {
                let prod = a.c[i] as i128 * b.c[j] as i128 % q;
                if i + j < n {
                    acc[i + j] = (acc[i + j] + prod) % q;
                } else {
                    acc[i + j - n] = (acc[i + j - n] - prod).rem_euclid(q);
                }
            }
        }
        RingPoly {
            c: acc.into_iter().map(|c| c as u64).collect(),
        }
    }

    #[test]
    fn rejects_unfriendly_parameters() {
        assert!(Ring::new(255, Q).is_err());
        assert!(Ring::new(256, 12289).is_ok()); // another NTT prime
        assert!(Ring::new(256, Q).is_ok());
    }

    #[test]
    fn ntt_round_trips() {
        let ring = Ring::new(DEGREE, Q).unwrap();
        let mut rng = ChaChaRng::seed_from_u64(21);
        let p = random_poly(&ring, &mut rng);
        let mut r = p.clone();
        ring.ntt(&mut r);
        ring.inv_ntt(&mut r);
        assert_eq!(p, r);
    }

    #[test]
    fn ntt_multiplication_matches_schoolbook() {
        let ring = Ring::new(DEGREE, Q).unwrap();
        let mut rng = ChaChaRng::seed_from_u64(22);
        let a = random_poly(&ring, &mut rng);
        let b = random_poly(&ring, &mut rng);

        let mut ah = a.clone();
        let mut bh = b.clone();
        ring.ntt(&mut ah);
        ring.ntt(&mut bh);
        let mut prod = ring.mul(&ah, &bh);
        ring.inv_ntt(&mut prod);

        assert_eq!(prod, schoolbook_mul(&ring, &a, &b));
    }

    #[test]
    fn serialization_round_trips() {
        let ring = Ring::new(DEGREE, Q).unwrap();
        let mut rng = ChaChaRng::seed_from_u64(23);
        let v = vec![random_poly(&ring, &mut rng), random_poly(&ring, &mut rng)];
        let bytes = vec_to_bytes(&v);
        assert_eq!(vec_from_bytes(&bytes, 2, DEGREE).unwrap(), v);
    }
}
