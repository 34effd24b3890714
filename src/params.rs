// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! ML-DSA-44 constants and the per-(T, N) threshold parameter registry.

use crate::error::Error;

/// The prime modulus q of the ring ℤ_q[X]/(Xⁿ+1).
pub const Q: u32 = 8_380_417;
/// Number of bits needed to represent a coefficient in [0, q).
pub const Q_BITS: usize = 23;
/// Degree of the ring polynomials.
pub const N: usize = 256;
/// Height of the public matrix A.
pub const K: usize = 4;
/// Width of the public matrix A.
pub const L: usize = 4;
/// Infinity-norm bound on secret key coefficients.
pub const ETA: u32 = 2;
/// Number of ±1 coefficients in a challenge polynomial.
pub const TAU: usize = 39;
/// log₂ γ₁.
pub const GAMMA1_BITS: usize = 17;
/// Range bound of the signing mask.
pub const GAMMA1: u32 = 1 << GAMMA1_BITS;
/// Low-bits rounding range, (q − 1)/88.
pub const GAMMA2: u32 = (Q - 1) / 88;
/// α = 2γ₂, the decompose divisor.
pub const ALPHA: u32 = 2 * GAMMA2;
/// Maximum weight of the hint vector.
pub const OMEGA: usize = 80;
/// Number of bits dropped from t by Power2Round.
pub const D: usize = 13;
/// β = τ·η, the maximum size of c·s₂.
pub const BETA: u32 = TAU as u32 * ETA;

/// Size of a key-generation seed.
pub const SEED_SIZE: usize = 32;
/// Size of the challenge hash c̃.
pub const C_TILDE_SIZE: usize = 32;
/// Size of the public-key digest Tr.
pub const TR_SIZE: usize = 64;

/// Size of a packed polynomial of norm ≤ η.
pub const POLY_LEQ_ETA_SIZE: usize = N * 3 / 8;
/// Size of a packed polynomial of norm < γ₁, such as z.
pub const POLY_LE_GAMMA1_SIZE: usize = (GAMMA1_BITS + 1) * N / 8;
/// Size of a packed t₁ polynomial.
pub const POLY_T1_SIZE: usize = N * 10 / 8;
/// Size of a packed w₁ polynomial.
pub const POLY_W1_SIZE: usize = N * (Q_BITS - GAMMA1_BITS) / 8;
/// Size of a polynomial packed over the full coefficient range [0, q).
pub const POLY_Q_SIZE: usize = N * Q_BITS / 8;
/// Size of a packed hint vector.
pub const HINT_SIZE: usize = OMEGA + K;

/// Size of a packed public key.
pub const PUBLIC_KEY_SIZE: usize = 32 + K * POLY_T1_SIZE;
/// Size of a packed signature.
pub const SIGNATURE_SIZE: usize = C_TILDE_SIZE + L * POLY_LE_GAMMA1_SIZE + HINT_SIZE;
/// Size of one packed commitment vector (one protocol iteration).
pub const SINGLE_COMMITMENT_SIZE: usize = K * POLY_Q_SIZE;
/// Size of one packed response vector (one protocol iteration).
pub const SINGLE_RESPONSE_SIZE: usize = L * POLY_LE_GAMMA1_SIZE;

/// Parameters of one registered threshold configuration.
///
/// Emitted by [`ThresholdParams::new`] for the supported range
/// 2 ≤ T ≤ N ≤ 6; immutable afterwards. κ is the number of protocol
/// iterations run in parallel inside one signing attempt, and (r, r′, ν)
/// are the hyperball radii and anisotropy used by the mask sampler and
/// the rejection gate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdParams {
    t: u8,
    n: u8,
    kappa: u16,
    nu: f64,
    r: f64,
    r_prime: f64,
}

impl ThresholdParams {
    /// Looks up the recommended parameters for a T-of-N configuration.
    ///
    /// Returns [`Error::InvalidParameters`] for T < 2, T > N or N > 6.
    pub fn new(t: u8, n: u8) -> Result<Self, Error> {
        if t < 2 || t > n || n > 6 {
            return Err(Error::InvalidParameters);
        }

        let i = (t - 2) as usize;
        let (kappa, r, r_prime) = match n {
            2 => (2, 252778.0, 252833.0),
            3 => {
                let ks = [3u16, 4];
                let rs = [310060.0, 246490.0];
                let rps = [310138.0, 246546.0];
                (ks[i], rs[i], rps[i])
            }
            4 => {
                let ks = [3u16, 7, 8];
                let rs = [305919.0, 279235.0, 243463.0];
                let rps = [305997.0, 279314.0, 243519.0];
                (ks[i], rs[i], rps[i])
            }
            5 => {
                let ks = [3u16, 14, 30, 16];
                let rs = [285363.0, 282800.0, 259427.0, 239924.0];
                let rps = [285459.0, 282912.0, 259526.0, 239981.0];
                (ks[i], rs[i], rps[i])
            }
            6 => {
                let ks = [4u16, 19, 74, 100, 37];
                let rs = [300265.0, 277014.0, 268705.0, 250590.0, 219245.0];
                let rps = [300362.0, 277139.0, 268831.0, 250686.0, 219301.0];
                (ks[i], rs[i], rps[i])
            }
            _ => unreachable!(),
        };

        Ok(ThresholdParams {
            t,
            n,
            kappa,
            nu: 3.0,
            r,
            r_prime,
        })
    }

    /// The degenerate single-party parameter set.
    ///
    /// With these parameters the protocol collapses to plain ML-DSA-44:
    /// one party, one iteration per attempt, isotropic mask.
    pub fn single() -> Self {
        ThresholdParams {
            t: 1,
            n: 1,
            kappa: 1,
            nu: 1.0,
            r: 221116.151669661,
            r_prime: 221041.3274003604,
        }
    }

    /// The signing threshold T.
    pub fn t(&self) -> u8 {
        self.t
    }

    /// The total number of parties N.
    pub fn n(&self) -> u8 {
        self.n
    }

    /// The number of parallel iterations per signing attempt.
    pub fn kappa(&self) -> u16 {
        self.kappa
    }

    pub(crate) fn nu(&self) -> f64 {
        self.nu
    }

    pub(crate) fn r(&self) -> f64 {
        self.r
    }

    pub(crate) fn r_prime(&self) -> f64 {
        self.r_prime
    }

    /// Byte length of a Round-2 message (all κ packed commitment vectors).
    pub fn commitment_size(&self) -> usize {
        self.kappa as usize * SINGLE_COMMITMENT_SIZE
    }

    /// Byte length of a Round-3 message (all κ packed response vectors).
    pub fn response_size(&self) -> usize {
        self.kappa as usize * SINGLE_RESPONSE_SIZE
    }

    /// Byte length of a packed private key for this configuration.
    ///
    /// Each party stores C(N−1, T−1) shares, one byte of honest-mask tag
    /// plus the ≤η-packed share vectors apiece.
    pub fn private_key_size(&self) -> usize {
        let shares_per_party = binomial(self.n - 1, self.t - 1);
        1 + 32 + 32 + TR_SIZE + (1 + POLY_LEQ_ETA_SIZE * (L + K)) * shares_per_party
    }
}

/// n choose k.
pub(crate) fn binomial(n: u8, k: u8) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut c = 1usize;
    for i in 0..k {
        c = c * (n as usize - i as usize) / (i as usize + 1);
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rejects_out_of_range() {
        assert_eq!(ThresholdParams::new(1, 2), Err(Error::InvalidParameters));
        assert_eq!(ThresholdParams::new(3, 2), Err(Error::InvalidParameters));
        assert_eq!(ThresholdParams::new(2, 7), Err(Error::InvalidParameters));
        assert!(ThresholdParams::new(2, 2).is_ok());
        assert!(ThresholdParams::new(6, 6).is_ok());
    }

    #[test]
    fn derived_sizes() {
        assert_eq!(POLY_LEQ_ETA_SIZE, 96);
        assert_eq!(POLY_LE_GAMMA1_SIZE, 576);
        assert_eq!(POLY_T1_SIZE, 320);
        assert_eq!(POLY_W1_SIZE, 192);
        assert_eq!(POLY_Q_SIZE, 736);
        assert_eq!(PUBLIC_KEY_SIZE, 1312);
        assert_eq!(SIGNATURE_SIZE, 2420);

        let p = ThresholdParams::new(2, 2).unwrap();
        assert_eq!(p.kappa(), 2);
        assert_eq!(p.commitment_size(), 2 * 4 * 736);
        assert_eq!(p.response_size(), 2 * 4 * 576);
    }

    #[test]
    fn private_key_size_counts_shares() {
        // Each party holds C(N-1, T-1) shares.
        let p = ThresholdParams::new(2, 3).unwrap();
        assert_eq!(p.private_key_size(), 1 + 32 + 32 + 64 + (1 + 96 * 8) * 2);
        let p = ThresholdParams::new(3, 5).unwrap();
        assert_eq!(binomial(4, 2), 6);
        assert_eq!(p.private_key_size(), 1 + 32 + 32 + 64 + (1 + 96 * 8) * 6);
    }

    #[test]
    fn all_registered_pairs_resolve() {
        for n in 2..=6u8 {
            for t in 2..=n {
                let p = ThresholdParams::new(t, n).unwrap();
                assert!(p.kappa() >= 1);
                assert!(p.r() < p.r_prime());
            }
        }
    }
}
