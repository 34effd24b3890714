// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! Trusted-dealer key derivation.
//!
//! All key material flows out of one SHAKE-256 stream over the seed, so
//! key generation is bit-exact across platforms; no floating point is
//! involved anywhere on this path.

use rand_core::{CryptoRng, RngCore};
use sha3::digest::XofReader;

use crate::hash::shake256_xof;
use crate::params::{ThresholdParams, K, L, SEED_SIZE};
use crate::private_key::{PrivateKey, Share};
use crate::public_key::PublicKey;
use crate::vec::{Mat, VecK, VecL};

/// Derives the group public key and all N private keys from a 32-byte
/// seed, deterministically.
pub fn keygen_from_seed(
    seed: &[u8; SEED_SIZE],
    params: &ThresholdParams,
) -> (PublicKey, Vec<PrivateKey>) {
    let mut xof = shake256_xof(&[seed, &[K as u8, L as u8]]);

    let mut rho = [0u8; 32];
    xof.read(&mut rho);
    let a = Mat::derive(&rho);

    let mut sks: Vec<PrivateKey> = (0..params.n())
        .map(|i| {
            let mut key = [0u8; 32];
            xof.read(&mut key);
            PrivateKey {
                id: i,
                rho,
                key,
                tr: [0u8; 64],
                shares: Default::default(),
                a: a.clone(),
            }
        })
        .collect();

    // Enumerate the honest-signer masks: every N-bit pattern of weight
    // N−T+1, in Gosper-successor order starting from the lexicographic
    // first. Any T-subset of signers contains at least one full owner
    // set of each summand it needs.
    let mut s2_tot = VecK::zero();
    let mut s1h_tot = VecL::zero();

    let n = params.n() as u32;
    let mut mask: u32 = (1 << (n - params.t() as u32 + 1)) - 1;
    while mask < 1 << n {
        let mut share_seed = [0u8; 64];
        xof.read(&mut share_seed);
        let share = Share::from_seed(&share_seed);

        for sk in sks.iter_mut() {
            if mask & (1 << sk.id) != 0 {
                sk.shares.insert(mask as u8, share.clone());
            }
        }

        s2_tot = s2_tot.add(&share.s2);
        s1h_tot = s1h_tot.add(&share.s1h);

        // Gosper's hack: next mask of the same weight.
        let c = mask & mask.wrapping_neg();
        let r = mask + c;
        mask = (((r ^ mask) >> 2) / c) | r;
    }

    let t1 = compute_t1(&a, &s1h_tot, &s2_tot);
    let pk = PublicKey::assemble(rho, t1, a);

    for sk in sks.iter_mut() {
        sk.tr = pk.tr;
    }

    (pk, sks)
}

/// Dealer keygen with a fresh random seed.
pub fn generate_threshold_key<R: RngCore + CryptoRng>(
    rng: &mut R,
    params: &ThresholdParams,
) -> (PublicKey, Vec<PrivateKey>) {
    let mut seed = [0u8; SEED_SIZE];
    rng.fill_bytes(&mut seed);
    keygen_from_seed(&seed, params)
}

/// t₁ of Power2Round(InvNTT(A·ŝ₁) + s₂).
pub(crate) fn compute_t1(a: &Mat, s1h: &VecL, s2: &VecK) -> VecK {
    let mut t = a.mul_vec(s1h);
    t.inv_ntt();
    let t = t.add(s2);
    let (_t0, t1) = t.power2round();
    t1
}
