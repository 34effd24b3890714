//! Keys, signing rounds and verification for the Gaussian-mask variant.
//!
//! The protocol shape matches the ML-DSA-44 scheme — commit to a masked
//! w, open, respond with z_i = r*_i + c·s_i — but over a 49-bit modulus
//! ring with discrete Gaussian masks and no per-attempt rejection: the
//! verification equation is made exact by the transmitted rounding
//! correction Δ, and soundness rests on an ℓ₂ bound over (Δ, z).

use std::collections::BTreeMap;

use rand_core::{CryptoRng, RngCore};

use crate::error::Error;
use crate::hash::shake256;

use super::params::{
    BOUND_E, BOUND_STAR, B_SQUARE, DEGREE, DIM_ELL, DIM_K, KAPPA, NU, Q, Q_NU, Q_XI, SIGMA_E,
    SIGMA_STAR, XI,
};
use super::ring::{vec_from_bytes, vec_to_bytes, Ring, RingPoly, RingVec};
use super::sampling::{challenge, gaussian_poly, uniform_poly};
use super::sharing::{recover, share, PartyShares};

/// The variant's public key: the ring context, the matrix A (NTT domain)
/// and the ξ-rounded b̃.
pub struct PublicKey {
    pub(crate) ring: Ring,
    pub(crate) a: Vec<RingVec>,
    pub(crate) btilde: RingVec,
}

/// One party's key: its index and its branch of the share tree.
pub struct PrivateKey {
    pub(crate) id: usize,
    pub(crate) shares: PartyShares,
}

impl PrivateKey {
    /// This party's index in 0..N.
    pub fn id(&self) -> usize {
        self.id
    }
}

/// State carried out of Round 1: the commitment w and the mask r*.
pub struct Round1State {
    pub(crate) w: RingVec,
    pub(crate) r_star: RingVec,
}

/// State carried out of Round 2: peer digests, the active set, and the
/// mask carried forward to Round 3.
pub struct Round2State {
    pub(crate) hashes: BTreeMap<usize, [u8; 32]>,
    pub(crate) act: Vec<usize>,
    pub(crate) r_star: RingVec,
}

/// A finalized signature: the challenge, the aggregated NTT-domain
/// response, and the rounding correction Δ.
pub struct Signature {
    pub(crate) c: RingPoly,
    pub(crate) z: RingVec,
    pub(crate) delta: RingVec,
}

/// Dealer keygen: samples A, a Gaussian secret s and noise e, publishes
/// b̃ = round_ξ(A·s + e), and deals the share tree of s.
pub fn keygen<R: RngCore + CryptoRng>(
    rng: &mut R,
    t: usize,
    n: usize,
) -> Result<(PublicKey, Vec<PrivateKey>), Error> {
    if t == 0 || t > n {
        return Err(Error::InvalidParameters);
    }
    let ring = Ring::new(DEGREE, Q)?;

    let a: Vec<RingVec> = (0..DIM_K)
        .map(|_| (0..DIM_ELL).map(|_| uniform_poly(&ring, rng)).collect())
        .collect();

    let mut s: RingVec = (0..DIM_ELL)
        .map(|_| gaussian_poly(&ring, rng, SIGMA_E, BOUND_E))
        .collect();

    let parties: Vec<usize> = (0..n).collect();
    let mut dealt = share(&ring, rng, SIGMA_E, BOUND_E, &s, &parties, t, "");

    ring.vec_ntt(&mut s);
    let mut e: RingVec = (0..DIM_K)
        .map(|_| gaussian_poly(&ring, rng, SIGMA_E, BOUND_E))
        .collect();
    ring.vec_ntt(&mut e);

    let mut b = ring.mat_vec_mul(&a, &s);
    b = ring.vec_add(&b, &e);
    ring.vec_inv_ntt(&mut b);
    let btilde = ring.round_vec(&b, XI, Q_XI);

    let sks = parties
        .iter()
        .map(|&id| PrivateKey {
            id,
            shares: dealt.remove(&id).unwrap_or_default(),
        })
        .collect();

    Ok((PublicKey { ring, a, btilde }, sks))
}

/// SHAKE-256(A ‖ b̃ ‖ w ‖ id) commitment digest.
fn hash_commitment(pk: &PublicKey, w: &[RingPoly], id: usize) -> [u8; 32] {
    let a_bytes: Vec<u8> = pk.a.iter().flat_map(|row| vec_to_bytes(row)).collect();
    let b_bytes = vec_to_bytes(&pk.btilde);
    let w_bytes = vec_to_bytes(w);
    let mut out = [0u8; 32];
    shake256(
        &[&a_bytes, &b_bytes, &w_bytes, &(id as u64).to_be_bytes()],
        &mut out,
    );
    out
}

/// Hashes (A, b̃, h, μ) to the weight-κ challenge, in the NTT domain.
fn low_norm_hash(pk: &PublicKey, h: &[RingPoly], mu: &[u8]) -> RingPoly {
    let a_bytes: Vec<u8> = pk.a.iter().flat_map(|row| vec_to_bytes(row)).collect();
    let b_bytes = vec_to_bytes(&pk.btilde);
    let h_bytes = vec_to_bytes(h);
    let mut digest = [0u8; 32];
    shake256(&[&a_bytes, &b_bytes, &h_bytes, mu], &mut digest);
    challenge(&pk.ring, &digest, KAPPA)
}

/// Round 1: commit to w = A·r* + e*.
pub fn round1<R: RngCore + CryptoRng>(pk: &PublicKey, id: usize, rng: &mut R) -> ([u8; 32], Round1State) {
    let ring = &pk.ring;
    let bound = BOUND_STAR;

    let mut r_star: RingVec = (0..DIM_ELL)
        .map(|_| gaussian_poly(ring, rng, SIGMA_STAR, bound))
        .collect();
    ring.vec_ntt(&mut r_star);
    let mut e_star: RingVec = (0..DIM_K)
        .map(|_| gaussian_poly(ring, rng, SIGMA_STAR, bound))
        .collect();
    ring.vec_ntt(&mut e_star);

    let mut w = ring.mat_vec_mul(&pk.a, &r_star);
    w = ring.vec_add(&w, &e_star);
    ring.vec_inv_ntt(&mut w);

    (hash_commitment(pk, &w, id), Round1State { w, r_star })
}

/// Round 2: open the commitment, binding the peer digests and the
/// active set into the session state.
pub fn round2(
    msgs1: &BTreeMap<usize, [u8; 32]>,
    st1: Round1State,
    act: &[usize],
) -> (Vec<u8>, Round2State) {
    let opening = vec_to_bytes(&st1.w);
    (
        opening,
        Round2State {
            hashes: msgs1.clone(),
            act: act.to_vec(),
            r_star: st1.r_star,
        },
    )
}

/// Round 3: check every opening, aggregate, derive the challenge and
/// respond with z_i = r*_i + c·s_i over the recovered share.
pub fn round3(
    pk: &PublicKey,
    sk: &PrivateKey,
    msgs2: &BTreeMap<usize, Vec<u8>>,
    st2: &Round2State,
    mu: &[u8],
    n_parties: usize,
) -> Result<Vec<u8>, Error> {
    let ring = &pk.ring;
    if msgs2.len() != st2.hashes.len() {
        return Err(Error::WrongCommitment);
    }

    let mut ws = BTreeMap::new();
    for (&id, buf) in msgs2 {
        let w = vec_from_bytes(buf, DIM_K, ring.degree()).ok_or(Error::WrongCommitment)?;
        ws.insert(id, w);
    }
    for (&id, digest) in &st2.hashes {
        if *digest != hash_commitment(pk, &ws[&id], id) {
            return Err(Error::WrongCommitment);
        }
    }

    let mut h = ring.zero_vec(DIM_K);
    for w in ws.values() {
        h = ring.vec_add(&h, w);
    }
    let rounded_h = ring.round_vec(&h, NU, Q_NU);
    let c = low_norm_hash(pk, &rounded_h, mu);

    let parties: Vec<usize> = (0..n_parties).collect();
    let indices = recover(&st2.act, &parties, "");
    let mut s_c = sk.shares[&indices[&sk.id]].clone();
    ring.vec_ntt(&mut s_c);
    let cs = ring.vec_mul_poly(&s_c, &c);
    let z = ring.vec_add(&st2.r_star, &cs);

    Ok(vec_to_bytes(&z))
}

/// Combines the openings and responses into a signature.
pub fn finalize(
    pk: &PublicKey,
    msgs2: &BTreeMap<usize, Vec<u8>>,
    msgs3: &BTreeMap<usize, Vec<u8>>,
    mu: &[u8],
) -> Option<Signature> {
    let ring = &pk.ring;

    let mut w_sum = ring.zero_vec(DIM_K);
    for buf in msgs2.values() {
        w_sum = ring.vec_add(&w_sum, &vec_from_bytes(buf, DIM_K, ring.degree())?);
    }
    let rounded_h = ring.round_vec(&w_sum, NU, Q_NU);
    let c = low_norm_hash(pk, &rounded_h, mu);

    let mut z_sum = ring.zero_vec(DIM_ELL);
    for buf in msgs3.values() {
        z_sum = ring.vec_add(&z_sum, &vec_from_bytes(buf, DIM_ELL, ring.degree())?);
    }

    let az = ring.mat_vec_mul(&pk.a, &z_sum);
    let mut b = ring.restore_vec(&pk.btilde, XI);
    ring.vec_ntt(&mut b);
    let bc = ring.vec_mul_poly(&b, &c);
    let mut az_bc = ring.vec_sub(&az, &bc);
    ring.vec_inv_ntt(&mut az_bc);
    let rounded_az_bc = ring.round_vec(&az_bc, NU, Q_NU);

    let delta = ring.small_vec_sub(&rounded_h, &rounded_az_bc, Q_NU);

    Some(Signature {
        c,
        z: z_sum,
        delta,
    })
}

/// Verifies a signature: challenge re-derivation from the Δ-corrected
/// rounding, then the ℓ₂ bound on (restore(Δ), z).
pub fn verify(pk: &PublicKey, sig: &Signature, mu: &[u8]) -> bool {
    let ring = &pk.ring;

    let az = ring.mat_vec_mul(&pk.a, &sig.z);
    let mut b = ring.restore_vec(&pk.btilde, XI);
    ring.vec_ntt(&mut b);
    let bc = ring.vec_mul_poly(&b, &sig.c);
    let mut az_bc = ring.vec_sub(&az, &bc);
    ring.vec_inv_ntt(&mut az_bc);
    let rounded_az_bc = ring.round_vec(&az_bc, NU, Q_NU);

    let h_approx = ring.small_vec_add(&rounded_az_bc, &sig.delta, Q_NU);
    if low_norm_hash(pk, &h_approx, mu) != sig.c {
        return false;
    }

    let delta_full = ring.restore_vec(&sig.delta, NU);
    let mut z = sig.z.clone();
    ring.vec_inv_ntt(&mut z);
    l2_norm_within(ring, &delta_full, &z)
}

/// Whether the centered squared ℓ₂ norm of (Δ, z) stays within B².
fn l2_norm_within(ring: &Ring, delta: &[RingPoly], z: &[RingPoly]) -> bool {
    let q = ring.modulus();
    let half = q / 2;
    let mut sum: u128 = 0;
    for p in delta.iter().chain(z.iter()) {
        for &c in p.c.iter() {
            let centered = if c > half {
                (q - c) as u128
            } else {
                c as u128
            };
            sum += centered * centered;
        }
    }
    sum <= B_SQUARE
}
