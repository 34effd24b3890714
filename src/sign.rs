// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! The three-round threshold signing protocol and the combiner.
//!
//! One signing *attempt* runs κ iterations in parallel: Round 1 samples
//! κ hyperball masks and publishes a 32-byte hash of the packed
//! commitments; Round 2 opens them; Round 3 checks every opening against
//! its Round-1 hash, aggregates, and publishes the rejection-gated
//! responses. The combiner assembles a plain FIPS-204 signature out of
//! the first iteration that passes all of the verifier-side bounds. If
//! none does, the attempt is discarded and the driver retries with fresh
//! randomness.

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Error;
use crate::fvec::FVec;
use crate::hash;
use crate::packing;
use crate::params::{
    ThresholdParams, BETA, GAMMA1, GAMMA2, K, OMEGA, POLY_W1_SIZE, SINGLE_COMMITMENT_SIZE,
    SINGLE_RESPONSE_SIZE,
};
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::sampling::{poly_challenge, sample_hyperball};
use crate::signature::{Signature, UnpackedSignature};
use crate::vec::{VecK, VecL};

/// Round-1 message: the commitment digest.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round1Message {
    /// The sending party's index.
    pub sender: u8,
    /// SHAKE-256(Tr ‖ sender ‖ wbuf, 32).
    pub commitment: [u8; 32],
}

/// Round-2 message: the packed commitment vectors being opened.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round2Message {
    /// The sending party's index.
    pub sender: u8,
    /// The κ·K packed commitment polynomials from Round 1.
    pub opening: Vec<u8>,
}

/// Round-3 message: the packed responses, zero-filled where rejected.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round3Message {
    /// The sending party's index.
    pub sender: u8,
    /// The κ·L packed response polynomials.
    pub response: Vec<u8>,
}

/// Per-session state carried out of Round 1: the packed commitments held
/// for the Round-2 opening, and the secret floating-point masks.
///
/// Single-owner; consumed by the round that needs it and wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Round1State {
    pub(crate) wbuf: Vec<u8>,
    pub(crate) masks: Vec<FVec>,
}

/// Per-session state carried out of Round 2.
#[derive(Debug)]
pub struct Round2State {
    pub(crate) hashes: Vec<[u8; 32]>,
    pub(crate) mu: [u8; 64],
    pub(crate) act: u8,
}

/// Round 1: sample κ masked commitments and publish their digest.
pub fn round1<R: RngCore + CryptoRng>(
    sk: &PrivateKey,
    params: &ThresholdParams,
    rng: &mut R,
) -> ([u8; 32], Round1State) {
    let mut rhop = [0u8; 64];
    rng.fill_bytes(&mut rhop);

    let (ws, masks) = gen_commitments(sk, &rhop, 0, params);
    let mut wbuf = vec![0u8; params.commitment_size()];
    for (k, w) in ws.iter().enumerate() {
        packing::pack_vec_q(
            w,
            &mut wbuf[k * SINGLE_COMMITMENT_SIZE..(k + 1) * SINGLE_COMMITMENT_SIZE],
        );
    }
    let commitment = hash::commitment_digest(&sk.tr, sk.id, &wbuf);
    (commitment, Round1State { wbuf, masks })
}

/// Round 2: bind the signer set and message, store the peers' digests
/// (in ascending signer order) and open the own commitments.
pub fn round2(
    sk: &PrivateKey,
    act: u8,
    msg: &[u8],
    ctx: &[u8],
    round1_msgs: &[[u8; 32]],
    st1: &Round1State,
) -> Result<(Vec<u8>, Round2State), Error> {
    if ctx.len() > 255 {
        return Err(Error::ContextTooLong);
    }
    let st2 = Round2State {
        hashes: round1_msgs.to_vec(),
        mu: hash::compute_mu(&sk.tr, msg, ctx),
        act,
    };
    Ok((st1.wbuf.clone(), st2))
}

/// Round 3: verify every opening against its Round-1 digest, aggregate
/// the commitments and publish this party's responses.
pub fn round3(
    sk: &PrivateKey,
    round2_msgs: &[Vec<u8>],
    st1: &Round1State,
    st2: &Round2State,
    params: &ThresholdParams,
) -> Result<Vec<u8>, Error> {
    let kappa = params.kappa() as usize;
    let mut wfinal = vec![VecK::zero(); kappa];

    // The i-th message belongs to the i-th lowest set bit of act; every
    // party walks the same order so the aggregate is bit-identical.
    let mut signer = 0u8;
    for (i, opening) in round2_msgs.iter().enumerate() {
        while st2.act & (1 << signer) == 0 {
            signer += 1;
        }
        assert_eq!(
            opening.len(),
            params.commitment_size(),
            "wrong commitment byte length"
        );

        if hash::commitment_digest(&sk.tr, signer, opening) != st2.hashes[i] {
            return Err(Error::WrongCommitment);
        }

        for (k, w) in wfinal.iter_mut().enumerate() {
            let wt = packing::unpack_vec_q(
                &opening[k * SINGLE_COMMITMENT_SIZE..(k + 1) * SINGLE_COMMITMENT_SIZE],
            );
            *w = w.add(&wt);
        }
        signer += 1;
    }

    let zs = compute_responses(sk, st2.act, &st2.mu, &wfinal, &st1.masks, params);

    let mut response = vec![0u8; params.response_size()];
    for (k, z) in zs.iter().enumerate() {
        packing::pack_vec_le_gamma1(
            z,
            &mut response[k * SINGLE_RESPONSE_SIZE..(k + 1) * SINGLE_RESPONSE_SIZE],
        );
    }
    Ok(response)
}

/// Aggregates openings and responses into a FIPS-204 signature.
///
/// Returns `None` when fewer than T responses are present or when every
/// iteration fails a verifier-side bound; the caller then retries the
/// whole attempt.
pub fn combine(
    pk: &PublicKey,
    msg: &[u8],
    ctx: &[u8],
    commitments: &[Vec<u8>],
    responses: &[Vec<u8>],
    params: &ThresholdParams,
) -> Option<Signature> {
    if ctx.len() > 255 || responses.len() < params.t() as usize {
        return None;
    }
    let kappa = params.kappa() as usize;

    let mut wfinal = vec![VecK::zero(); kappa];
    for opening in commitments {
        assert_eq!(
            opening.len(),
            params.commitment_size(),
            "wrong commitment byte length"
        );
        for (k, w) in wfinal.iter_mut().enumerate() {
            let wt = packing::unpack_vec_q(
                &opening[k * SINGLE_COMMITMENT_SIZE..(k + 1) * SINGLE_COMMITMENT_SIZE],
            );
            *w = w.add(&wt);
        }
    }

    let mut zfinal = vec![VecL::zero(); kappa];
    for response in responses {
        assert_eq!(
            response.len(),
            params.response_size(),
            "wrong response byte length"
        );
        for (k, z) in zfinal.iter_mut().enumerate() {
            let zt = packing::unpack_vec_le_gamma1(
                &response[k * SINGLE_RESPONSE_SIZE..(k + 1) * SINGLE_RESPONSE_SIZE],
            );
            *z = z.add(&zt);
        }
    }

    let mu = hash::compute_mu(&pk.tr, msg, ctx);
    combine_iterations(pk, &mu, &wfinal, &zfinal, params)
}

/// Samples κ hyperball masks and the commitments w = A·r + e.
pub(crate) fn gen_commitments(
    sk: &PrivateKey,
    rhop: &[u8; 64],
    nonce: u16,
    params: &ThresholdParams,
) -> (Vec<VecK>, Vec<FVec>) {
    let kappa = params.kappa();
    let mut ws = Vec::with_capacity(kappa as usize);
    let mut masks = Vec::with_capacity(kappa as usize);
    for k in 0..kappa {
        let mask = sample_hyperball(
            params.r_prime(),
            params.nu(),
            rhop,
            nonce.wrapping_mul(kappa).wrapping_add(k),
        );
        let mut r = VecL::zero();
        let mut e = VecK::zero();
        mask.round(&mut r, &mut e);

        let mut rh = r;
        rh.ntt();
        let mut w = sk.a.mul_vec(&rh);
        w.inv_ntt();
        ws.push(w.add(&e));
        masks.push(mask);
    }
    (ws, masks)
}

/// Computes this party's responses for every iteration, applying the
/// hyperball rejection gate; rejected iterations stay zero.
pub(crate) fn compute_responses(
    sk: &PrivateKey,
    act: u8,
    mu: &[u8; 64],
    wfinal: &[VecK],
    masks: &[FVec],
    params: &ThresholdParams,
) -> Vec<VecL> {
    assert_ne!(act & (1 << sk.id), 0, "party is not in the signing set");

    let (s1h, s2h) = sk.recover_share(act, params);

    let mut zs = vec![VecL::zero(); params.kappa() as usize];
    for (k, z_out) in zs.iter_mut().enumerate() {
        let (_w0, w1) = wfinal[k].decompose();
        let mut w1_packed = [0u8; K * POLY_W1_SIZE];
        packing::pack_vec_w1(&w1, &mut w1_packed);
        let c_tilde = hash::challenge_seed(mu, &w1_packed);
        let mut ch = poly_challenge(&c_tilde);
        ch.ntt();

        let mut z = s1h.mul_hat_poly(&ch);
        z.inv_ntt();
        let mut y = s2h.mul_hat_poly(&ch);
        y.inv_ntt();

        let mut zf = FVec::from(&z, &y);
        zf.add(&masks[k]);
        if zf.excess(params.r(), params.nu()) {
            continue;
        }
        let mut e_out = VecK::zero();
        zf.round(z_out, &mut e_out);
    }
    zs
}

/// Tries each iteration in turn and packs the first that satisfies the
/// verifier-side bounds.
pub(crate) fn combine_iterations(
    pk: &PublicKey,
    mu: &[u8; 64],
    wfinal: &[VecK],
    zfinal: &[VecL],
    params: &ThresholdParams,
) -> Option<Signature> {
    for k in 0..params.kappa() as usize {
        let (w0, w1) = wfinal[k].decompose();

        if zfinal[k].exceeds(GAMMA1 - BETA) {
            continue;
        }

        let mut zh = zfinal[k];
        zh.ntt();
        let az = pk.a.mul_vec(&zh);

        let mut w1_packed = [0u8; K * POLY_W1_SIZE];
        packing::pack_vec_w1(&w1, &mut w1_packed);
        let c_tilde = hash::challenge_seed(mu, &w1_packed);
        let mut ch = poly_challenge(&c_tilde);
        ch.ntt();

        // Az − 2ᵈ·c·t₁ = w + f, where f absorbs the rounding of t and
        // the aggregated mask errors.
        let mut t1_2d = pk.t1.mul_by_2d();
        t1_2d.ntt();
        let mut w_approx = az.sub(&t1_2d.mul_hat_poly(&ch));
        w_approx.inv_ntt();

        let f = w_approx.sub(&wfinal[k]);
        if f.exceeds(GAMMA2) {
            continue;
        }

        let w0pf = w0.add(&f);
        let (hint, weight) = VecK::make_hint(&w0pf, &w1);
        if weight > OMEGA {
            continue;
        }

        let sig = UnpackedSignature {
            c_tilde,
            z: zfinal[k],
            hint,
        };
        return Some(sig.pack());
    }
    None
}
