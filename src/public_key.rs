// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! The joint public key and the FIPS-204 verifier.

use crate::error::Error;
use crate::hash;
use crate::packing;
use crate::params::{K, POLY_T1_SIZE, POLY_W1_SIZE, PUBLIC_KEY_SIZE, TR_SIZE};
use crate::sampling::poly_challenge;
use crate::signature::{Signature, UnpackedSignature};
use crate::vec::{Mat, VecK};

/// The group's ML-DSA-44 public key, (ρ, t₁).
///
/// Holds the expanded matrix A and the digest Tr as caches; both are pure
/// functions of the packed bytes and are recomputed on unpacking.
#[derive(Clone, Debug)]
pub struct PublicKey {
    pub(crate) rho: [u8; 32],
    pub(crate) t1: VecK,

    // Cached values.
    pub(crate) t1_packed: [u8; K * POLY_T1_SIZE],
    pub(crate) a: Mat,
    pub(crate) tr: [u8; TR_SIZE],
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.rho == other.rho && self.t1 == other.t1
    }
}

impl Eq for PublicKey {}

impl PublicKey {
    pub(crate) fn assemble(rho: [u8; 32], t1: VecK, a: Mat) -> PublicKey {
        let mut t1_packed = [0u8; K * POLY_T1_SIZE];
        packing::pack_vec_t1(&t1, &mut t1_packed);

        let mut packed = [0u8; PUBLIC_KEY_SIZE];
        packed[..32].copy_from_slice(&rho);
        packed[32..].copy_from_slice(&t1_packed);
        let mut tr = [0u8; TR_SIZE];
        hash::shake256(&[&packed], &mut tr);

        PublicKey {
            rho,
            t1,
            t1_packed,
            a,
            tr,
        }
    }

    /// Packs the public key into its 1312-byte wire form.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        let mut buf = [0u8; PUBLIC_KEY_SIZE];
        buf[..32].copy_from_slice(&self.rho);
        buf[32..].copy_from_slice(&self.t1_packed);
        buf
    }

    /// Verifies `sig` over (msg, ctx) with the unmodified FIPS-204
    /// ML-DSA-44 verifier. Contexts longer than 255 bytes never verify.
    pub fn verify(&self, msg: &[u8], ctx: &[u8], sig: &Signature) -> bool {
        if ctx.len() > 255 {
            return false;
        }
        let sig = match UnpackedSignature::unpack(sig) {
            Some(sig) => sig,
            None => return false,
        };

        let mu = hash::compute_mu(&self.tr, msg, ctx);

        // Az − 2ᵈ·c·t₁, entirely in the NTT domain.
        let mut zh = sig.z;
        zh.ntt();
        let az = self.a.mul_vec(&zh);

        let ch = {
            let mut ch = poly_challenge(&sig.c_tilde);
            ch.ntt();
            ch
        };
        let mut t1_2d = self.t1.mul_by_2d();
        t1_2d.ntt();
        let mut w_approx = az.sub(&t1_2d.mul_hat_poly(&ch));
        w_approx.inv_ntt();

        // UseHint(hint, Az − 2ᵈ·c·t₁) = w₁.
        let w1 = w_approx.use_hint(&sig.hint);
        let mut w1_packed = [0u8; K * POLY_W1_SIZE];
        packing::pack_vec_w1(&w1, &mut w1_packed);

        hash::challenge_seed(&mu, &w1_packed) == sig.c_tilde
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;

    /// Unpacks a public key, rederiving the A and Tr caches.
    fn try_from(buf: &[u8]) -> Result<PublicKey, Error> {
        if buf.len() != PUBLIC_KEY_SIZE {
            return Err(Error::MalformedPublicKey);
        }
        let mut rho = [0u8; 32];
        rho.copy_from_slice(&buf[..32]);
        let t1 = packing::unpack_vec_t1(&buf[32..]);
        let a = Mat::derive(&rho);
        Ok(PublicKey::assemble(rho, t1, a))
    }
}
