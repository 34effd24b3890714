// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! Per-party private keys and the trapdoor share table.

use std::collections::BTreeMap;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::Error;
use crate::hash;
use crate::keygen::compute_t1;
use crate::packing;
use crate::params::{
    ThresholdParams, K, L, N, POLY_LEQ_ETA_SIZE, TR_SIZE,
};
use crate::public_key::PublicKey;
use crate::sampling::poly_uniform_leq_eta;
use crate::sign;
use crate::signature::Signature;
use crate::vec::{Mat, VecK, VecL};

/// One additive share of the secret vector, with cached NTT forms.
///
/// Immutable once sampled; a share is jointly owned by every party whose
/// bit is set in its honest mask.
#[derive(Clone, Debug, Zeroize)]
pub(crate) struct Share {
    pub(crate) s1: VecL,
    pub(crate) s2: VecK,

    // Cached values.
    pub(crate) s1h: VecL,
    pub(crate) s2h: VecK,
}

impl Share {
    /// Derives a share from a 64-byte seed, nonces 0..L+K−1.
    pub(crate) fn from_seed(seed: &[u8; 64]) -> Share {
        let mut s1 = VecL::zero();
        for (j, p) in s1.v.iter_mut().enumerate() {
            *p = poly_uniform_leq_eta(seed, j as u16);
        }
        let mut s2 = VecK::zero();
        for (j, p) in s2.v.iter_mut().enumerate() {
            *p = poly_uniform_leq_eta(seed, (L + j) as u16);
        }
        Share::with_ntt_caches(s1, s2)
    }

    pub(crate) fn with_ntt_caches(s1: VecL, s2: VecK) -> Share {
        let mut s1h = s1;
        s1h.ntt();
        let mut s2h = s2;
        s2h.ntt();
        Share { s1, s2, s1h, s2h }
    }
}

/// Party i's private key: identity, key material and the share table.
///
/// `shares` maps each honest-signer mask m (bit i set) to the share
/// jointly owned by the parties in m; iteration order is the mask order.
#[derive(Debug)]
pub struct PrivateKey {
    pub(crate) id: u8,
    pub(crate) rho: [u8; 32],
    pub(crate) key: [u8; 32],
    pub(crate) tr: [u8; TR_SIZE],
    pub(crate) shares: BTreeMap<u8, Share>,

    // Cached values.
    pub(crate) a: Mat,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.key.zeroize();
        for share in self.shares.values_mut() {
            share.zeroize();
        }
    }
}

impl PrivateKey {
    /// This party's index in 0..N.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Packs the private key; `buf` must be exactly
    /// [`ThresholdParams::private_key_size`] bytes.
    pub fn pack(&self, buf: &mut [u8]) {
        let share_size = 1 + POLY_LEQ_ETA_SIZE * (L + K);
        assert_eq!(
            buf.len(),
            65 + TR_SIZE + share_size * self.shares.len(),
            "wrong private key buffer length"
        );

        buf[0] = self.id;
        buf[1..33].copy_from_slice(&self.rho);
        buf[33..65].copy_from_slice(&self.key);
        buf[65..65 + TR_SIZE].copy_from_slice(&self.tr);
        let mut off = 65 + TR_SIZE;
        for (mask, share) in &self.shares {
            buf[off] = *mask;
            off += 1;
            packing::pack_vec_leq_eta(&share.s1, &mut buf[off..off + POLY_LEQ_ETA_SIZE * L]);
            off += POLY_LEQ_ETA_SIZE * L;
            packing::pack_vec_leq_eta(&share.s2, &mut buf[off..off + POLY_LEQ_ETA_SIZE * K]);
            off += POLY_LEQ_ETA_SIZE * K;
        }
    }

    /// Unpacks a private key, rebuilding the NTT and matrix caches.
    ///
    /// The share bytes themselves are trusted, as they come from the
    /// holder's own storage; only the framing is validated.
    pub fn unpack(buf: &[u8]) -> Result<PrivateKey, Error> {
        let share_size = 1 + POLY_LEQ_ETA_SIZE * (L + K);
        if buf.len() < 65 + TR_SIZE || (buf.len() - 65 - TR_SIZE) % share_size != 0 {
            return Err(Error::MalformedPrivateKey);
        }

        let id = buf[0];
        let mut rho = [0u8; 32];
        rho.copy_from_slice(&buf[1..33]);
        let mut key = [0u8; 32];
        key.copy_from_slice(&buf[33..65]);
        let mut tr = [0u8; TR_SIZE];
        tr.copy_from_slice(&buf[65..65 + TR_SIZE]);

        let mut shares = BTreeMap::new();
        let mut off = 65 + TR_SIZE;
        while off < buf.len() {
            let mask = buf[off];
            off += 1;
            let s1 = packing::unpack_vec_leq_eta(&buf[off..off + POLY_LEQ_ETA_SIZE * L]);
            off += POLY_LEQ_ETA_SIZE * L;
            let s2 = packing::unpack_vec_leq_eta(&buf[off..off + POLY_LEQ_ETA_SIZE * K]);
            off += POLY_LEQ_ETA_SIZE * K;
            shares.insert(mask, Share::with_ntt_caches(s1, s2));
        }

        let a = Mat::derive(&rho);
        Ok(PrivateKey {
            id,
            rho,
            key,
            tr,
            shares,
            a,
        })
    }

    /// Constant-time equality over the full key, including every
    /// coefficient of every stored share.
    pub fn equals(&self, other: &PrivateKey) -> bool {
        let ct = self.rho.as_ref().ct_eq(other.rho.as_ref())
            & self.key.as_ref().ct_eq(other.key.as_ref())
            & self.tr.as_ref().ct_eq(other.tr.as_ref());

        let mut acc = (self.id ^ other.id) as u32;
        acc |= (self.shares.len() ^ other.shares.len()) as u32;
        let zero_share = Share::with_ntt_caches(VecL::zero(), VecK::zero());
        for (mask, share) in &self.shares {
            let peer = other.shares.get(mask).unwrap_or(&zero_share);
            for i in 0..L {
                for j in 0..N {
                    acc |= share.s1.v[i].c[j] ^ peer.s1.v[i].c[j];
                }
            }
            for i in 0..K {
                for j in 0..N {
                    acc |= share.s2.v[i].c[j] ^ peer.s2.v[i].c[j];
                }
            }
        }

        bool::from(ct & acc.ct_eq(&0))
    }

    /// Reassembles this party's additive contribution (ŝ₁ᵢ, ŝ₂ᵢ) for the
    /// signer set `act`, so that the contributions of all active parties
    /// sum to the full (ŝ₁, ŝ₂).
    pub(crate) fn recover_share(&self, act: u8, params: &ThresholdParams) -> (VecL, VecK) {
        // With T = 1 or T = N each party holds exactly one relevant
        // share and uses it as-is.
        if params.t() == 1 || params.t() == params.n() {
            let share = self.shares.values().next().expect("key has no shares");
            return (share.s1h, share.s2h);
        }

        let table = sharing_table(params.t(), params.n());

        // Permute the active parties onto positions 0..T and the rest
        // onto T..N; the table is written for that canonical layout.
        let n = params.n() as usize;
        let mut perm = [0u8; 8];
        let mut i1 = 0usize;
        let mut i2 = params.t() as usize;
        let mut rank = 0usize;
        for j in 0..n as u8 {
            if j == self.id {
                rank = i1;
            }
            if act & (1 << j) != 0 {
                perm[i1] = j;
                i1 += 1;
            } else {
                perm[i2] = j;
                i2 += 1;
            }
        }

        let mut s1h = VecL::zero();
        let mut s2h = VecK::zero();
        for &u in table[rank] {
            // Remap the canonical mask through the permutation to find
            // the actually stored one.
            let mut stored = 0u8;
            for (i, &p) in perm.iter().enumerate().take(n) {
                if u & (1 << i) != 0 {
                    stored |= 1 << p;
                }
            }
            let share = &self.shares[&stored];
            s1h = s1h.add(&share.s1h);
            s2h = s2h.add(&share.s2h);
        }
        (s1h, s2h)
    }

    /// The public key, derivable locally only for the single-party key.
    pub(crate) fn public(&self) -> PublicKey {
        let share = &self.shares[&1];
        let t1 = compute_t1(&self.a, &share.s1h, &share.s2);
        PublicKey::assemble(self.rho, t1, self.a.clone())
    }

    /// Signs (msg, ctx) on the degenerate single-party path, producing a
    /// standard ML-DSA-44 signature. `rnd` is the FIPS-204 signing
    /// randomness; all zeros gives the deterministic variant.
    pub fn sign(&self, msg: &[u8], ctx: &[u8], rnd: &[u8; 32]) -> Result<Signature, Error> {
        if ctx.len() > 255 {
            return Err(Error::ContextTooLong);
        }
        let params = ThresholdParams::single();
        let pk = self.public();

        let mut rhop = [0u8; 64];
        hash::shake256(&[&self.key, rnd], &mut rhop);
        let mu = hash::compute_mu(&self.tr, msg, ctx);

        // One try succeeds with probability between 1/7 and 1/4, so 576
        // rejections happen with probability below 2⁻¹²⁸.
        for attempt in 1u16..576 {
            let (ws, masks) = sign::gen_commitments(self, &rhop, attempt, &params);
            let zs = sign::compute_responses(self, 1, &mu, &ws, &masks, &params);
            if let Some(sig) = sign::combine_iterations(&pk, &mu, &ws, &zs, &params) {
                return Ok(sig);
            }
        }
        Err(Error::RetryLimitExceeded)
    }
}

/// The per-(T, N) recovery tables: for each active-party rank, the
/// canonical share masks whose sum is that party's contribution. The
/// masks across all ranks partition the full share set exactly once.
fn sharing_table(t: u8, n: u8) -> &'static [&'static [u8]] {
    match (t, n) {
        (2, 3) => &[&[3, 5], &[6]],
        (2, 4) => &[&[11, 13], &[7, 14]],
        (3, 4) => &[&[3, 9], &[6, 10], &[12, 5]],
        (2, 5) => &[&[27, 29, 23], &[30, 15]],
        (3, 5) => &[&[25, 11, 19, 13], &[7, 14, 22, 26], &[28, 21]],
        (4, 5) => &[&[3, 9, 17], &[6, 10, 18], &[12, 5, 20], &[24]],
        (2, 6) => &[&[61, 47, 55], &[62, 31, 59]],
        (3, 6) => &[
            &[27, 23, 43, 57, 39],
            &[51, 58, 46, 30, 54],
            &[45, 53, 29, 15, 60],
        ],
        (4, 6) => &[
            &[19, 13, 35, 7, 49],
            &[42, 26, 38, 50, 22],
            &[52, 21, 44, 28, 37],
            &[25, 11, 14, 56, 41],
        ],
        (5, 6) => &[
            &[3, 5, 33],
            &[6, 10, 34],
            &[12, 20, 36],
            &[9, 24, 40],
            &[48, 17, 18],
        ],
        _ => panic!("no recovery table for ({}, {})", t, n),
    }
}
