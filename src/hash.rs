//! SHAKE-based hashing as used throughout the protocol.
//!
//! Every hash in the scheme is an instance of SHAKE-256 over a fixed
//! concatenation of inputs; this module centralizes those layouts so the
//! domain separation lives in one place.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use crate::params::TR_SIZE;

/// SHAKE-256 over the concatenation of `parts`, filling `out`.
pub(crate) fn shake256(parts: &[&[u8]], out: &mut [u8]) {
    let mut h = Shake256::default();
    for p in parts {
        h.update(p);
    }
    h.finalize_xof().read(out);
}

/// SHAKE-256 over the concatenation of `parts`, as an unbounded stream.
pub(crate) fn shake256_xof(parts: &[&[u8]]) -> impl XofReader {
    let mut h = Shake256::default();
    for p in parts {
        h.update(p);
    }
    h.finalize_xof()
}

/// μ = SHAKE-256(Tr ‖ 0x00 ‖ len(ctx) ‖ ctx ‖ msg, 64).
///
/// The leading zero byte is the FIPS-204 non-pre-hash domain separator;
/// callers must have checked `ctx.len() <= 255`.
pub(crate) fn compute_mu(tr: &[u8; TR_SIZE], msg: &[u8], ctx: &[u8]) -> [u8; 64] {
    let mut mu = [0u8; 64];
    shake256(&[tr, &[0u8], &[ctx.len() as u8], ctx, msg], &mut mu);
    mu
}

/// The Round-1 commitment digest SHAKE-256(Tr ‖ id ‖ wbuf, 32).
pub(crate) fn commitment_digest(tr: &[u8; TR_SIZE], id: u8, wbuf: &[u8]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    shake256(&[tr, &[id], wbuf], &mut digest);
    digest
}

/// The challenge seed c̃ = SHAKE-256(μ ‖ pack_w1(w₁), 32).
pub(crate) fn challenge_seed(mu: &[u8; 64], w1_packed: &[u8]) -> [u8; 32] {
    let mut c_tilde = [0u8; 32];
    shake256(&[mu, w1_packed], &mut c_tilde);
    c_tilde
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_nil_context_agree() {
        let tr = [7u8; TR_SIZE];
        assert_eq!(compute_mu(&tr, b"msg", &[]), compute_mu(&tr, b"msg", b""));
    }

    #[test]
    fn mu_separates_context_from_message() {
        let tr = [0u8; TR_SIZE];
        // Moving a byte across the ctx/msg boundary must change μ.
        assert_ne!(compute_mu(&tr, b"bc", b"a"), compute_mu(&tr, b"c", b"ab"));
    }
}
