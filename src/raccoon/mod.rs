// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! An independent threshold scheme of the same three-round shape.
//!
//! Where the main scheme stays bit-compatible with FIPS-204, this
//! variant trades that for simplicity: a 49-bit NTT-friendly modulus,
//! discrete Gaussian masks instead of the hyperball sampler, a recursive
//! share tree instead of the fixed recovery tables, and a verification
//! equation made exact by a transmitted rounding correction instead of
//! hints. It exists to exercise the protocol shape — commit, open,
//! respond, combine — under a different parameterization.

pub mod params;
pub mod ring;
pub mod sampling;
pub mod sharing;
pub mod sign;

pub use ring::{Ring, RingPoly};
pub use sign::{
    finalize, keygen, round1, round2, round3, verify, PrivateKey, PublicKey, Round1State,
    Round2State, Signature,
};
