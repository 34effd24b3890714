#![deny(missing_docs)]

//! Threshold ML-DSA-44 signatures.
//!
//! A set of N parties holds shares of one ML-DSA-44 signing key such
//! that any T of them can cooperatively produce a standard FIPS-204
//! signature, verifiable by the unmodified ML-DSA-44 verifier. Keys are
//! derived by a trusted dealer ([`keygen_from_seed`]); signing is an
//! interactive three-round protocol ([`round1`], [`round2`], [`round3`])
//! whose responses any observer can [`combine`] into a signature.
//!
//! The sharing is combinatorial rather than Shamir: the dealer deals one
//! additive summand per honest-signer mask, and a fixed per-(T, N)
//! recovery table partitions the summands among any active signer set.
//! The single-party mask of ML-DSA is replaced by a jointly sampled
//! hyperball mask with a floating-point rejection gate; everything that
//! must be bit-exact (key generation, packing, hashing) stays in integer
//! arithmetic.
//!
//! Message exchange between rounds is external to this crate; only the
//! byte formats and the canonical ascending-signer ordering are fixed.
//! The [`session`] module layers typed per-party session states over the
//! round functions and provides a local driver, [`sign_threshold`].
//!
//! The [`raccoon`] module contains an independent second scheme of the
//! same three-round shape over a 49-bit modulus ring, with a recursive
//! share tree and discrete Gaussian masks.

mod error;
mod fvec;
mod hash;
mod keygen;
mod packing;
mod params;
mod poly;
mod private_key;
mod public_key;
mod sampling;
pub mod session;
mod sign;
mod signature;
mod vec;

pub mod raccoon;

pub use error::Error;
pub use keygen::{generate_threshold_key, keygen_from_seed};
pub use params::{ThresholdParams, PUBLIC_KEY_SIZE, SEED_SIZE, SIGNATURE_SIZE};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use session::sign_threshold;
pub use sign::{
    combine, round1, round2, round3, Round1Message, Round1State, Round2Message, Round2State,
    Round3Message,
};
pub use signature::Signature;
