// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

use thiserror::Error;

/// An error arising from threshold ML-DSA key handling or signing.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The requested (T, N) pair is outside the registered range.
    #[error("threshold parameters out of range: need 2 <= T <= N <= 6")]
    InvalidParameters,
    /// The signing context string exceeds 255 bytes.
    #[error("context string longer than 255 bytes")]
    ContextTooLong,
    /// A peer's Round-2 opening does not match its Round-1 commitment.
    #[error("commitment opening does not match the committed digest")]
    WrongCommitment,
    /// The encoding of a public key was malformed.
    #[error("malformed public key encoding")]
    MalformedPublicKey,
    /// The encoding of a private key was malformed.
    #[error("malformed private key encoding")]
    MalformedPrivateKey,
    /// A signing attempt failed to produce a signature within the retry cap.
    #[error("signing retry limit exceeded")]
    RetryLimitExceeded,
}
