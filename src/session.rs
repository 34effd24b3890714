// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! Typed session states for one signing attempt, plus a local driver.
//!
//! The protocol states are encoded into Rust types: each round consumes
//! the previous state and returns the next, so a session cannot replay a
//! round or skip one. Transport is out of scope; messages only have to
//! reach the next round in ascending signer order.

use rand_core::{CryptoRng, RngCore};

use crate::error::Error;
use crate::params::ThresholdParams;
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::sign::{
    combine, round1, round2, round3, Round1Message, Round1State, Round2Message, Round2State,
    Round3Message,
};
use crate::signature::Signature;

/// A fresh signing session for one party, before any round has run.
pub struct SigningSession<'sk> {
    sk: &'sk PrivateKey,
    params: ThresholdParams,
}

/// A session that has committed and awaits the peers' openings.
pub struct AwaitingOpen<'sk> {
    sk: &'sk PrivateKey,
    params: ThresholdParams,
    st1: Round1State,
}

/// A session that has opened and awaits the peers' Round-2 messages.
pub struct AwaitingResponse<'sk> {
    sk: &'sk PrivateKey,
    params: ThresholdParams,
    st1: Round1State,
    st2: Round2State,
}

impl<'sk> SigningSession<'sk> {
    /// Opens a fresh session for one party.
    pub fn new(sk: &'sk PrivateKey, params: ThresholdParams) -> Self {
        SigningSession { sk, params }
    }

    /// Round 1. Consumes the session; the commitment digest is broadcast.
    pub fn commit<R: RngCore + CryptoRng>(
        self,
        rng: &mut R,
    ) -> (AwaitingOpen<'sk>, Round1Message) {
        let (commitment, st1) = round1(self.sk, &self.params, rng);
        let msg = Round1Message {
            sender: self.sk.id(),
            commitment,
        };
        (
            AwaitingOpen {
                sk: self.sk,
                params: self.params,
                st1,
            },
            msg,
        )
    }
}

impl<'sk> AwaitingOpen<'sk> {
    /// Round 2. `commitments` must hold every active signer's Round-1
    /// message in ascending signer order.
    pub fn open(
        self,
        act: u8,
        msg: &[u8],
        ctx: &[u8],
        commitments: &[Round1Message],
    ) -> Result<(AwaitingResponse<'sk>, Round2Message), Error> {
        debug_assert!(commitments.windows(2).all(|w| w[0].sender < w[1].sender));
        let hashes: Vec<[u8; 32]> = commitments.iter().map(|m| m.commitment).collect();
        let (opening, st2) = round2(self.sk, act, msg, ctx, &hashes, &self.st1)?;
        let out = Round2Message {
            sender: self.sk.id(),
            opening,
        };
        Ok((
            AwaitingResponse {
                sk: self.sk,
                params: self.params,
                st1: self.st1,
                st2,
            },
            out,
        ))
    }
}

impl<'sk> AwaitingResponse<'sk> {
    /// Round 3. Consumes the session; on success the response goes to
    /// the combiner, on a commitment mismatch the attempt is aborted.
    pub fn respond(self, openings: &[Round2Message]) -> Result<Round3Message, Error> {
        debug_assert!(openings.windows(2).all(|w| w[0].sender < w[1].sender));
        let opened: Vec<Vec<u8>> = openings.iter().map(|m| m.opening.clone()).collect();
        let response = round3(self.sk, &opened, &self.st1, &self.st2, &self.params)?;
        Ok(Round3Message {
            sender: self.sk.id(),
            response,
        })
    }
}

/// The attempt cap for the interactive driver.
const MAX_ATTEMPTS: usize = 570;

/// Runs the whole protocol locally over the given signer set until a
/// signature is produced.
///
/// `signers` must hold the active parties in ascending id order, matching
/// the bits of `act`. Each failed attempt discards all session state and
/// retries with fresh randomness.
pub fn sign_threshold<R: RngCore + CryptoRng>(
    rng: &mut R,
    pk: &PublicKey,
    signers: &[&PrivateKey],
    act: u8,
    msg: &[u8],
    ctx: &[u8],
    params: &ThresholdParams,
) -> Result<Signature, Error> {
    if ctx.len() > 255 {
        return Err(Error::ContextTooLong);
    }
    assert_eq!(
        act.count_ones(),
        params.t() as u32,
        "signer mask weight must equal T"
    );
    assert_eq!(signers.len(), params.t() as usize);

    for _attempt in 0..MAX_ATTEMPTS {
        let mut committed = Vec::with_capacity(signers.len());
        let mut msgs1 = Vec::with_capacity(signers.len());
        for &sk in signers {
            let (st, m1) = SigningSession::new(sk, *params).commit(rng);
            committed.push(st);
            msgs1.push(m1);
        }

        let mut opened = Vec::with_capacity(signers.len());
        let mut msgs2 = Vec::with_capacity(signers.len());
        for st in committed {
            let (st, m2) = st.open(act, msg, ctx, &msgs1)?;
            opened.push(st);
            msgs2.push(m2);
        }

        let mut msgs3 = Vec::with_capacity(signers.len());
        for st in opened {
            msgs3.push(st.respond(&msgs2)?);
        }

        let commitments: Vec<Vec<u8>> = msgs2.into_iter().map(|m| m.opening).collect();
        let responses: Vec<Vec<u8>> = msgs3.into_iter().map(|m| m.response).collect();
        if let Some(sig) = combine(pk, msg, ctx, &commitments, &responses, params) {
            return Ok(sig);
        }
    }
    Err(Error::RetryLimitExceeded)
}
