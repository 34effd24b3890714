// -*- mode: rust; -*-
//
// This file is part of threshold-mldsa.
// See LICENSE for licensing information.

//! The FIPS-204 ML-DSA-44 signature wire format.

use crate::params::{
    BETA, C_TILDE_SIZE, GAMMA1, L, POLY_LE_GAMMA1_SIZE, SIGNATURE_SIZE,
};
use crate::packing;
use crate::vec::{VecK, VecL};

/// A 2420-byte ML-DSA-44 signature: c̃ ‖ pack(z) ‖ pack(hint).
#[derive(Clone, Copy)]
pub struct Signature(pub(crate) [u8; SIGNATURE_SIZE]);

impl Signature {
    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

impl From<[u8; SIGNATURE_SIZE]> for Signature {
    fn from(bytes: [u8; SIGNATURE_SIZE]) -> Signature {
        Signature(bytes)
    }
}

impl From<Signature> for [u8; SIGNATURE_SIZE] {
    fn from(sig: Signature) -> [u8; SIGNATURE_SIZE] {
        sig.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({:02x?}..)", &self.0[..8])
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = serde::Deserialize::deserialize(deserializer)?;
        let arr: [u8; SIGNATURE_SIZE] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("bad signature length"))?;
        Ok(Signature(arr))
    }
}

/// A signature in unpacked form, used while assembling or verifying.
pub(crate) struct UnpackedSignature {
    pub(crate) c_tilde: [u8; C_TILDE_SIZE],
    pub(crate) z: VecL,
    pub(crate) hint: VecK,
}

impl UnpackedSignature {
    pub(crate) fn pack(&self) -> Signature {
        let mut buf = [0u8; SIGNATURE_SIZE];
        buf[..C_TILDE_SIZE].copy_from_slice(&self.c_tilde);
        packing::pack_vec_le_gamma1(
            &self.z,
            &mut buf[C_TILDE_SIZE..C_TILDE_SIZE + L * POLY_LE_GAMMA1_SIZE],
        );
        packing::pack_hint(&self.hint, &mut buf[C_TILDE_SIZE + L * POLY_LE_GAMMA1_SIZE..]);
        Signature(buf)
    }

    /// Decodes and validates a signature; `None` means reject.
    ///
    /// Checks ‖z‖∞ < γ₁ − β and that the hint encoding is canonical, as
    /// the FIPS-204 verifier does before any arithmetic.
    pub(crate) fn unpack(sig: &Signature) -> Option<UnpackedSignature> {
        let buf = &sig.0;
        let mut c_tilde = [0u8; C_TILDE_SIZE];
        c_tilde.copy_from_slice(&buf[..C_TILDE_SIZE]);
        let z =
            packing::unpack_vec_le_gamma1(&buf[C_TILDE_SIZE..C_TILDE_SIZE + L * POLY_LE_GAMMA1_SIZE]);
        if z.exceeds(GAMMA1 - BETA) {
            return None;
        }
        let hint = packing::unpack_hint(&buf[C_TILDE_SIZE + L * POLY_LE_GAMMA1_SIZE..])?;
        Some(UnpackedSignature { c_tilde, z, hint })
    }
}
