use proptest::prelude::*;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;

use threshold_mldsa::{
    keygen_from_seed, sign_threshold, PrivateKey, PublicKey, Signature, ThresholdParams,
    PUBLIC_KEY_SIZE,
};

/// A signature test-case, containing signature data and expected validity.
#[derive(Clone, Debug)]
struct SignatureCase {
    msg: Vec<u8>,
    ctx: Vec<u8>,
    sig: Signature,
    pk_bytes: [u8; PUBLIC_KEY_SIZE],
    is_valid: bool,
}

/// A modification to a test-case.
#[derive(Copy, Clone, Debug)]
enum Tweak {
    /// No-op, used to check that unchanged cases verify.
    None,
    /// Change the message the signature is defined for, invalidating it.
    ChangeMessage,
    /// Change the context string, invalidating the signature.
    ChangeContext,
    /// Change the public key the signature is defined for, invalidating it.
    ChangePubkey,
}

impl SignatureCase {
    fn new(rng_seed: u64, msg: Vec<u8>, ctx: Vec<u8>) -> Self {
        let mut rng = ChaChaRng::seed_from_u64(rng_seed);
        let params = ThresholdParams::new(2, 2).unwrap();
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&rng_seed.to_le_bytes());
        let (pk, sks) = keygen_from_seed(&seed, &params);
        let signers: Vec<&PrivateKey> = sks.iter().collect();
        let sig = sign_threshold(&mut rng, &pk, &signers, 0b11, &msg, &ctx, &params).unwrap();
        Self {
            msg,
            ctx,
            sig,
            pk_bytes: pk.to_bytes(),
            is_valid: true,
        }
    }

    // Check that signature verification succeeds or fails, as expected.
    fn check(&self) -> bool {
        // Round trip the signature and key through raw bytes to exercise
        // those code paths.
        let sig = Signature::from(*self.sig.as_bytes());
        let pk = match PublicKey::try_from(&self.pk_bytes[..]) {
            Ok(pk) => pk,
            Err(_) => return false,
        };
        self.is_valid == pk.verify(&self.msg, &self.ctx, &sig)
    }

    fn apply_tweak(&mut self, tweak: &Tweak) {
        match tweak {
            Tweak::None => {}
            Tweak::ChangeMessage => {
                self.msg.push(90);
                self.is_valid = false;
            }
            Tweak::ChangeContext => {
                self.ctx.push(90);
                self.is_valid = false;
            }
            Tweak::ChangePubkey => {
                // Perturb the packed t₁ so the key still parses; the
                // update never cycles back under repeated application.
                let j = 40 + (self.pk_bytes[2] & 31) as usize;
                self.pk_bytes[j] = self.pk_bytes[j].wrapping_add(1) | 0x01;
                self.is_valid = false;
            }
        }
    }
}

fn tweak_strategy() -> impl Strategy<Value = Tweak> {
    prop_oneof![
        10 => Just(Tweak::None),
        1 => Just(Tweak::ChangeMessage),
        1 => Just(Tweak::ChangeContext),
        1 => Just(Tweak::ChangePubkey),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn tweak_signature(
        tweaks in prop::collection::vec(tweak_strategy(), (0, 5)),
        rng_seed in any::<u64>(),
    ) {
        // Use a deterministic RNG so that test failures can be reproduced.
        let mut case = SignatureCase::new(rng_seed, b"test message".to_vec(), b"ctx".to_vec());

        for t in &tweaks {
            case.apply_tweak(t);
        }

        prop_assert!(case.check());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn keygen_is_deterministic_for_any_seed(seed_word in any::<u64>()) {
        let params = ThresholdParams::new(2, 3).unwrap();
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&seed_word.to_le_bytes());

        let (pk1, sks1) = keygen_from_seed(&seed, &params);
        let (pk2, sks2) = keygen_from_seed(&seed, &params);
        prop_assert_eq!(pk1.to_bytes(), pk2.to_bytes());
        for (a, b) in sks1.iter().zip(sks2.iter()) {
            prop_assert!(a.equals(b));
        }

        let mut buf1 = vec![0u8; params.private_key_size()];
        let mut buf2 = vec![0u8; params.private_key_size()];
        sks1[0].pack(&mut buf1);
        sks2[0].pack(&mut buf2);
        prop_assert_eq!(buf1, buf2);
    }
}
