use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use threshold_mldsa::{
    combine, keygen_from_seed, round1, round2, round3, sign_threshold, Error, PrivateKey,
    PublicKey, Signature, ThresholdParams,
};

fn seed(v: u64) -> [u8; 32] {
    let mut s = [0u8; 32];
    s[..8].copy_from_slice(&v.to_le_bytes());
    s
}

/// One full signing attempt over the given signers, mirroring the wire
/// flow: gossip digests, gossip openings, gossip responses, combine.
fn attempt(
    rng: &mut ChaChaRng,
    pk: &PublicKey,
    signers: &[&PrivateKey],
    act: u8,
    msg: &[u8],
    ctx: &[u8],
    params: &ThresholdParams,
) -> Option<Signature> {
    let mut digests = Vec::new();
    let mut st1s = Vec::new();
    for sk in signers {
        let (digest, st1) = round1(sk, params, rng);
        digests.push(digest);
        st1s.push(st1);
    }

    let mut openings = Vec::new();
    let mut st2s = Vec::new();
    for (sk, st1) in signers.iter().zip(st1s.iter()) {
        let (opening, st2) = round2(sk, act, msg, ctx, &digests, st1).unwrap();
        openings.push(opening);
        st2s.push(st2);
    }

    let mut responses = Vec::new();
    for ((sk, st1), st2) in signers.iter().zip(st1s.iter()).zip(st2s.iter()) {
        responses.push(round3(sk, &openings, st1, st2, params).unwrap());
    }

    combine(pk, msg, ctx, &openings, &responses, params)
}

#[test]
fn s1_two_of_two_produces_a_verifying_signature() {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&seed(1), &params);
    let signers: Vec<&PrivateKey> = sks.iter().collect();
    let mut rng = ChaChaRng::seed_from_u64(100);

    let msg = [0u8; 8];
    let ctx = [0u8; 8];
    let mut produced = None;
    for _ in 0..100 {
        if let Some(sig) = attempt(&mut rng, &pk, &signers, 0b11, &msg, &ctx, &params) {
            produced = Some(sig);
            break;
        }
    }
    let sig = produced.expect("no signature within 100 attempts");
    assert!(pk.verify(&msg, &ctx, &sig));
    assert!(!pk.verify(b"other", &ctx, &sig));
}

#[test]
fn s2_seed_and_message_grid_with_key_round_trips() {
    let params = ThresholdParams::new(2, 2).unwrap();
    let mut rng = ChaChaRng::seed_from_u64(200);

    for i in 0..30u64 {
        let (pk, sks) = keygen_from_seed(&seed(i), &params);

        let pk2 = PublicKey::try_from(&pk.to_bytes()[..]).unwrap();
        assert_eq!(pk, pk2);

        let mut skb = vec![0u8; params.private_key_size()];
        sks[0].pack(&mut skb);
        let sk2 = PrivateKey::unpack(&skb).unwrap();
        assert!(sks[0].equals(&sk2));
        assert!(!sks[0].equals(&sks[1]));

        let signers: Vec<&PrivateKey> = sks.iter().collect();
        for j in 0..10u64 {
            let msg = j.to_le_bytes();
            let sig = sign_threshold(&mut rng, &pk, &signers, 0b11, &msg, &[], &params).unwrap();
            assert!(pk.verify(&msg, &[], &sig), "seed {} msg {}", i, j);
        }
    }
}

#[test]
fn s3_every_two_of_three_signer_set_signs_for_the_same_key() {
    let params = ThresholdParams::new(2, 3).unwrap();
    let (pk, sks) = keygen_from_seed(&seed(7), &params);
    let mut rng = ChaChaRng::seed_from_u64(300);

    let msg = b"signer sets";
    for act in [0b011u8, 0b101, 0b110] {
        let signers: Vec<&PrivateKey> = sks
            .iter()
            .filter(|sk| act & (1 << sk.id()) != 0)
            .collect();
        let sig = sign_threshold(&mut rng, &pk, &signers, act, msg, &[], &params).unwrap();
        assert!(pk.verify(msg, &[], &sig), "act {:#05b}", act);
    }
}

#[test]
fn larger_configurations_sign_and_verify() {
    let mut rng = ChaChaRng::seed_from_u64(350);
    for (t, n, act) in [(3u8, 3u8, 0b111u8), (3, 4, 0b1101)] {
        let params = ThresholdParams::new(t, n).unwrap();
        let (pk, sks) = keygen_from_seed(&seed(1000 + n as u64), &params);
        let signers: Vec<&PrivateKey> = sks
            .iter()
            .filter(|sk| act & (1 << sk.id()) != 0)
            .collect();
        let sig = sign_threshold(&mut rng, &pk, &signers, act, b"larger", &[], &params).unwrap();
        assert!(pk.verify(b"larger", &[], &sig), "{}-of-{}", t, n);
    }
}

#[test]
fn malformed_public_key_bytes_are_rejected() {
    assert_eq!(
        PublicKey::try_from(&[0u8; 100][..]).unwrap_err(),
        Error::MalformedPublicKey
    );
    assert_eq!(
        PrivateKey::unpack(&[0u8; 130]).unwrap_err(),
        Error::MalformedPrivateKey
    );
}

#[test]
fn s4_tampered_context_does_not_verify() {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&seed(4), &params);
    let signers: Vec<&PrivateKey> = sks.iter().collect();
    let mut rng = ChaChaRng::seed_from_u64(400);

    let msg = b"ctx binding";
    let sig = sign_threshold(&mut rng, &pk, &signers, 0b11, msg, &[0x41], &params).unwrap();
    assert!(pk.verify(msg, &[0x41], &sig));
    assert!(!pk.verify(msg, &[0x42], &sig));
    assert!(!pk.verify(msg, &[], &sig));
}

#[test]
fn s5_overlong_context_is_rejected() {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&seed(5), &params);
    let mut rng = ChaChaRng::seed_from_u64(500);

    let ctx = [0u8; 256];
    let (digest, st1) = round1(&sks[0], &params, &mut rng);
    assert_eq!(
        round2(&sks[0], 0b11, b"msg", &ctx, &[digest], &st1).unwrap_err(),
        Error::ContextTooLong
    );

    let signers: Vec<&PrivateKey> = sks.iter().collect();
    assert_eq!(
        sign_threshold(&mut rng, &pk, &signers, 0b11, b"msg", &ctx, &params).unwrap_err(),
        Error::ContextTooLong
    );
}

#[test]
fn s6_single_party_path_produces_plain_mldsa() {
    let params = ThresholdParams::single();
    let (pk, sks) = keygen_from_seed(&seed(6), &params);
    assert_eq!(sks.len(), 1);

    let msg = b"degenerate";
    let ctx = b"path";
    let sig = sks[0].sign(msg, ctx, &[0u8; 32]).unwrap();
    assert!(pk.verify(msg, ctx, &sig));
    assert!(!pk.verify(msg, b"paths", &sig));

    // The deterministic variant reproduces itself.
    let sig2 = sks[0].sign(msg, ctx, &[0u8; 32]).unwrap();
    assert_eq!(sig.as_bytes()[..], sig2.as_bytes()[..]);

    // And an overlong context errors out.
    assert_eq!(
        sks[0].sign(msg, &[0u8; 256], &[0u8; 32]).unwrap_err(),
        Error::ContextTooLong
    );
}

#[cfg(feature = "serde")]
#[test]
fn wire_types_serde_round_trip() {
    use threshold_mldsa::Round1Message;

    let msg = Round1Message {
        sender: 1,
        commitment: [7u8; 32],
    };
    let bytes = bincode::serialize(&msg).unwrap();
    let back: Round1Message = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back.sender, msg.sender);
    assert_eq!(back.commitment, msg.commitment);

    let params = ThresholdParams::new(3, 5).unwrap();
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(serde_json::from_str::<ThresholdParams>(&json).unwrap(), params);

    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&seed(11), &params);
    let signers: Vec<&PrivateKey> = sks.iter().collect();
    let mut rng = ChaChaRng::seed_from_u64(1100);
    let sig = sign_threshold(&mut rng, &pk, &signers, 0b11, b"serde", &[], &params).unwrap();
    let sig2: Signature = bincode::deserialize(&bincode::serialize(&sig).unwrap()).unwrap();
    assert_eq!(sig.as_bytes()[..], sig2.as_bytes()[..]);
    assert!(pk.verify(b"serde", &[], &sig2));
}

#[test]
fn combine_needs_at_least_threshold_responses() {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&seed(8), &params);
    let signers: Vec<&PrivateKey> = sks.iter().collect();
    let mut rng = ChaChaRng::seed_from_u64(800);

    let mut digests = Vec::new();
    let mut st1s = Vec::new();
    for sk in &signers {
        let (d, st1) = round1(sk, &params, &mut rng);
        digests.push(d);
        st1s.push(st1);
    }
    let mut openings = Vec::new();
    let mut st2s = Vec::new();
    for (sk, st1) in signers.iter().zip(st1s.iter()) {
        let (o, st2) = round2(sk, 0b11, b"m", &[], &digests, st1).unwrap();
        openings.push(o);
        st2s.push(st2);
    }
    let response = round3(&sks[0], &openings, &st1s[0], &st2s[0], &params).unwrap();

    assert!(combine(&pk, b"m", &[], &openings, &[response], &params).is_none());
}

#[test]
fn round3_aborts_on_a_tampered_opening() {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (_pk, sks) = keygen_from_seed(&seed(9), &params);
    let signers: Vec<&PrivateKey> = sks.iter().collect();
    let mut rng = ChaChaRng::seed_from_u64(900);

    let mut digests = Vec::new();
    let mut st1s = Vec::new();
    for sk in &signers {
        let (d, st1) = round1(sk, &params, &mut rng);
        digests.push(d);
        st1s.push(st1);
    }
    let mut openings = Vec::new();
    let mut st2s = Vec::new();
    for (sk, st1) in signers.iter().zip(st1s.iter()) {
        let (o, st2) = round2(sk, 0b11, b"m", &[], &digests, st1).unwrap();
        openings.push(o);
        st2s.push(st2);
    }

    openings[1][17] ^= 0xff;
    assert_eq!(
        round3(&sks[0], &openings, &st1s[0], &st2s[0], &params).unwrap_err(),
        Error::WrongCommitment
    );
}
