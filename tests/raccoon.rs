use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use threshold_mldsa::raccoon::{finalize, keygen, round1, round2, round3, verify};

fn sign_once(t: usize, n: usize, act: &[usize], mu: &[u8], rng_seed: u64) {
    let mut rng = ChaChaRng::seed_from_u64(rng_seed);
    let (pk, sks) = keygen(&mut rng, t, n).unwrap();

    let mut msgs1 = BTreeMap::new();
    let mut st1s = BTreeMap::new();
    for &id in act {
        let (digest, st1) = round1(&pk, id, &mut rng);
        msgs1.insert(id, digest);
        st1s.insert(id, st1);
    }

    let mut msgs2 = BTreeMap::new();
    let mut st2s = BTreeMap::new();
    for &id in act {
        let (opening, st2) = round2(&msgs1, st1s.remove(&id).unwrap(), act);
        msgs2.insert(id, opening);
        st2s.insert(id, st2);
    }

    let mut msgs3 = BTreeMap::new();
    for &id in act {
        let response = round3(&pk, &sks[id], &msgs2, &st2s[&id], mu, n).unwrap();
        msgs3.insert(id, response);
    }

    let sig = finalize(&pk, &msgs2, &msgs3, mu).unwrap();
    assert!(verify(&pk, &sig, mu));
    assert!(!verify(&pk, &sig, b"a different message"));
}

#[test]
fn two_of_three_signs_and_verifies() {
    sign_once(2, 3, &[0, 2], b"gaussian variant message", 51);
}

#[test]
fn full_set_signs_and_verifies() {
    sign_once(3, 3, &[0, 1, 2], b"all parties", 52);
}

#[test]
fn three_of_five_signs_and_verifies() {
    sign_once(3, 5, &[1, 2, 4], b"three of five", 53);
}

#[test]
fn tampered_response_fails_verification() {
    let mut rng = ChaChaRng::seed_from_u64(54);
    let (pk, sks) = keygen(&mut rng, 2, 2).unwrap();
    let act = [0usize, 1];
    let mu = b"tamper";

    let mut msgs1 = BTreeMap::new();
    let mut st1s = BTreeMap::new();
    for &id in &act {
        let (digest, st1) = round1(&pk, id, &mut rng);
        msgs1.insert(id, digest);
        st1s.insert(id, st1);
    }
    let mut msgs2 = BTreeMap::new();
    let mut st2s = BTreeMap::new();
    for &id in &act {
        let (opening, st2) = round2(&msgs1, st1s.remove(&id).unwrap(), &act);
        msgs2.insert(id, opening);
        st2s.insert(id, st2);
    }
    let mut msgs3 = BTreeMap::new();
    for &id in &act {
        msgs3.insert(id, round3(&pk, &sks[id], &msgs2, &st2s[&id], mu, 2).unwrap());
    }

    // Corrupt one response coefficient; the challenge no longer matches.
    msgs3.get_mut(&1).unwrap()[3] ^= 0x40;
    let sig = finalize(&pk, &msgs2, &msgs3, mu).unwrap();
    assert!(!verify(&pk, &sig, mu));
}
