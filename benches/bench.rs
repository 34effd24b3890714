use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use threshold_mldsa::{
    combine, keygen_from_seed, round1, round2, round3, sign_threshold, PrivateKey,
    ThresholdParams,
};

fn bench_keygen(c: &mut Criterion) {
    let mut group = c.benchmark_group("Key generation");
    for (t, n) in [(2u8, 2u8), (2, 3), (3, 5), (4, 6)] {
        let params = ThresholdParams::new(t, n).unwrap();
        group.bench_with_input(
            BenchmarkId::new("keygen_from_seed", format!("{}-of-{}", t, n)),
            &params,
            |b, params| b.iter(|| keygen_from_seed(&[1u8; 32], params)),
        );
    }
    group.finish();
}

fn bench_rounds(c: &mut Criterion) {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&[2u8; 32], &params);
    let mut rng = ChaChaRng::seed_from_u64(1);

    let mut group = c.benchmark_group("Signing rounds, 2-of-2");
    group.bench_function("round1", |b| {
        b.iter(|| round1(&sks[0], &params, &mut rng))
    });

    // One fixed attempt's worth of messages for the later rounds.
    let mut digests = Vec::new();
    let mut st1s = Vec::new();
    for sk in &sks {
        let (d, st1) = round1(sk, &params, &mut rng);
        digests.push(d);
        st1s.push(st1);
    }
    group.bench_function("round2", |b| {
        b.iter(|| round2(&sks[0], 0b11, b"bench", &[], &digests, &st1s[0]).unwrap())
    });

    let mut openings = Vec::new();
    let mut st2s = Vec::new();
    for (sk, st1) in sks.iter().zip(st1s.iter()) {
        let (o, st2) = round2(sk, 0b11, b"bench", &[], &digests, st1).unwrap();
        openings.push(o);
        st2s.push(st2);
    }
    group.bench_function("round3", |b| {
        b.iter(|| round3(&sks[0], &openings, &st1s[0], &st2s[0], &params).unwrap())
    });

    let responses: Vec<Vec<u8>> = sks
        .iter()
        .zip(st1s.iter())
        .zip(st2s.iter())
        .map(|((sk, st1), st2)| round3(sk, &openings, st1, st2, &params).unwrap())
        .collect();
    group.bench_function("combine", |b| {
        b.iter(|| combine(&pk, b"bench", &[], &openings, &responses, &params))
    });
    group.finish();
}

fn bench_sign_and_verify(c: &mut Criterion) {
    let params = ThresholdParams::new(2, 2).unwrap();
    let (pk, sks) = keygen_from_seed(&[3u8; 32], &params);
    let signers: Vec<&PrivateKey> = sks.iter().collect();
    let mut rng = ChaChaRng::seed_from_u64(2);

    let mut group = c.benchmark_group("End to end, 2-of-2");
    group.sample_size(10);
    group.bench_function("sign_threshold", |b| {
        b.iter(|| sign_threshold(&mut rng, &pk, &signers, 0b11, b"bench", &[], &params).unwrap())
    });

    let sig = sign_threshold(&mut rng, &pk, &signers, 0b11, b"bench", &[], &params).unwrap();
    group.bench_function("verify", |b| b.iter(|| pk.verify(b"bench", &[], &sig)));
    group.finish();
}

criterion_group!(benches, bench_keygen, bench_rounds, bench_sign_and_verify);
criterion_main!(benches);
