//! The recursive T-of-N share tree.
//!
//! Shares are indexed by path strings describing their position in the
//! tree: replication at T = 1, an additive N-of-N sharing at T = N, a
//! bit-indexed pair scheme at T = 2, and a left/right split with a fresh
//! two-way additive sharing otherwise. Reconstruction picks, per active
//! party, the single index whose summands add back up to the secret.

use std::collections::HashMap;

use rand_core::{CryptoRng, RngCore};

use super::ring::{Ring, RingPoly, RingVec};
use super::sampling::gaussian_poly;

/// The shares held by one party, keyed by tree index.
pub type PartyShares = HashMap<String, RingVec>;

fn gaussian_vec<R: RngCore + CryptoRng>(
    ring: &Ring,
    rng: &mut R,
    sigma: f64,
    bound: f64,
    dim: usize,
) -> RingVec {
    (0..dim)
        .map(|_| gaussian_poly(ring, rng, sigma, bound))
        .collect()
}

fn assert_contiguous(parties: &[usize]) {
    let (min, max) = (parties[0], parties[parties.len() - 1]);
    assert_eq!(max - min + 1, parties.len(), "party indices must be contiguous");
}

fn share_n<R: RngCore + CryptoRng>(
    ring: &Ring,
    rng: &mut R,
    sigma: f64,
    bound: f64,
    x: &[RingPoly],
    parties: &[usize],
    idx: &str,
) -> HashMap<usize, PartyShares> {
    assert_contiguous(parties);
    let min = parties[0];
    let mut d: HashMap<usize, PartyShares> =
        parties.iter().map(|&u| (u, PartyShares::new())).collect();

    let mut sum = ring.zero_vec(x.len());
    for &user in parties.iter().skip(1) {
        let share = gaussian_vec(ring, rng, sigma, bound, x.len());
        sum = ring.vec_add(&sum, &share);
        d.get_mut(&user)
            .unwrap()
            .insert(format!("{}N:{}", idx, user - min), share);
    }
    d.get_mut(&min)
        .unwrap()
        .insert(format!("{}N:0", idx), ring.vec_sub(x, &sum));
    d
}

fn recover_n(act: &[usize], parties: &[usize], idx: &str) -> HashMap<usize, String> {
    assert_eq!(act.len(), parties.len(), "all parties must be active");
    let min = act[0];
    act.iter()
        .map(|&u| (u, format!("{}N:{}", idx, u - min)))
        .collect()
}

fn share_2<R: RngCore + CryptoRng>(
    ring: &Ring,
    rng: &mut R,
    sigma: f64,
    bound: f64,
    x: &[RingPoly],
    parties: &[usize],
    idx: &str,
) -> HashMap<usize, PartyShares> {
    assert_contiguous(parties);
    let min = parties[0];
    let nbits = usize::BITS - (parties.len() - 1).leading_zeros();
    let mut d: HashMap<usize, PartyShares> =
        parties.iter().map(|&u| (u, PartyShares::new())).collect();

    for i in 0..nbits {
        let x0 = gaussian_vec(ring, rng, sigma, bound, x.len());
        let x1 = ring.vec_sub(x, &x0);
        let pair = [x0, x1];
        for &user in parties {
            let u = ((user - min) >> i) & 1;
            d.get_mut(&user)
                .unwrap()
                .insert(format!("{}B:{}:{}", idx, i, u), pair[u].clone());
        }
    }
    d
}

fn recover_2(act: &[usize], parties: &[usize], idx: &str) -> HashMap<usize, String> {
    let (user0, user1) = (act[0], act[act.len() - 1]);
    let v0 = user0 - parties[0];
    let v1 = user1 - parties[0];
    let mut i = 0;
    while ((v0 ^ v1) >> i) & 1 == 0 {
        i += 1;
    }
    HashMap::from([
        (user0, format!("{}B:{}:{}", idx, i, (v0 >> i) & 1)),
        (user1, format!("{}B:{}:{}", idx, i, (v1 >> i) & 1)),
    ])
}

fn merge(into: &mut HashMap<usize, PartyShares>, from: HashMap<usize, PartyShares>) {
    for (user, shares) in from {
        into.entry(user).or_default().extend(shares);
    }
}

/// Deals shares of `x` to `parties` (contiguous indices) for threshold `t`.
pub fn share<R: RngCore + CryptoRng>(
    ring: &Ring,
    rng: &mut R,
    sigma: f64,
    bound: f64,
    x: &[RingPoly],
    parties: &[usize],
    t: usize,
    idx: &str,
) -> HashMap<usize, PartyShares> {
    let n = parties.len();
    if t == 1 {
        return parties
            .iter()
            .map(|&u| (u, PartyShares::from([(idx.to_string(), x.to_vec())])))
            .collect();
    } else if t == n {
        return share_n(ring, rng, sigma, bound, x, parties, idx);
    } else if t == 2 {
        return share_2(ring, rng, sigma, bound, x, parties, idx);
    }

    let c = n >> 1;
    let (left, right) = parties.split_at(c);

    let min_k = t.saturating_sub(n - c);
    let max_k = c.min(t);

    let mut d: HashMap<usize, PartyShares> =
        parties.iter().map(|&u| (u, PartyShares::new())).collect();
    for k in min_k..=max_k {
        let idx_l = format!("{}L|{}|", idx, k);
        let idx_r = format!("{}R|{}|", idx, t - k);
        if k == 0 {
            merge(&mut d, share(ring, rng, sigma, bound, x, right, t, &idx_r));
        } else if k == t {
            merge(&mut d, share(ring, rng, sigma, bound, x, left, t, &idx_l));
        } else {
            let x0 = gaussian_vec(ring, rng, sigma, bound, x.len());
            let x1 = ring.vec_sub(x, &x0);
            merge(&mut d, share(ring, rng, sigma, bound, &x0, left, k, &idx_l));
            merge(&mut d, share(ring, rng, sigma, bound, &x1, right, t - k, &idx_r));
        }
    }
    d
}

/// For a sorted active set, the share index each active party must use;
/// the indexed shares sum to the shared secret.
pub fn recover(act: &[usize], parties: &[usize], idx: &str) -> HashMap<usize, String> {
    let mut act = act.to_vec();
    act.sort_unstable();
    let t = act.len();
    let n = parties.len();

    if t == 1 {
        return act.iter().map(|&u| (u, idx.to_string())).collect();
    } else if t == n {
        return recover_n(&act, parties, idx);
    } else if t == 2 {
        return recover_2(&act, parties, idx);
    }

    let c = n >> 1;
    let (left, right) = parties.split_at(c);
    let act_l: Vec<usize> = act.iter().copied().filter(|u| left.contains(u)).collect();
    let act_r: Vec<usize> = act.iter().copied().filter(|u| right.contains(u)).collect();

    let k = act_l.len();
    let idx_l = format!("{}L|{}|", idx, k);
    let idx_r = format!("{}R|{}|", idx, t - k);

    if k == 0 {
        recover(&act, right, &idx_r)
    } else if k == t {
        recover(&act, left, &idx_l)
    } else {
        let mut map = recover(&act_l, left, &idx_l);
        map.extend(recover(&act_r, right, &idx_r));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raccoon::params::{DEGREE, Q, SIGMA_E};
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn subsets(n: usize, t: usize) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for mask in 0u32..1 << n {
            if mask.count_ones() as usize == t {
                out.push((0..n).filter(|i| mask & (1 << i) != 0).collect());
            }
        }
        out
    }

    #[test]
    fn every_active_set_reconstructs() {
        let ring = Ring::new(DEGREE, Q).unwrap();
        let mut rng = ChaChaRng::seed_from_u64(41);
        let bound = SIGMA_E * 15.0;

        for (t, n) in [(1, 3), (2, 4), (3, 5), (5, 5), (3, 4)] {
            let parties: Vec<usize> = (0..n).collect();
            let x: RingVec = (0..3)
                .map(|_| gaussian_poly(&ring, &mut rng, SIGMA_E, bound))
                .collect();
            let dealt = share(&ring, &mut rng, SIGMA_E, bound, &x, &parties, t, "");

            for act in subsets(n, t) {
                let indices = recover(&act, &parties, "");
                let mut sum = ring.zero_vec(x.len());
                for &user in &act {
                    let share = &dealt[&user][&indices[&user]];
                    sum = ring.vec_add(&sum, share);
                }
                assert_eq!(sum, x, "t={} n={} act={:?}", t, n, act);
            }
        }
    }
}
