//! Samplers for the Gaussian-mask variant.

use rand_core::{CryptoRng, RngCore};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use super::ring::{Ring, RingPoly};

/// A uniform draw from (0, 1] with 53 bits of precision.
fn unit_uniform<R: RngCore>(rng: &mut R) -> f64 {
    ((rng.next_u64() >> 11) + 1) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Samples a polynomial with uniform coefficients in [0, q).
pub(crate) fn uniform_poly<R: RngCore + CryptoRng>(ring: &Ring, rng: &mut R) -> RingPoly {
    let bits = 64 - (ring.modulus() - 1).leading_zeros();
    let mask = (1u64 << bits) - 1;
    let mut p = ring.zero();
    for c in p.c.iter_mut() {
        *c = loop {
            let t = rng.next_u64() & mask;
            if t < ring.modulus() {
                break t;
            }
        };
    }
    p
}

/// Samples a discrete-Gaussian polynomial: Box–Muller draws rounded to
/// integers, rejecting beyond the tail bound, stored mod q.
pub(crate) fn gaussian_poly<R: RngCore + CryptoRng>(
    ring: &Ring,
    rng: &mut R,
    sigma: f64,
    bound: f64,
) -> RingPoly {
    let mut p = ring.zero();
    let mut spare: Option<f64> = None;
    for c in p.c.iter_mut() {
        let x = loop {
            let g = match spare.take() {
                Some(g) => g,
                None => {
                    let u1 = unit_uniform(rng);
                    let u2 = unit_uniform(rng);
                    let mag = (-2.0 * u1.ln()).sqrt();
                    let (sin, cos) = (std::f64::consts::TAU * u2).sin_cos();
                    spare = Some(mag * sin);
                    mag * cos
                }
            };
            let x = (g * sigma).round();
            if x.abs() <= bound {
                break x as i64;
            }
        };
        *c = x.rem_euclid(ring.modulus() as i64) as u64;
    }
    p
}

/// Expands a 32-byte digest into the weight-κ ±1 challenge polynomial,
/// returned in the NTT domain.
pub(crate) fn challenge(ring: &Ring, digest: &[u8; 32], kappa: usize) -> RingPoly {
    let mut h = Shake256::default();
    h.update(digest);
    let mut xof = h.finalize_xof();

    let mut sign_bytes = [0u8; 8];
    xof.read(&mut sign_bytes);
    let mut signs = u64::from_le_bytes(sign_bytes);

    let n = ring.degree();
    let mut c = ring.zero();
    let mut buf = [0u8; 1];
    for i in n - kappa..n {
        let j = loop {
            xof.read(&mut buf);
            if (buf[0] as usize) <= i {
                break buf[0] as usize;
            }
        };
        c.c[i] = c.c[j];
        c.c[j] = if signs & 1 == 1 { ring.modulus() - 1 } else { 1 };
        signs >>= 1;
    }
    ring.ntt(&mut c);
    c
}
