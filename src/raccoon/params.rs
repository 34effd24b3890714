//! Parameters of the Gaussian-mask variant.

/// Height of the public matrix A.
pub const DIM_K: usize = 8;
/// Width of the public matrix A.
pub const DIM_ELL: usize = 9;
/// Hamming weight of a challenge polynomial.
pub const KAPPA: usize = 23;
/// log₂ of the ring degree.
pub const LOG_N: usize = 8;
/// Ring degree.
pub const DEGREE: usize = 1 << LOG_N;
/// The 49-bit NTT-friendly prime modulus.
pub const Q: u64 = 562_949_953_417_729;
/// Modulus of the ν-rounded domain.
pub const Q_NU: u64 = 4095;
/// Modulus of the ξ-rounded domain.
pub const Q_XI: u64 = 262_143;
/// Standard deviation of the key-noise Gaussian.
pub const SIGMA_E: f64 = 16384.0;
/// Tail cut of the key-noise Gaussian.
pub const BOUND_E: f64 = SIGMA_E * 15.0;
/// Standard deviation of the mask Gaussian.
pub const SIGMA_STAR: f64 = 2147483648.0;
/// Tail cut of the mask Gaussian.
pub const BOUND_STAR: f64 = SIGMA_STAR * 15.0;
/// Bits dropped when rounding the public key.
pub const XI: u32 = 31;
/// Bits dropped when rounding the aggregated commitment.
pub const NU: u32 = 37;
/// B², the squared ℓ₂ bound on (Δ, z) at verification.
pub const B_SQUARE: u128 = 5_032_343_939_160_168_088_238_817_280;
