//! Deterministic Miller-Rabin primality test for 64-bit integers.
//!
//! The witness set {2, 325, 9375, 28178, 450775, 557157, 9780504, 1795265022}
//! (Jim Sinclair, 2011) refutes every odd composite below 2^64, so the test
//! never answers "probably": a `true` result is a proof of primality within
//! the `u64` domain.
//!
//! ## Algorithm
//!
//! Write n - 1 = 2^s * d with d odd. For each witness a, compute x = a^d mod n.
//! If x is 1 or n - 1 the witness is silent. Otherwise square x up to s - 1
//! times; reaching n - 1 silences the witness, and failing to reach it proves
//! n composite.

use crate::arith::{is_even, mul_mod, pow_mod};
use crate::baseline::is_prime_trial;
use crate::config::{DEFAULT_MR_SMALL_THRESHOLD, SieveConfig};

/// Witnesses sufficient for every n < 2^64.
pub const SINCLAIR_WITNESSES: [u64; 8] = [2, 325, 9375, 28178, 450775, 557157, 9780504, 1795265022];

/// First twelve primes; also deterministic for every n below 3.1e23.
/// Kept as an independent witness set for cross-checking.
pub const FIRST_TWELVE_PRIMES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Screened before the witness loop, so that witnesses reduced mod n never
/// all vanish on a small modulus.
const SMALL_PRIMES: [u64; 11] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Decide primality of `n` with the default small-input threshold.
pub fn is_prime_64(n: u64) -> bool {
    MillerRabin::default().is_prime(n)
}

/// Primality tester with a configurable trial-division cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MillerRabin {
    small_threshold: u64,
}

impl Default for MillerRabin {
    fn default() -> Self {
        Self {
            small_threshold: DEFAULT_MR_SMALL_THRESHOLD,
        }
    }
}

impl MillerRabin {
    pub fn new(small_threshold: u64) -> Self {
        Self { small_threshold }
    }

    pub fn from_config(config: &SieveConfig) -> Self {
        Self::new(config.mr_small_threshold)
    }

    pub fn is_prime(&self, n: u64) -> bool {
        if n < self.small_threshold {
            return is_prime_trial(n);
        }
        if n < 4 {
            return n >= 2;
        }
        if is_even(n) {
            return false;
        }
        for &p in &SMALL_PRIMES {
            if n == p {
                return true;
            }
            if n % p == 0 {
                return false;
            }
        }
        strong_probable_prime(n, &SINCLAIR_WITNESSES)
    }
}

/// Strong probable-prime test of odd `n > 2` against every witness in `witnesses`.
///
/// Each witness is reduced mod n first; a witness that vanishes mod n is
/// skipped. Returns false as soon as any witness proves n composite.
pub fn strong_probable_prime(n: u64, witnesses: &[u64]) -> bool {
    debug_assert!(n > 2 && !is_even(n));
    let n_minus_one = n - 1;
    let s = n_minus_one.trailing_zeros();
    let d = n_minus_one >> s;

    'witness: for &witness in witnesses {
        let a = witness % n;
        if a == 0 {
            continue;
        }
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_small_values() {
        assert!(!is_prime_64(0));
        assert!(!is_prime_64(1));
        assert!(is_prime_64(2));
        assert!(is_prime_64(3));
        assert!(!is_prime_64(4));
    }

    #[test]
    fn test_41_bit_prime() {
        assert!(is_prime_64(1_966_079_993_663));
    }

    #[test]
    fn test_composite_that_fools_small_bases() {
        // 3215031751 = 151 * 751 * 28351 is a strong pseudoprime to 2, 3, 5 and 7
        assert!(strong_probable_prime(3_215_031_751, &[2, 3, 5, 7]));
        assert!(!is_prime_64(3_215_031_751));
    }

    #[test]
    fn test_agrees_with_trial_division_up_to_2_20() {
        let tester = MillerRabin::new(0);
        for n in 0..(1u64 << 20) {
            assert_eq!(tester.is_prime(n), is_prime_trial(n), "n = {}", n);
        }
    }

    #[test]
    fn test_threshold_does_not_change_answers() {
        let eager = MillerRabin::new(0);
        let lazy = MillerRabin::new(1 << 16);
        for n in (0..200_000u64).step_by(7) {
            assert_eq!(eager.is_prime(n), lazy.is_prime(n), "n = {}", n);
        }
    }

    #[test]
    fn test_near_u64_max() {
        assert!(is_prime_64(18_446_744_073_709_551_557)); // 2^64 - 59
        assert!(!is_prime_64(u64::MAX));
        assert!(!is_prime_64(u64::MAX - 1));
    }

    #[test]
    fn test_strong_pseudoprimes_rejected() {
        // strong pseudoprimes to base 2
        for n in [2047, 3277, 4033, 4681, 8321, 1_373_653, 25_326_001] {
            assert!(!is_prime_64(n), "n = {}", n);
        }
        // strong pseudoprime to every prime base up to 23
        let n = 3_825_123_056_546_413_051;
        assert!(strong_probable_prime(n, &[2, 3, 5, 7, 11, 13, 17, 19, 23]));
        assert!(!is_prime_64(n));
    }

    #[test]
    fn test_carmichael_numbers_rejected() {
        for n in [561, 1105, 1729, 2465, 2821, 6601, 8911, 41041, 825_265] {
            assert!(!is_prime_64(n), "n = {}", n);
        }
    }

    #[test]
    fn test_witness_sets_agree_on_large_primes() {
        for p in [1_000_000_007u64, 998_244_353, 2_305_843_009_213_693_951] {
            assert!(is_prime_64(p));
            assert!(strong_probable_prime(p, &FIRST_TWELVE_PRIMES));
        }
    }
}
