//! Baseline prime finders.
//!
//! These are the straightforward algorithms the segmented sieve is measured
//! against. They double as reference oracles in tests.

use crate::miller_rabin::MillerRabin;

/// Trial division: `n` has no divisor in `[2, sqrt(n)]`.
pub fn is_prime_trial(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    // `i <= n / i` instead of `i * i <= n` so large n cannot overflow
    while i <= n / i {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// Basic Sieve of Eratosthenes over a full array.
///
/// Returns every prime strictly below `limit`.
/// - Time complexity: O(n log log n)
/// - Space complexity: O(n) - 1 byte per number
pub fn simple_sieve(limit: u64) -> Vec<u64> {
    if limit < 3 {
        return vec![];
    }
    let limit = limit as usize;

    let mut is_prime = vec![true; limit];
    is_prime[0] = false;
    is_prime[1] = false;

    let mut i = 2;
    while i * i < limit {
        if is_prime[i] {
            let mut j = i * i;
            while j < limit {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }

    is_prime
        .iter()
        .enumerate()
        .filter_map(|(num, &prime)| if prime { Some(num as u64) } else { None })
        .collect()
}

/// Odd-only Sieve of Eratosthenes, counting primes strictly below `limit`.
///
/// - Index mapping: is_prime[i] represents the number (2*i + 3)
/// - Half the memory of `simple_sieve`
pub fn count_odd_sieve(limit: u64) -> usize {
    if limit < 3 {
        return 0;
    }
    if limit == 3 {
        return 1;
    }
    let limit = limit as usize;

    // odd numbers 3, 5, ..., below limit
    let size = (limit - 2) / 2;
    let mut is_prime = vec![true; size];

    let mut i = 0;
    loop {
        let p = 2 * i + 3;
        if p * p >= limit {
            break;
        }
        if is_prime[i] {
            let mut j = (p * p - 3) / 2;
            while j < size {
                is_prime[j] = false;
                j += p;
            }
        }
        i += 1;
    }

    // +1 for 2
    1 + is_prime.iter().filter(|&&p| p).count()
}

/// Count primes strictly below `limit` by testing each candidate with trial division.
pub fn count_by_trial_division(limit: u64) -> usize {
    (0..limit).filter(|&n| is_prime_trial(n)).count()
}

/// Count primes strictly below `limit` by testing each candidate with `tester`.
pub fn count_by_primality_test(limit: u64, tester: &MillerRabin) -> usize {
    (0..limit).filter(|&n| tester.is_prime(n)).count()
}
