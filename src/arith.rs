//! Modular arithmetic over `u64` moduli.
//!
//! Products are formed in `u128` so that `(n - 1)^2` never wraps for any
//! 64-bit modulus. A plain `a * b % n` in `u64` silently overflows once the
//! operands pass 2^32 and yields wrong residues.

/// `(a * b) mod m`, computed in 128-bit width.
#[inline]
pub fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    debug_assert!(m > 0);
    ((a as u128 * b as u128) % m as u128) as u64
}

/// `base^exp mod modulus` by square-and-multiply.
pub fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        exp >>= 1;
        base = mul_mod(base, base, modulus);
    }
    result
}

#[inline]
pub fn is_even(n: u64) -> bool {
    n & 1 == 0
}
