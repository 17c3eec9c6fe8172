//! Prime enumeration below a bound and primality of single 64-bit integers.
//!
//! - [`SieveState`]: segmented sieve of Eratosthenes whose per-segment prime
//!   records are min-heaps on the next strike position
//! - [`is_prime_64`]: deterministic Miller-Rabin over the whole `u64` domain
//! - [`baseline`]: naive sieve and trial division, used as reference oracles

pub mod arith;
pub mod baseline;
pub mod buffer;
pub mod config;
pub mod entry;
pub mod error;
pub mod miller_rabin;
pub mod segment;
pub mod segmented;

pub use config::SieveConfig;
pub use entry::Entry;
pub use error::{Error, ErrorKind, Result};
pub use miller_rabin::{MillerRabin, is_prime_64};
pub use segmented::{Primes, SieveState};
