use crate::constants::MAX_PRIME_BITS;
use crate::error::PrimeError;
use log::{debug, error, trace};
use num_integer::Integer;
use rand::Rng;

/// Modular product computed through a 128-bit intermediate.
/// The result always lies in [0, m).
#[inline]
pub fn mulmod(a: i64, b: i64, m: i64) -> i64 {
    (a as i128 * b as i128).rem_euclid(m as i128) as i64
}

/// Modular exponentiation by repeated squaring: base^exponent mod modulus.
///
/// Negative bases are reduced into [0, modulus) first.
///
/// # Panics
///
/// Panics if `modulus < 1` or `exponent < 0`. Callers handling untrusted keys
/// validate them beforehand (see [`crate::crypto_utils`]).
pub fn modpow(base: i64, exponent: i64, modulus: i64) -> i64 {
    assert!(modulus >= 1, "modulus must be positive");
    assert!(exponent >= 0, "exponent must be non-negative");
    if modulus == 1 {
        return 0;
    }
    let mut result = 1;
    let mut base = base.rem_euclid(modulus);
    let mut exponent = exponent;
    while exponent > 0 {
        // fold in the current square when the low bit is set
        if exponent & 1 == 1 {
            result = mulmod(result, base, modulus);
        }
        base = mulmod(base, base, modulus);
        exponent >>= 1;
    }
    result
}

/// Recursive variant of [`modpow`] with the same contract.
pub fn modpow_r(base: i64, exponent: i64, modulus: i64) -> i64 {
    assert!(modulus >= 1, "modulus must be positive");
    assert!(exponent >= 0, "exponent must be non-negative");

    fn step(base: i64, exponent: i64, modulus: i64) -> i64 {
        if exponent == 0 {
            return 1 % modulus;
        }
        let half = step(base, exponent / 2, modulus);
        let square = mulmod(half, half, modulus);
        if exponent.is_odd() {
            mulmod(square, base, modulus)
        } else {
            square
        }
    }

    step(base.rem_euclid(modulus), exponent, modulus)
}

/// Exponentiation by `exponent` successive multiplications.
/// Linear in the exponent; only meant as a reference for the fast versions.
pub fn modpow_naive(base: i64, exponent: i64, modulus: i64) -> i64 {
    assert!(modulus >= 1, "modulus must be positive");
    assert!(exponent >= 0, "exponent must be non-negative");
    let base = base.rem_euclid(modulus);
    let mut result = 1 % modulus;
    for _ in 0..exponent {
        result = mulmod(result, base, modulus);
    }
    result
}

/// Extended Euclidean algorithm.
/// Returns (g, u, v) with a*u + b*v == g, where g is gcd(a, b) for non-negative inputs
/// (and equal to it up to sign otherwise).
pub fn extended_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    // i128 keeps quotients such as i64::MIN / -1 representable
    let (mut old_r, mut r) = (i128::from(a), i128::from(b));
    let (mut old_u, mut u) = (1i128, 0i128);
    let (mut old_v, mut v) = (0i128, 1i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_u, u) = (u, old_u - q * u);
        (old_v, v) = (v, old_v - q * v);
    }
    (old_r as i64, old_u as i64, old_v as i64)
}

/// Inverse of `a` modulo `m`, in [0, m), when gcd(a, m) == 1.
pub fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    if m < 1 {
        return None;
    }
    let (g, u, _) = extended_gcd(a.rem_euclid(m), m);
    if g != 1 {
        return None;
    }
    Some(u.rem_euclid(m))
}

/// Exact primality test by trial division up to sqrt(n).
pub fn is_prime_naive(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n.is_even() {
        return false;
    }
    let mut d = 3;
    // d <= n / d avoids squaring d near the top of the i64 range
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Miller-Rabin probabilistic primality test.
/// n: candidate
/// rounds: number of random witnesses; a composite survives with probability <= 4^-rounds
/// rng: witness source
pub fn is_prime_miller(n: i64, rounds: usize, rng: &mut impl Rng) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n - 1 = 2^s * d with d odd
    let mut d = n - 1;
    let mut s = 0u32;
    while d.is_even() {
        d /= 2;
        s += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_range(2..=n - 2);
        let mut x = modpow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mulmod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        trace!("is_prime_miller: {} is a witness for the compositeness of {}", a, n);
        return false;
    }
    true
}

/// Draws a random prime whose bit length lies in [low_size, up_size].
/// low_size, up_size: bit lengths, 2 <= low_size <= up_size <= MAX_PRIME_BITS
/// rounds: Miller-Rabin rounds applied to every candidate
/// rng: candidate and witness source
///
/// Candidates are odd numbers drawn uniformly from [2^(low_size-1), 2^up_size - 1].
/// Very narrow ranges may contain few or no primes; choosing a range that
/// holds primes is up to the caller.
pub fn random_prime_number(
    low_size: u32,
    up_size: u32,
    rounds: usize,
    rng: &mut impl Rng,
) -> Result<i64, PrimeError> {
    if low_size < 2 || low_size > up_size || up_size > MAX_PRIME_BITS {
        error!(
            "random_prime_number: invalid size range [{}, {}]",
            low_size, up_size
        );
        return Err(PrimeError::InvalidRange {
            low: low_size,
            up: up_size,
            max: MAX_PRIME_BITS,
        });
    }
    let low = 1i64 << (low_size - 1);
    let high = (1i64 << up_size) - 1;

    let mut attempts = 0u64;
    loop {
        attempts += 1;
        // high is odd, so forcing the low bit keeps the candidate in range
        let candidate = rng.gen_range(low..=high) | 1;
        trace!("random_prime_number: candidate #{} = {}", attempts, candidate);
        if is_prime_miller(candidate, rounds, rng) {
            debug!(
                "random_prime_number: found {} after {} attempts in [{}, {}]",
                candidate, attempts, low, high
            );
            return Ok(candidate);
        }
    }
}
