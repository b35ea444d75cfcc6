use crate::constants::{
    DEFAULT_PUBLIC_EXPONENT, MAX_KEY_PRIME_BITS, MAX_PRIME_PAIR_ATTEMPTS, MILLER_RABIN_ROUNDS,
    MIN_KEY_PRIME_BITS, MIN_SIGNING_MODULUS,
};
use crate::error::KeyGenError;
use crate::number_theory::{extended_gcd, is_prime_naive, mod_inverse, random_prime_number};
use log::{debug, error, info, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

// RSA key: either a public key (s, n) or a private key (u, n).
// Which role a key plays is decided by the caller, not by a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    // exponent (s for a public key, u for a private key)
    pub exponent: i64,
    // modulus n = p * q
    pub modulus: i64,
}

impl Key {
    pub fn new(exponent: i64, modulus: i64) -> Self {
        Key { exponent, modulus }
    }

    /// A key can be used (and written back from text) when modulus >= 1 and exponent >= 0.
    pub fn is_valid(&self) -> bool {
        self.modulus >= 1 && self.exponent >= 0
    }
}

// RSA key pair sharing one modulus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public: Key,
    pub secret: Key,
}

/// Picks the public exponent for a given phi.
///
/// 65537 is used whenever it is below phi and coprime to it; otherwise the
/// smallest odd s >= 3 with s < phi and gcd(s, phi) == 1.
pub fn choose_public_exponent(phi: i64) -> Option<i64> {
    let coprime = |s: i64| extended_gcd(s, phi).0 == 1;
    if DEFAULT_PUBLIC_EXPONENT < phi && coprime(DEFAULT_PUBLIC_EXPONENT) {
        return Some(DEFAULT_PUBLIC_EXPONENT);
    }
    (3..phi).step_by(2).find(|&s| {
        trace!("choose_public_exponent: trying s = {}", s);
        coprime(s)
    })
}

/// Derives RSA key values from two distinct primes.
/// p, q: distinct primes
///
/// Returns (n, s, u): the modulus, the public exponent and the private exponent,
/// with s * u == 1 mod (p-1)(q-1).
pub fn generate_key_values(p: i64, q: i64) -> Result<(i64, i64, i64), KeyGenError> {
    debug!("generate_key_values: p = {}, q = {}", p, q);
    for x in [p, q] {
        if !is_prime_naive(x) {
            error!("generate_key_values: {} is not prime", x);
            return Err(KeyGenError::NotPrime(x));
        }
    }
    if p == q {
        error!("generate_key_values: p and q are both {}", p);
        return Err(KeyGenError::IdenticalPrimes(p));
    }

    let n = p
        .checked_mul(q)
        .ok_or(KeyGenError::ModulusOverflow { p, q })?;
    // Euler's totient φ(n) = (p-1)*(q-1)
    let phi = (p - 1) * (q - 1);
    debug!("generate_key_values: n = {}, phi = {}", n, phi);
    if phi <= 1 {
        error!("generate_key_values: degenerate phi = {}", phi);
        return Err(KeyGenError::DegenerateModulus(phi));
    }
    if n < MIN_SIGNING_MODULUS {
        warn!(
            "generate_key_values: modulus {} cannot carry every byte value, signatures may not verify",
            n
        );
    }

    let s = choose_public_exponent(phi).ok_or(KeyGenError::NoPublicExponent(phi))?;
    let u = mod_inverse(s, phi).ok_or(KeyGenError::NoPublicExponent(phi))?;
    debug!("generate_key_values: s = {}, u = {}", s, u);
    Ok((n, s, u))
}

/// Generates a key pair from two random primes.
/// low_size, up_size: bit-length range of the primes p and q
/// rng: random source
///
/// The modulus of the returned pair is always large enough to sign any byte.
pub fn init_pair_keys(
    low_size: u32,
    up_size: u32,
    rng: &mut impl Rng,
) -> Result<KeyPair, KeyGenError> {
    info!(
        "Key pair generation start: prime bits in [{}, {}]",
        low_size, up_size
    );
    if !(MIN_KEY_PRIME_BITS..=MAX_KEY_PRIME_BITS).contains(&up_size) {
        error!("init_pair_keys: unsupported prime size {}", up_size);
        return Err(KeyGenError::UnsupportedPrimeSize {
            up: up_size,
            min: MIN_KEY_PRIME_BITS,
            max: MAX_KEY_PRIME_BITS,
        });
    }

    let mut last = Err(KeyGenError::ModulusTooSmall(0));
    for attempt in 1..=MAX_PRIME_PAIR_ATTEMPTS {
        let p = random_prime_number(low_size, up_size, MILLER_RABIN_ROUNDS, rng)?;
        let q = random_prime_number(low_size, up_size, MILLER_RABIN_ROUNDS, rng)?;
        // p == q would make n a square
        if p == q {
            debug!("init_pair_keys: attempt {} drew p == q == {}", attempt, p);
            last = Err(KeyGenError::IdenticalPrimes(p));
            continue;
        }
        // checked here so small pairs do not trigger the generate_key_values warning
        if p * q < MIN_SIGNING_MODULUS {
            debug!("init_pair_keys: attempt {} gave modulus {}", attempt, p * q);
            last = Err(KeyGenError::ModulusTooSmall(p * q));
            continue;
        }

        let (n, s, u) = generate_key_values(p, q)?;
        let keypair = KeyPair {
            public: Key::new(s, n),
            secret: Key::new(u, n),
        };
        info!(
            "Key pair generation done: n = {} ({} bits), s = {}",
            n,
            64 - n.leading_zeros(),
            s
        );
        return Ok(keypair);
    }
    error!(
        "init_pair_keys: no usable prime pair after {} attempts",
        MAX_PRIME_PAIR_ATTEMPTS
    );
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number_theory::modpow;
    use crate::protected::Protected;
    use crate::signature::sign;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_key_values_textbook() {
        // p = 61, q = 53: phi = 3120 < 65537, so the smallest odd coprime exponent is 7
        let (n, s, u) = generate_key_values(61, 53).unwrap();
        assert_eq!(n, 3233);
        assert_eq!(s, 7);
        assert_eq!((s * u) % 3120, 1);
    }

    #[test]
    fn test_generate_key_values_prefers_65537() {
        let (p, q) = (1_000_003, 999_983);
        let (n, s, u) = generate_key_values(p, q).unwrap();
        assert_eq!(n, p * q);
        assert_eq!(s, DEFAULT_PUBLIC_EXPONENT);
        let phi = (p - 1) * (q - 1);
        assert_eq!(((s as i128 * u as i128) % phi as i128) as i64, 1);
    }

    #[test]
    fn test_generate_key_values_rejects_bad_inputs() {
        assert_eq!(generate_key_values(61, 61), Err(KeyGenError::IdenticalPrimes(61)));
        assert_eq!(generate_key_values(60, 53), Err(KeyGenError::NotPrime(60)));
        assert_eq!(generate_key_values(1, 53), Err(KeyGenError::NotPrime(1)));
        // phi = 1 * 2 = 2 leaves no candidate with 1 < s < phi
        assert_eq!(generate_key_values(2, 3), Err(KeyGenError::NoPublicExponent(2)));
        // the primes around 2^32 multiply past i64::MAX
        let (p, q) = (4_294_967_291, 4_294_967_311);
        assert_eq!(
            generate_key_values(p, q),
            Err(KeyGenError::ModulusOverflow { p, q })
        );
    }

    #[test]
    fn test_choose_public_exponent() {
        assert_eq!(choose_public_exponent(3120), Some(7));
        assert_eq!(choose_public_exponent(4), Some(3));
        assert_eq!(choose_public_exponent(2), None);
        assert_eq!(choose_public_exponent(1 << 40), Some(DEFAULT_PUBLIC_EXPONENT));
    }

    #[test]
    fn test_init_pair_keys_round_trip() {
        let mut rng = StdRng::seed_from_u64(0xdec1);
        for _ in 0..5 {
            let keypair = init_pair_keys(12, 16, &mut rng).unwrap();
            assert_eq!(keypair.public.modulus, keypair.secret.modulus);
            let n = keypair.public.modulus;
            for m in [0, 1, 2, 65, 255, n - 1] {
                let c = modpow(m, keypair.public.exponent, n);
                assert_eq!(modpow(c, keypair.secret.exponent, n), m);
            }
        }
    }

    #[test]
    fn test_init_pair_keys_large_primes() {
        let mut rng = StdRng::seed_from_u64(31);
        let keypair = init_pair_keys(30, 31, &mut rng).unwrap();
        let n = keypair.public.modulus;
        assert!(n > 1 << 58);
        let m = 0x7a;
        let c = modpow(m, keypair.secret.exponent, n);
        assert_eq!(modpow(c, keypair.public.exponent, n), m);
    }

    #[test]
    fn test_init_pair_keys_invalid_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            init_pair_keys(0, 8, &mut rng),
            Err(KeyGenError::Prime(_))
        ));
        assert!(matches!(
            init_pair_keys(10, 8, &mut rng),
            Err(KeyGenError::Prime(_))
        ));
    }

    #[test]
    fn test_init_pair_keys_rejects_unsupported_sizes() {
        let mut rng = StdRng::seed_from_u64(0);
        // primes below 16 cannot give a modulus above 255
        assert_eq!(
            init_pair_keys(2, 4, &mut rng),
            Err(KeyGenError::UnsupportedPrimeSize {
                up: 4,
                min: MIN_KEY_PRIME_BITS,
                max: MAX_KEY_PRIME_BITS
            })
        );
        // p * q could overflow i64
        assert_eq!(
            init_pair_keys(30, 40, &mut rng),
            Err(KeyGenError::UnsupportedPrimeSize {
                up: 40,
                min: MIN_KEY_PRIME_BITS,
                max: MAX_KEY_PRIME_BITS
            })
        );
    }

    #[test]
    fn test_init_pair_keys_small_primes_still_sign() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let keypair = init_pair_keys(2, 5, &mut rng).unwrap();
            assert!(keypair.public.modulus >= MIN_SIGNING_MODULUS);
            let signature = sign("hello", &keypair.secret).unwrap();
            let protected = Protected::new(keypair.public, "hello", signature);
            assert!(protected.verify(), "seed {}: {:?}", seed, keypair);
        }
    }
}
