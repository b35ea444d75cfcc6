// Default RSA public exponent, used whenever it is smaller than and coprime to phi
pub const DEFAULT_PUBLIC_EXPONENT: i64 = 65537;
// Miller-Rabin witness count used by key generation
pub const MILLER_RABIN_ROUNDS: usize = 20;
// Largest bit length of a prime candidate (2^62 - 1 still fits in i64)
pub const MAX_PRIME_BITS: u32 = 62;
// How many prime pairs are drawn before key generation gives up
pub const MAX_PRIME_PAIR_ATTEMPTS: usize = 64;
// Key primes must give a modulus above every byte value and p * q must fit in i64:
// 5 bits is the smallest size with two distinct primes whose product exceeds 255
pub const MIN_KEY_PRIME_BITS: u32 = 5;
pub const MAX_KEY_PRIME_BITS: u32 = 31;
// Smallest modulus that can sign any byte
pub const MIN_SIGNING_MODULUS: i64 = 256;
// Prime bit-length range offered by the CLI
pub const DEFAULT_LOW_SIZE: u32 = 12;
pub const DEFAULT_UP_SIZE: u32 = 16;
// Separator and terminator of signature tokens
pub const SIGNATURE_DELIMITER: char = '#';
