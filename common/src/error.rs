use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimeError {
    #[error("invalid prime size range [{low}, {up}] (expected 2 <= low <= up <= {max})")]
    InvalidRange { low: u32, up: u32, max: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyGenError {
    #[error("{0} is not a prime number")]
    NotPrime(i64),
    #[error("p and q must be distinct primes (both are {0})")]
    IdenticalPrimes(i64),
    #[error("modulus {p} * {q} does not fit in 64 bits")]
    ModulusOverflow { p: i64, q: i64 },
    #[error("degenerate modulus: phi = {0}")]
    DegenerateModulus(i64),
    #[error("no public exponent coprime to phi = {0}")]
    NoPublicExponent(i64),
    #[error("unsupported key prime size: up to {up} bits (expected {min} <= up <= {max})")]
    UnsupportedPrimeSize { up: u32, min: u32, max: u32 },
    #[error("modulus {0} is too small to sign every byte value")]
    ModulusTooSmall(i64),
    #[error("prime generation failed: {0}")]
    Prime(#[from] PrimeError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid key (exponent = {exponent}, modulus = {modulus})")]
    InvalidKey { exponent: i64, modulus: i64 },
    #[error("could not allocate {0} cipher slots")]
    Allocation(usize),
    #[error("cipher holds {actual} values but {expected} were announced")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("value at index {index} decrypts to {value}, which is not a byte")]
    NotAByte { index: usize, value: i64 },
    #[error("decrypted text does not end with the terminator")]
    MissingTerminator,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("encryption failed: {0}")]
    Cipher(#[from] CipherError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature of length {length} needs {} values, got {actual}", .length + 1)]
    LengthMismatch { length: usize, actual: usize },
    #[error("negative signature value {value} at index {index}")]
    NegativeValue { index: usize, value: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing '{0}' delimiter")]
    MissingDelimiter(char),
    #[error("invalid integer {0:?}")]
    InvalidInteger(String),
    #[error("invalid key values (exponent = {exponent}, modulus = {modulus})")]
    InvalidKey { exponent: i64, modulus: i64 },
    #[error("unexpected trailing input {0:?}")]
    TrailingInput(String),
    #[error("invalid hex token {0:?}")]
    InvalidHex(String),
    #[error("unterminated signature token {0:?}")]
    UnterminatedToken(String),
    #[error("signature holds no values")]
    EmptySignature,
    #[error("message span is empty")]
    EmptyMessage,
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot encode an empty signature")]
    EmptySignature,
}
