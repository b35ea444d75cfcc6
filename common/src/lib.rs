// Error handling
pub mod error;
// Number theory primitives (modpow, gcd, primality)
pub mod number_theory;
// RSA keys and key generation
pub mod rsa;
// Character-stream encryption
pub mod crypto_utils;
// Signatures
pub mod signature;
// Protected declarations
pub mod protected;
// Constants
pub mod constants;
// CLI models
pub mod models;
// Text codecs
pub mod serialization;

pub use error::{
    CipherError, EncodeError, KeyGenError, ParseError, PrimeError, SignError, SignatureError,
};
pub use models::CliDeclarationPayload;
pub use protected::{verify, Protected};
pub use rsa::{generate_key_values, init_pair_keys, Key, KeyPair};
pub use serialization::{
    key_to_str, protected_to_str, signature_to_str, str_to_key, str_to_protected,
    str_to_signature,
};
pub use signature::{sign, Signature};
