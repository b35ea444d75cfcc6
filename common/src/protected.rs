use crate::crypto_utils::{decrypt, TERMINATOR};
use crate::rsa::Key;
use crate::signature::Signature;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A protected declaration: a message bound to its author's public key by a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protected {
    // author (public key)
    key: Key,
    // content of the declaration
    message: String,
    // signed message
    signature: Signature,
}

impl Protected {
    /// Creates a declaration, taking ownership of the message and signature.
    pub fn new(key: Key, message: impl Into<String>, signature: Signature) -> Self {
        Protected {
            key,
            message: message.into(),
            signature,
        }
    }

    /// Creates a declaration from borrowed parts, copying each of them.
    pub fn from_parts(key: &Key, message: &str, signature: &Signature) -> Self {
        Protected::new(*key, message.to_owned(), signature.clone())
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn verify(&self) -> bool {
        verify(self)
    }
}

/// Checks that the signature of a declaration decrypts to its message.
/// protected: declaration to check
///
/// Any length mismatch or decryption failure counts as an invalid declaration.
pub fn verify(protected: &Protected) -> bool {
    let message = protected.message.as_bytes();
    let key = &protected.key;
    info!(
        "Verification start: message_len = {}, signature_len = {}, modulus = {}",
        message.len(),
        protected.signature.len(),
        key.modulus
    );
    if protected.signature.len() != message.len() {
        info!("Verification result: false (length mismatch)");
        return false;
    }

    let truth = match decrypt(
        protected.signature.values(),
        message.len(),
        key.exponent,
        key.modulus,
    ) {
        Ok(truth) => truth,
        Err(e) => {
            debug!("verify: decryption failed: {}", e);
            info!("Verification result: false");
            return false;
        }
    };

    // the decrypted text carries the terminator, the message does not
    let verification = truth.split_last().map_or(false, |(terminator, body)| {
        body == message && *terminator == TERMINATOR
    });
    info!("Verification result: {}", verification);
    verification
}
