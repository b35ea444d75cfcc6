use crate::crypto_utils::encrypt;
use crate::error::{SignError, SignatureError};
use crate::rsa::Key;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

// Signature: the encrypted characters of a message followed by the encrypted terminator.
// values always holds length + 1 entries; the last one is the encrypted terminator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Signature {
    values: Vec<i64>,
    length: usize,
}

impl Signature {
    /// Builds a signature from its values, taking ownership of them.
    /// values: length + 1 non-negative values (characters, then terminator)
    /// length: number of signed characters, terminator excluded
    pub fn new(values: Vec<i64>, length: usize) -> Result<Self, SignatureError> {
        if values.len() != length + 1 {
            return Err(SignatureError::LengthMismatch {
                length,
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v < 0) {
            return Err(SignatureError::NegativeValue { index, value });
        }
        Ok(Signature { values, length })
    }

    /// Builds a signature from borrowed values, copying them.
    pub fn from_slice(values: &[i64], length: usize) -> Result<Self, SignatureError> {
        Signature::new(values.to_vec(), length)
    }

    /// All stored values, terminator included.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Number of signed characters (the terminator is not counted).
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn into_values(self) -> Vec<i64> {
        self.values
    }
}

impl TryFrom<Vec<i64>> for Signature {
    type Error = SignatureError;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        let length = values.len().checked_sub(1).ok_or(SignatureError::LengthMismatch {
            length: 0,
            actual: 0,
        })?;
        Signature::new(values, length)
    }
}

impl From<Signature> for Vec<i64> {
    fn from(signature: Signature) -> Self {
        signature.into_values()
    }
}

/// Signs a message with a private key.
/// message: text to sign
/// secret: signer's private key (u, n)
pub fn sign(message: &str, secret: &Key) -> Result<Signature, SignError> {
    info!(
        "Signing start: message_len = {}, modulus = {}",
        message.len(),
        secret.modulus
    );
    debug!("sign: message = {:?}", message);
    let values = encrypt(message.as_bytes(), secret.exponent, secret.modulus).map_err(|e| {
        error!("sign: encryption failed: {}", e);
        e
    })?;
    let signature = Signature {
        values,
        length: message.len(),
    };
    info!("Signing done: {} values", signature.values.len());
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_utils::decrypt;
    use crate::error::CipherError;

    const PUBLIC: Key = Key {
        exponent: 17,
        modulus: 3233,
    };
    const SECRET: Key = Key {
        exponent: 2753,
        modulus: 3233,
    };

    #[test]
    fn test_sign_layout() {
        let signature = sign("hello", &SECRET).unwrap();
        assert_eq!(signature.len(), 5);
        assert_eq!(signature.values().len(), 6);
        assert_eq!(*signature.values().last().unwrap(), 0);
        let text = decrypt(signature.values(), 5, PUBLIC.exponent, PUBLIC.modulus).unwrap();
        assert_eq!(text, b"hello\0");
    }

    #[test]
    fn test_sign_empty_message() {
        let signature = sign("", &SECRET).unwrap();
        assert!(signature.is_empty());
        assert_eq!(signature.values(), &[0]);
    }

    #[test]
    fn test_sign_with_invalid_key() {
        let broken = Key::new(3, 0);
        assert!(matches!(
            sign("hello", &broken),
            Err(SignError::Cipher(CipherError::InvalidKey { .. }))
        ));
    }

    #[test]
    fn test_new_checks_length() {
        assert!(Signature::new(vec![1, 2, 0], 2).is_ok());
        assert_eq!(
            Signature::new(vec![1, 2, 0], 3),
            Err(SignatureError::LengthMismatch {
                length: 3,
                actual: 3
            })
        );
        assert_eq!(
            Signature::new(vec![1, -2, 0], 2),
            Err(SignatureError::NegativeValue {
                index: 1,
                value: -2
            })
        );
    }

    #[test]
    fn test_from_slice_copies() {
        let values = [5, 6, 0];
        let signature = Signature::from_slice(&values, 2).unwrap();
        let copy = signature.clone();
        assert_eq!(copy.values(), &values);
        assert_eq!(copy, signature);
    }

    #[test]
    fn test_try_from_vec() {
        let signature = Signature::try_from(vec![7, 8, 9, 0]).unwrap();
        assert_eq!(signature.len(), 3);
        assert!(Signature::try_from(Vec::<i64>::new()).is_err());
        assert_eq!(Vec::<i64>::from(signature), vec![7, 8, 9, 0]);
    }
}
