use crate::error::CipherError;
use crate::number_theory::modpow;
use crate::rsa::Key;
use log::{debug, error, trace};

// Implicit end-of-text marker appended to every encrypted stream
pub const TERMINATOR: u8 = 0;

fn check_key(exponent: i64, modulus: i64) -> Result<(), CipherError> {
    if !Key::new(exponent, modulus).is_valid() {
        error!(
            "invalid key: exponent = {}, modulus = {}",
            exponent, modulus
        );
        return Err(CipherError::InvalidKey { exponent, modulus });
    }
    Ok(())
}

/// Encrypts a byte stream value by value: c_i = m_i^exponent mod modulus.
/// text: plaintext bytes (the terminator is appended implicitly)
/// exponent, modulus: key values
///
/// The output holds text.len() + 1 values, the last one being the encrypted terminator.
pub fn encrypt(text: &[u8], exponent: i64, modulus: i64) -> Result<Vec<i64>, CipherError> {
    trace!(
        "encrypt: text_len = {}, exponent = {}, modulus = {}",
        text.len(),
        exponent,
        modulus
    );
    check_key(exponent, modulus)?;

    let size = text.len() + 1;
    let mut crypted: Vec<i64> = Vec::new();
    crypted
        .try_reserve_exact(size)
        .map_err(|_| CipherError::Allocation(size))?;
    crypted.extend(
        text.iter()
            .chain(std::iter::once(&TERMINATOR))
            .map(|&byte| modpow(i64::from(byte), exponent, modulus)),
    );
    debug!("encrypt: produced {} values", crypted.len());
    Ok(crypted)
}

/// Decrypts `count` characters plus the terminator.
/// crypted: encrypted values, exactly count + 1 of them
/// count: number of characters, terminator excluded
/// exponent, modulus: key values
///
/// Returns count + 1 bytes whose last byte is the terminator.
pub fn decrypt(
    crypted: &[i64],
    count: usize,
    exponent: i64,
    modulus: i64,
) -> Result<Vec<u8>, CipherError> {
    trace!(
        "decrypt: count = {}, exponent = {}, modulus = {}",
        count,
        exponent,
        modulus
    );
    check_key(exponent, modulus)?;
    if crypted.len() != count + 1 {
        debug!(
            "decrypt: {} values announced, {} present",
            count + 1,
            crypted.len()
        );
        return Err(CipherError::LengthMismatch {
            expected: count + 1,
            actual: crypted.len(),
        });
    }

    let mut text: Vec<u8> = Vec::new();
    text.try_reserve_exact(count + 1)
        .map_err(|_| CipherError::Allocation(count + 1))?;
    for (index, &value) in crypted.iter().enumerate() {
        let plain = modpow(value, exponent, modulus);
        let byte = u8::try_from(plain).map_err(|_| CipherError::NotAByte {
            index,
            value: plain,
        })?;
        text.push(byte);
    }

    if text.last() != Some(&TERMINATOR) {
        return Err(CipherError::MissingTerminator);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    // p = 61, q = 53: n = 3233, s = 17, u = 2753
    const N: i64 = 3233;
    const S: i64 = 17;
    const U: i64 = 2753;

    #[test]
    fn test_encrypt_appends_terminator() {
        let crypted = encrypt(b"hi", S, N).unwrap();
        assert_eq!(crypted.len(), 3);
        assert_eq!(crypted[0], modpow(i64::from(b'h'), S, N));
        assert_eq!(crypted[1], modpow(i64::from(b'i'), S, N));
        // 0^s = 0
        assert_eq!(crypted[2], 0);
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let message = b"Vote for candidate #3, please!";
        let crypted = encrypt(message, S, N).unwrap();
        let text = decrypt(&crypted, message.len(), U, N).unwrap();
        assert_eq!(&text[..message.len()], message);
        assert_eq!(text[message.len()], TERMINATOR);
    }

    #[test]
    fn test_encrypt_empty_text() {
        let crypted = encrypt(b"", S, N).unwrap();
        assert_eq!(crypted, vec![0]);
        assert_eq!(decrypt(&crypted, 0, U, N).unwrap(), vec![TERMINATOR]);
    }

    #[test]
    fn test_decrypt_length_mismatch() {
        let crypted = encrypt(b"abc", S, N).unwrap();
        assert_eq!(
            decrypt(&crypted, 2, U, N),
            Err(CipherError::LengthMismatch {
                expected: 3,
                actual: 4
            })
        );
        assert!(decrypt(&crypted, 4, U, N).is_err());
    }

    #[test]
    fn test_decrypt_missing_terminator() {
        // the last value decrypts to 'a' instead of the terminator
        let crypted = encrypt(b"a", S, N).unwrap();
        let forged = vec![crypted[0], crypted[0]];
        assert_eq!(
            decrypt(&forged, 1, U, N),
            Err(CipherError::MissingTerminator)
        );
    }

    #[test]
    fn test_invalid_keys_are_rejected() {
        assert_eq!(
            encrypt(b"a", S, 0),
            Err(CipherError::InvalidKey {
                exponent: S,
                modulus: 0
            })
        );
        assert!(encrypt(b"a", -1, N).is_err());
        assert!(decrypt(&[0], 0, U, -5).is_err());
    }
}
