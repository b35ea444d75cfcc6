use crate::constants::SIGNATURE_DELIMITER;
use crate::error::{EncodeError, ParseError};
use crate::protected::Protected;
use crate::rsa::Key;
use crate::signature::Signature;
use log::{debug, trace};
use std::fmt;
use std::str::FromStr;

/// Converts a key to its text form "(exponent,modulus)".
/// Only valid keys (see `Key::is_valid`) are accepted back by `str_to_key`.
pub fn key_to_str(key: &Key) -> String {
    format!("({},{})", key.exponent, key.modulus)
}

/// Parses a decimal integer, optionally negative. `i64::from_str` also
/// accepts a leading '+', which the text format does not.
fn parse_decimal(token: &str) -> Result<i64, ParseError> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidInteger(token.to_owned()));
    }
    token
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger(token.to_owned()))
}

/// Parses the key at the very start of `s`.
/// Returns the key and the byte index of its closing ')'.
fn parse_key_prefix(s: &str) -> Result<(Key, usize), ParseError> {
    if !s.starts_with('(') {
        return Err(ParseError::MissingDelimiter('('));
    }
    let close = s.find(')').ok_or(ParseError::MissingDelimiter(')'))?;
    let (exponent, modulus) = s[1..close]
        .split_once(',')
        .ok_or(ParseError::MissingDelimiter(','))?;
    let exponent = parse_decimal(exponent)?;
    let modulus = parse_decimal(modulus)?;
    let key = Key::new(exponent, modulus);
    if !key.is_valid() {
        return Err(ParseError::InvalidKey { exponent, modulus });
    }
    Ok((key, close))
}

/// Parses "(exponent,modulus)". Surrounding whitespace is ignored, anything else is rejected.
pub fn str_to_key(s: &str) -> Result<Key, ParseError> {
    let s = s.trim();
    let (key, close) = parse_key_prefix(s)?;
    let rest = &s[close + 1..];
    if !rest.is_empty() {
        return Err(ParseError::TrailingInput(rest.to_owned()));
    }
    trace!("str_to_key: {:?} -> {:?}", s, key);
    Ok(key)
}

/// Converts a signature to "#hex0#hex1#...#hexK#" (lowercase hex, terminator value included).
/// Empty signatures cannot be encoded.
pub fn signature_to_str(signature: &Signature) -> Result<String, EncodeError> {
    if signature.is_empty() {
        return Err(EncodeError::EmptySignature);
    }
    let mut result = String::with_capacity(1 + signature.values().len() * 10);
    result.push(SIGNATURE_DELIMITER);
    for value in signature.values() {
        result.push_str(&format!("{:x}", value));
        result.push(SIGNATURE_DELIMITER);
    }
    Ok(result)
}

fn parse_hex(token: &str) -> Result<i64, ParseError> {
    if !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(ParseError::InvalidHex(token.to_owned()));
    }
    // overflow is the only remaining failure
    i64::from_str_radix(token, 16).map_err(|_| ParseError::InvalidHex(token.to_owned()))
}

/// Decodes a signature occupying the whole of `s`.
/// Every token must be followed by a '#'; empty runs between delimiters are skipped.
fn parse_signature_exact(s: &str) -> Result<Signature, ParseError> {
    let (body, tail) = match s.rfind(SIGNATURE_DELIMITER) {
        Some(last) => (&s[..last], &s[last + 1..]),
        None => ("", s),
    };
    if !tail.is_empty() {
        return Err(ParseError::UnterminatedToken(tail.to_owned()));
    }

    let values = body
        .split(SIGNATURE_DELIMITER)
        .filter(|token| !token.is_empty())
        .map(parse_hex)
        .collect::<Result<Vec<i64>, ParseError>>()?;
    // the last value is the encrypted terminator
    let length = values
        .len()
        .checked_sub(1)
        .ok_or(ParseError::EmptySignature)?;
    Ok(Signature::new(values, length)?)
}

/// Parses a signature from the longest prefix of `s` made of [0-9a-f#].
pub fn str_to_signature(s: &str) -> Result<Signature, ParseError> {
    let end = s
        .bytes()
        .position(|b| !matches!(b, b'0'..=b'9' | b'a'..=b'f' | b'#'))
        .unwrap_or(s.len());
    trace!("str_to_signature: using {} of {} bytes", end, s.len());
    parse_signature_exact(&s[..end])
}

/// Converts a declaration to "<key> <message> <signature>".
pub fn protected_to_str(protected: &Protected) -> Result<String, EncodeError> {
    let signature = signature_to_str(protected.signature())?;
    Ok(format!(
        "{} {} {}",
        key_to_str(protected.key()),
        protected.message(),
        signature
    ))
}

/// Parses "<key> <message> <signature>".
///
/// The key ends at the first ')', the signature starts after the last space,
/// and the message is everything in between, taken verbatim.
pub fn str_to_protected(s: &str) -> Result<Protected, ParseError> {
    let (key, close) = parse_key_prefix(s)?;
    if s.as_bytes().get(close + 1) != Some(&b' ') {
        return Err(ParseError::MissingDelimiter(' '));
    }
    let message_start = close + 2;
    // signatures never contain spaces
    let last_space = s.rfind(' ').ok_or(ParseError::MissingDelimiter(' '))?;
    if last_space <= message_start {
        debug!(
            "str_to_protected: message span [{}, {}) is empty",
            message_start, last_space
        );
        return Err(ParseError::EmptyMessage);
    }

    let message = &s[message_start..last_space];
    let signature = parse_signature_exact(&s[last_space + 1..])?;
    debug!(
        "str_to_protected: key = {:?}, message_len = {}, signature_len = {}",
        key,
        message.len(),
        signature.len()
    );
    Ok(Protected::new(key, message, signature))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&key_to_str(self))
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        str_to_key(s)
    }
}

impl FromStr for Signature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        str_to_signature(s)
    }
}

impl FromStr for Protected {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        str_to_protected(s)
    }
}
