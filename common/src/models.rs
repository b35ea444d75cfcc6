use crate::error::{EncodeError, ParseError};
use crate::protected::Protected;
use crate::serialization::{key_to_str, signature_to_str, str_to_key, str_to_signature};
use serde::{Deserialize, Serialize};

/// Structure for CLI declaration input/output via JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliDeclarationPayload {
    /// Author's public key, "(exponent,modulus)"
    pub key: String,
    /// Declared message
    pub message: String,
    /// Signature, "#hex#...#"
    pub signature: String,
}

impl CliDeclarationPayload {
    pub fn from_protected(protected: &Protected) -> Result<Self, EncodeError> {
        Ok(CliDeclarationPayload {
            key: key_to_str(protected.key()),
            message: protected.message().to_owned(),
            signature: signature_to_str(protected.signature())?,
        })
    }

    pub fn to_protected(&self) -> Result<Protected, ParseError> {
        let key = str_to_key(&self.key)?;
        let signature = str_to_signature(&self.signature)?;
        Ok(Protected::new(key, self.message.clone(), signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::Key;
    use crate::signature::sign;
    use anyhow::Result;

    #[test]
    fn test_payload_json_round_trip() -> Result<()> {
        let secret = Key::new(2753, 3233);
        let public = Key::new(17, 3233);
        let protected = Protected::new(public, "payload test", sign("payload test", &secret)?);

        let payload = CliDeclarationPayload::from_protected(&protected)?;
        assert_eq!(payload.key, "(17,3233)");
        let json = serde_json::to_string_pretty(&payload)?;
        let parsed: CliDeclarationPayload = serde_json::from_str(&json)?;
        assert_eq!(parsed, payload);

        let restored = parsed.to_protected()?;
        assert_eq!(restored, protected);
        assert!(restored.verify());
        Ok(())
    }

    #[test]
    fn test_payload_with_bad_signature() {
        let payload = CliDeclarationPayload {
            key: "(17,3233)".to_owned(),
            message: "x".to_owned(),
            signature: "#zz#".to_owned(),
        };
        // "#zz#" keeps only "#" as its scanned prefix
        assert_eq!(payload.to_protected(), Err(ParseError::EmptySignature));
    }
}
