use thiserror::Error;

use crate::{
    encoding::{decode_base64url, encode_base64url},
    P256DH_KEY_LEN,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("application server key is not valid base64url: {0}")]
    Encoding(String),
    #[error("application server key must be {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("application server key is not an uncompressed P-256 point")]
    NotUncompressed,
}

/// The VAPID public key in the raw form `PushManager.subscribe` expects.
///
/// Configuration carries the key base64url-encoded; it is always decoded
/// before being handed to the push manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationServerKey(Vec<u8>);

impl ApplicationServerKey {
    pub fn from_base64url(encoded: &str) -> Result<Self, KeyError> {
        let bytes = decode_base64url(encoded).map_err(|e| KeyError::Encoding(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, KeyError> {
        if bytes.len() != P256DH_KEY_LEN {
            return Err(KeyError::Length {
                expected: P256DH_KEY_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != 0x04 {
            return Err(KeyError::NotUncompressed);
        }
        Ok(Self(bytes))
    }

    pub fn to_base64url(&self) -> String {
        encode_base64url(&self.0)
    }
}

impl AsRef<[u8]> for ApplicationServerKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
