use base64::{prelude::BASE64_URL_SAFE_NO_PAD, DecodeError, Engine};

/// Decodes base64url, tolerating the `=` padding some encoders still emit.
pub(crate) fn decode_base64url(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    BASE64_URL_SAFE_NO_PAD.decode(encoded.trim().trim_end_matches('='))
}

pub(crate) fn encode_base64url(bytes: &[u8]) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}
