/// URL-safe transport encoding for purpose tokens
///
/// Raw credential-provider tokens are not query-string safe, so every token
/// that travels inside an emailed link goes through this codec. This is a
/// pure format adapter; validity of the token itself is judged elsewhere.
use crate::error::{ApiError, ApiResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Encode a raw token for embedding in a query string
pub fn encode(raw: &str) -> String {
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decode a token received from a link. Tolerates trailing padding since
/// some mail clients re-pad URLs; rejects anything that is not valid
/// base64 or valid UTF-8.
pub fn decode(encoded: &str) -> ApiResult<String> {
    let trimmed = encoded.trim_end_matches('=');

    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|_| ApiError::MalformedToken)?;

    String::from_utf8(bytes).map_err(|_| ApiError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let raw = "some.raw+token/value==";
        let encoded = encode(raw);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(decode(&encoded).unwrap(), raw);
    }

    #[test]
    fn decode_tolerates_padding() {
        let encoded = encode("padded-token");
        let padded = format!("{}==", encoded);
        assert_eq!(decode(&padded).unwrap(), "padded-token");
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        match decode("not base64 at all!") {
            Err(ApiError::MalformedToken) => {}
            other => panic!("Expected MalformedToken, got {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        // Valid base64 of the bytes [0xff, 0xfe]
        let encoded = URL_SAFE_NO_PAD.encode([0xffu8, 0xfe]);
        match decode(&encoded) {
            Err(ApiError::MalformedToken) => {}
            other => panic!("Expected MalformedToken, got {:?}", other),
        }
    }
}
