use std::fmt::Write as _;

use log::debug;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use serde_json::Value;

use crate::services::error::ApiError;

/// Signs Ozon Performance requests with HMAC-SHA256 over
/// `timestamp + METHOD + path + canonical_body`.
#[derive(Clone)]
pub struct RequestSigner {
    key: PKey<Private>,
}

impl RequestSigner {
    pub fn new(secret_key: &str) -> Result<Self, ApiError> {
        let key = PKey::hmac(secret_key.as_bytes())?;
        Ok(RequestSigner { key })
    }

    /// Builds the message covered by the signature.
    pub fn message(timestamp: &str, method: &str, path: &str, body: &str) -> String {
        format!("{timestamp}{method}{path}{body}")
    }

    /// Returns the lowercase hex HMAC-SHA256 of the canonical message.
    pub fn sign(
        &self,
        timestamp: &str,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<String, ApiError> {
        let message = Self::message(timestamp, method, path, body);
        debug!("Signing {} {} at {}", method, path, timestamp);
        self.sign_message(&message)
    }

    pub fn sign_message(&self, message: &str) -> Result<String, ApiError> {
        let mut signer = Signer::new(MessageDigest::sha256(), &self.key)?;
        signer.update(message.as_bytes())?;
        let mac = signer.sign_to_vec()?;

        Ok(to_hex(&mac))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Serializes a request body the way it is signed and sent.
///
/// Output is compact JSON in insertion order with every non-ASCII character
/// escaped as `\uXXXX`. A missing body, `null` or an empty object yields "".
pub fn canonize_body(body: Option<&Value>) -> Result<String, ApiError> {
    let value = match body {
        None | Some(Value::Null) => return Ok(String::new()),
        Some(Value::Object(map)) if map.is_empty() => return Ok(String::new()),
        Some(value) => value,
    };

    let compact = serde_json::to_string(value).map_err(|e| {
        ApiError::invalid_request(format!("Request body is not serializable: {e}"))
    })?;

    Ok(escape_non_ascii(&compact))
}

// Non-ASCII can only occur inside JSON strings, so escaping in place keeps the
// document valid.
fn escape_non_ascii(json: &str) -> String {
    if json.is_ascii() {
        return json.to_string();
    }

    let mut out = String::with_capacity(json.len() + 16);
    for ch in json.chars() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{unit:04x}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_hmac_sha256_known_vector() {
        // RFC 4231, test case 2
        let signer = RequestSigner::new("Jefe").unwrap();
        let signature = signer.sign_message("what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = RequestSigner::new("secret").unwrap();
        let body = canonize_body(Some(&json!({"name": "Spring", "type": "search"}))).unwrap();

        let first = signer.sign("1700000000", "POST", "/campaigns", &body).unwrap();
        let second = signer.sign("1700000000", "POST", "/campaigns", &body).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_signature_changes_with_every_input() {
        let signer = RequestSigner::new("secret").unwrap();
        let base = signer.sign("1700000000", "POST", "/campaigns", "{\"a\":1}").unwrap();

        let variants = [
            signer.sign("1700000001", "POST", "/campaigns", "{\"a\":1}").unwrap(),
            signer.sign("1700000000", "PUT", "/campaigns", "{\"a\":1}").unwrap(),
            signer.sign("1700000000", "POST", "/campaigns/1", "{\"a\":1}").unwrap(),
            signer.sign("1700000000", "POST", "/campaigns", "{\"a\":2}").unwrap(),
        ];

        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn test_signature_depends_on_key() {
        let a = RequestSigner::new("key-a").unwrap();
        let b = RequestSigner::new("key-b").unwrap();
        assert_ne!(
            a.sign("1", "GET", "/campaigns", "").unwrap(),
            b.sign("1", "GET", "/campaigns", "").unwrap()
        );
    }

    #[test]
    fn test_message_layout() {
        assert_eq!(
            RequestSigner::message("1700000000", "GET", "/campaigns", ""),
            "1700000000GET/campaigns"
        );
    }

    #[test]
    fn test_canonize_empty_bodies() {
        assert_eq!(canonize_body(None).unwrap(), "");
        assert_eq!(canonize_body(Some(&Value::Null)).unwrap(), "");
        assert_eq!(canonize_body(Some(&json!({}))).unwrap(), "");
    }

    #[test]
    fn test_canonize_is_compact_and_keeps_insertion_order() {
        let body = json!({"name": "Test Campaign", "type": "search", "budget": 1000});
        assert_eq!(
            canonize_body(Some(&body)).unwrap(),
            r#"{"name":"Test Campaign","type":"search","budget":1000}"#
        );
    }

    #[test]
    fn test_canonize_nested_values() {
        let body = json!({
            "date_from": "2024-01-01",
            "metrics": ["clicks", "orders"],
        });
        assert_eq!(
            canonize_body(Some(&body)).unwrap(),
            r#"{"date_from":"2024-01-01","metrics":["clicks","orders"]}"#
        );
    }

    #[test]
    fn test_canonize_escapes_non_ascii() {
        let body = json!({"name": "Весна"});
        assert_eq!(
            canonize_body(Some(&body)).unwrap(),
            r#"{"name":"\u0412\u0435\u0441\u043d\u0430"}"#
        );

        let emoji = json!({"name": "😀"});
        assert_eq!(
            canonize_body(Some(&emoji)).unwrap(),
            r#"{"name":"\ud83d\ude00"}"#
        );
    }
}
