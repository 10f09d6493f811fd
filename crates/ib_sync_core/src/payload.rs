use serde_json::Value;
use sha2::{Digest, Sha256};

/// Marker some upstream gateways put at the start of an error page served with
/// a success status.
pub const GATEWAY_ERROR_MARKER: &str = "502";

/// True when a feed body looks like a gateway error page rather than data.
///
/// Only a body that *starts* with the marker counts; a `502` anywhere else
/// (say inside a serial number) is ordinary payload.
pub fn is_gateway_error_body(body: &str) -> bool {
    body.starts_with(GATEWAY_ERROR_MARKER)
}

/// Encodes a raw feed body as a JSON string value, the stored object format.
pub fn encode_feed_payload(body: &str) -> Vec<u8> {
    Value::String(body.to_owned()).to_string().into_bytes()
}

/// Recovers the raw feed body from a stored object.
pub fn decode_feed_payload(stored: &[u8]) -> Result<String, serde_json::Error> {
    serde_json::from_slice(stored)
}

/// Hex SHA-256 of the stored bytes, logged so repeated cycles can be checked
/// for byte-identical writes.
pub fn payload_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
