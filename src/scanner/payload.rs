// ============================================================================
// PAYLOAD EXTRACTOR - decoded QR text -> pairing code
// ============================================================================
// Rules, first match wins:
//   1. happ://send_to_device/<base64 JSON with "uid">  (no fallthrough once
//      the prefix matched, even if the rest is broken)
//   2. standalone 5-digit number
//   3. 5-digit URL path segment
// ============================================================================

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use regex::Regex;
use serde_json::Value;

use crate::models::{CodeSource, ExtractionError, PairingCode, PairingPayload};

pub const DEVICE_PREFIX: &str = "happ://send_to_device/";

lazy_static::lazy_static! {
    // ASCII word boundaries on both sides, like `\b\d{5}\b` in the page script.
    static ref BARE_CODE: Regex =
        Regex::new(r"(?:^|[^0-9A-Za-z_])([0-9]{5})(?:[^0-9A-Za-z_]|$)").expect("valid regex");
    static ref PATH_CODE: Regex = Regex::new(r"/([0-9]{5})(?:/|\?|$)").expect("valid regex");
}

pub fn extract(payload: &PairingPayload) -> Result<PairingCode, ExtractionError> {
    extract_str(payload.as_str())
}

pub fn extract_str(raw: &str) -> Result<PairingCode, ExtractionError> {
    if let Some(encoded) = raw.strip_prefix(DEVICE_PREFIX) {
        return extract_device_uid(encoded);
    }

    if let Some(code) = first_capture(&BARE_CODE, raw) {
        return Ok(PairingCode { value: code, source: CodeSource::BareNumber });
    }

    if let Some(code) = first_capture(&PATH_CODE, raw) {
        return Ok(PairingCode { value: code, source: CodeSource::PathSegment });
    }

    Err(ExtractionError::NotFound)
}

fn first_capture(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_device_uid(encoded: &str) -> Result<PairingCode, ExtractionError> {
    let bytes = decode_base64(encoded.trim())?;
    let text = String::from_utf8(bytes).map_err(|e| ExtractionError::MalformedEncoding {
        detail: format!("payload is not UTF-8: {}", e),
    })?;
    let record: Value = serde_json::from_str(&text).map_err(|e| ExtractionError::MalformedEncoding {
        detail: format!("payload is not JSON: {}", e),
    })?;

    let uid = match record.get("uid") {
        None | Some(Value::Null) => return Err(ExtractionError::MissingField),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(ExtractionError::MalformedEncoding {
                detail: format!("uid is not a scalar: {}", other),
            })
        }
    };

    if uid.is_empty() {
        return Err(ExtractionError::EmptyField);
    }
    Ok(PairingCode { value: uid, source: CodeSource::DeviceUid })
}

/// Accepts standard and URL-safe alphabets, padded or not.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, ExtractionError> {
    let mut last_error = None;
    for engine in [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD] {
        match engine.decode(encoded) {
            Ok(bytes) => return Ok(bytes),
            Err(e) => last_error = Some(e),
        }
    }
    Err(ExtractionError::MalformedEncoding {
        detail: match last_error {
            Some(e) => format!("invalid base64: {}", e),
            None => "invalid base64".to_string(),
        },
    })
}
