use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw string decoded from a QR symbol. Never modified after capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingPayload(String);

impl PairingPayload {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which parsing rule produced a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    DeviceUid,
    BareNumber,
    PathSegment,
}

/// Identifier of the TV session to pair with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode {
    pub value: String,
    pub source: CodeSource,
}

impl PairingCode {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// Which TV the page opened the scanner for. Only changes the modal title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TvKind {
    #[default]
    AndroidTv,
    AppleTv,
}

impl TvKind {
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "appletv" | "apple_tv" | "apple-tv" => TvKind::AppleTv,
            _ => TvKind::AndroidTv,
        }
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            TvKind::AndroidTv => "androidtv_modal_title",
            TvKind::AppleTv => "appletv_modal_title",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            TvKind::AndroidTv => "Android TV Connection",
            TvKind::AppleTv => "Apple TV Connection",
        }
    }
}

/// Body of `POST {base}api/tv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TvPairRequest {
    pub code: String,
    pub data: String,
}

/// Response of `POST {base}api/tv`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TvPairResponse {
    pub success: Value,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl TvPairResponse {
    /// `success` evaluated the way the page's JavaScript would.
    pub fn is_success(&self) -> bool {
        match &self.success {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(false),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}
