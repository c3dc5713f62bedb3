// ============================================================================
// PAIRING SERVICE - sends the pairing code + subscription link to the backend
// ============================================================================
// One attempt per detected code, no retries. The HTTP side is behind
// `PairingTransport` so the decision logic runs without a browser.
// ============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::models::{PairingCode, SubmitError, TransportError, TvPairRequest, TvPairResponse};

/// Outbound call to `POST {base}api/tv`.
#[allow(async_fn_in_trait)]
pub trait PairingTransport: Clone {
    async fn post_pairing(&self, request: &TvPairRequest) -> Result<TvPairResponse, TransportError>;
}

/// Subscription link as sent in the `data` field.
pub fn encode_link(link: &str) -> String {
    STANDARD.encode(link.as_bytes())
}

#[derive(Clone)]
pub struct PairingSubmitter<T> {
    transport: T,
}

impl<T: PairingTransport> PairingSubmitter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Sends `code` with the current subscription link.
    ///
    /// An absent or empty link fails with `NoLink` before anything goes out.
    pub async fn submit(&self, code: &PairingCode, subscription_link: Option<&str>) -> Result<(), SubmitError> {
        let link = match subscription_link {
            Some(link) if !link.is_empty() => link,
            _ => {
                log::warn!("⚠️ [PAIRING] No subscription link, nothing to send");
                return Err(SubmitError::NoLink);
            }
        };

        let request = TvPairRequest {
            code: code.as_str().to_string(),
            data: encode_link(link),
        };
        log::info!("📤 [PAIRING] Sending subscription to TV {}", request.code);

        match self.transport.post_pairing(&request).await {
            Ok(response) if response.is_success() => {
                log::info!("✅ [PAIRING] TV {} accepted the subscription", request.code);
                Ok(())
            }
            Ok(response) => {
                let message = response.error.or(response.message).filter(|m| !m.is_empty());
                log::error!("❌ [PAIRING] Backend refused: {:?}", message);
                Err(SubmitError::Remote { message })
            }
            Err(e) => {
                log::error!("❌ [PAIRING] Request failed: {}", e);
                Err(SubmitError::Remote { message: None })
            }
        }
    }
}
