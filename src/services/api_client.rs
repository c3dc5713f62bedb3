// ============================================================================
// API CLIENT - HTTP only (stateless apart from the base path)
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::{select, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use web_sys::AbortController;

use super::pairing_service::PairingTransport;
use crate::config::{resolve_base_path, CONFIG};
use crate::models::{TransportError, TvPairRequest, TvPairResponse};

#[derive(Clone)]
pub struct ApiClient {
    base_path: Rc<RefCell<String>>,
    timeout_ms: u32,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            base_path: Rc::new(RefCell::new(CONFIG.base_path.clone())),
            timeout_ms: CONFIG.api_timeout_ms,
        }
    }

    /// The page may serve the connect subpage under another prefix.
    /// `None` (or blank) goes back to the configured base path.
    pub fn set_base_path(&self, base_path: Option<&str>) {
        *self.base_path.borrow_mut() = resolve_base_path(base_path, &CONFIG.base_path);
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_path.borrow(), path)
    }
}

impl PairingTransport for ApiClient {
    /// The server answers failures with non-2xx plus a JSON body, so the body
    /// is parsed whatever the status.
    async fn post_pairing(&self, request: &TvPairRequest) -> Result<TvPairResponse, TransportError> {
        let url = self.endpoint("api/tv");
        let controller = AbortController::new().map_err(|e| TransportError::Network(format!("{:?}", e)))?;
        let signal = controller.signal();

        log::debug!("🌐 [API] POST {}", url);
        let send = Request::post(&url)
            .abort_signal(Some(&signal))
            .json(request)
            .map_err(|e| TransportError::Serialization(e.to_string()))?
            .send();

        let response = match select(Box::pin(send), Box::pin(TimeoutFuture::new(self.timeout_ms))).await {
            Either::Left((result, _)) => result.map_err(|e| TransportError::Network(e.to_string()))?,
            Either::Right(_) => {
                controller.abort();
                log::error!("❌ [API] POST {} aborted after {} ms", url, self.timeout_ms);
                return Err(TransportError::Timeout);
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        match serde_json::from_str::<TvPairResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !response.ok() => Err(TransportError::Http { status }),
            Err(e) => Err(TransportError::Serialization(e.to_string())),
        }
    }
}
