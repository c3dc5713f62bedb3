#[cfg(target_arch = "wasm32")]
pub mod api_client;
pub mod pairing_service;

#[cfg(target_arch = "wasm32")]
pub use api_client::ApiClient;
pub use pairing_service::{encode_link, PairingSubmitter, PairingTransport};
