// ============================================================================
// I18N - status and title texts of the scanner modal
// ============================================================================

use std::collections::HashMap;

use crate::config::CONFIG;

/// Lookup of user-facing text. `None` lets the call site use its default.
pub trait TextSource {
    fn text(&self, key: &str) -> Option<String>;

    fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }
}

/// Translation table for a language code (already lowercased).
fn get_translations(lang: &str) -> HashMap<&'static str, &'static str> {
    let mut translations = HashMap::new();

    match lang {
        "en" => {
            // Modal
            translations.insert("androidtv_modal_title", "Android TV Connection");
            translations.insert("appletv_modal_title", "Apple TV Connection");
            translations.insert("tv_camera_instructions", "Point camera at QR code from TV");

            // Camera
            translations.insert("camera_starting", "Starting camera...");
            translations.insert("tv_camera_error", "Could not access camera");
            translations.insert("camera_not_supported", "Camera is not supported on this device");
            translations.insert("camera_timeout", "Camera did not start in time");

            // Scan + pairing
            translations.insert("qr_detected", "QR detected");
            translations.insert("qr_parse_error", "Unable to recognize QR code");
            translations.insert("qr_code_not_found", "Code not found");
            translations.insert("sending_to_tv", "Sending to TV...");
            translations.insert("subscription_sent_success", "Subscription sent to TV!");
            translations.insert("no_subscription_link", "No subscription link");
            translations.insert("tv_send_error", "Failed to send subscription");
        }
        _ => {
            // Modal
            translations.insert("androidtv_modal_title", "Подключение Android TV");
            translations.insert("appletv_modal_title", "Подключение Apple TV");
            translations.insert("tv_camera_instructions", "Направьте камеру на QR-код с телевизора");

            // Camera
            translations.insert("camera_starting", "Запускаем камеру...");
            translations.insert("tv_camera_error", "Не удалось получить доступ к камере");
            translations.insert("camera_not_supported", "Камера не поддерживается на этом устройстве");
            translations.insert("camera_timeout", "Камера не запустилась вовремя");

            // Scan + pairing
            translations.insert("qr_detected", "QR обнаружен");
            translations.insert("qr_parse_error", "Не удалось распознать QR-код");
            translations.insert("qr_code_not_found", "Код не найден");
            translations.insert("sending_to_tv", "Отправляем на TV...");
            translations.insert("subscription_sent_success", "Подписка отправлена на TV!");
            translations.insert("no_subscription_link", "Нет ссылки подписки");
            translations.insert("tv_send_error", "Не удалось отправить подписку");
        }
    }

    translations
}

/// Built-in `ru`/`en` tables. Unknown languages read the `ru` table.
#[derive(Debug, Clone)]
pub struct BuiltinTexts {
    table: HashMap<&'static str, &'static str>,
}

impl BuiltinTexts {
    pub fn new(lang: &str) -> Self {
        let table = get_translations(&lang.trim().to_lowercase());
        Self { table }
    }
}

impl Default for BuiltinTexts {
    fn default() -> Self {
        Self::new(&CONFIG.default_language)
    }
}

impl TextSource for BuiltinTexts {
    fn text(&self, key: &str) -> Option<String> {
        self.table.get(key).map(|s| s.to_string())
    }
}
