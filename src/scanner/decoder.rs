// ============================================================================
// QR DECODER - pixel buffer -> decoded text
// ============================================================================

use crate::models::DecodeError;

/// External decode capability: RGBA buffer in, text (or nothing) out.
pub trait QrDecoder {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Result<Option<String>, DecodeError>;
}

/// Pure Rust decoder backed by `rqrr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Result<Option<String>, DecodeError> {
        let (w, h) = (width as usize, height as usize);
        if w == 0 || h == 0 {
            return Ok(None);
        }
        if rgba.len() < w * h * 4 {
            return Err(DecodeError(format!(
                "buffer of {} bytes is too small for {}x{}",
                rgba.len(),
                w,
                h
            )));
        }

        let grey = rgba_to_greyscale(rgba, w, h);
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| grey[y * w + x]);

        let mut last_error = None;
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(Some(content)),
                Err(e) => last_error = Some(e),
            }
        }
        match last_error {
            Some(e) => Err(DecodeError(format!("{:?}", e))),
            None => Ok(None),
        }
    }
}

/// BT.601 luma with integer weights.
fn rgba_to_greyscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    rgba.chunks_exact(4)
        .take(width * height)
        .map(|px| ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrcode::{Color, QrCode};

    /// Renders `text` as an RGBA image: 6 px per module, 4 module quiet zone.
    fn render_qr(text: &str) -> (Vec<u8>, u32) {
        let code = QrCode::new(text.as_bytes()).unwrap();
        let modules = code.width();
        let colors = code.to_colors();
        let scale = 6;
        let quiet = 4;
        let size = (modules + 2 * quiet) * scale;
        let mut rgba = vec![255u8; size * size * 4];
        for my in 0..modules {
            for mx in 0..modules {
                if colors[my * modules + mx] != Color::Dark {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = (mx + quiet) * scale + dx;
                        let y = (my + quiet) * scale + dy;
                        let i = (y * size + x) * 4;
                        rgba[i..i + 3].copy_from_slice(&[0, 0, 0]);
                    }
                }
            }
        }
        (rgba, size as u32)
    }

    #[test]
    fn decodes_generated_symbol() {
        let payload = "happ://send_to_device/eyJ1aWQiOiIxMjM0NSJ9";
        let (rgba, size) = render_qr(payload);
        assert_eq!(RqrrDecoder.decode(&rgba, size, size), Ok(Some(payload.to_string())));
    }

    #[test]
    fn blank_frame_has_no_code() {
        let rgba = vec![255u8; 64 * 64 * 4];
        assert_eq!(RqrrDecoder.decode(&rgba, 64, 64), Ok(None));
        assert_eq!(RqrrDecoder.decode(&[], 0, 0), Ok(None));
    }

    #[test]
    fn short_buffer_is_an_error() {
        assert!(RqrrDecoder.decode(&[0u8; 10], 4, 4).is_err());
    }

    #[test]
    fn greyscale_weights() {
        let grey = rgba_to_greyscale(&[255, 255, 255, 255, 0, 0, 0, 255, 255, 0, 0, 255], 3, 1);
        assert_eq!(grey, vec![255, 0, 76]);
    }
}
