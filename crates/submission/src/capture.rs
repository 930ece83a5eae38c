/// Image capture adapter: raw picked file -> finalized panel image.
///
/// Phase A runs locally and synchronously: decode, apply the user's
/// crop/rotate/zoom choices, encode JPEG, and derive a data-URL preview so
/// the panel renders with no network round trip. Phase B, invoked only from
/// submission assembly, uploads the rendered bytes to durable blob storage
/// and resolves the public URL.
use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use tracing::warn;

use comic::PendingImage;
use storage::BlobStorage;

use crate::{Result, SubmissionError};

const JPEG_QUALITY: u8 = 90;

/// Crop window chosen in the editor, as fractions of the source image.
/// `center_x`/`center_y` position the window, `width`/`height` size it,
/// `zoom` shrinks it (zooming in keeps less of the source), and `rotation`
/// is limited to quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropParams {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    pub rotation: u16,
}

impl Default for CropParams {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.5,
            width: 0.6,
            height: 0.4,
            zoom: 1.0,
            rotation: 0,
        }
    }
}

/// Phase A: render the picked file into the panel's JPEG blob.
///
/// All-or-nothing: any decode or encode failure returns an error and the
/// caller leaves the panel's previous content untouched.
pub fn render_panel_image(raw: &[u8], panel_id: &str, params: CropParams) -> Result<PendingImage> {
    if params.rotation % 90 != 0 {
        return Err(SubmissionError::UnsupportedRotation(params.rotation));
    }

    let source = image::load_from_memory(raw)?;
    let (src_w, src_h) = (source.width() as f32, source.height() as f32);

    let zoom = params.zoom.max(0.1);
    let crop_w = ((params.width / zoom).clamp(0.01, 1.0) * src_w).max(1.0);
    let crop_h = ((params.height / zoom).clamp(0.01, 1.0) * src_h).max(1.0);
    let crop_x = (params.center_x * src_w - crop_w / 2.0).clamp(0.0, src_w - crop_w);
    let crop_y = (params.center_y * src_h - crop_h / 2.0).clamp(0.0, src_h - crop_h);

    let cropped = source.crop_imm(
        crop_x as u32,
        crop_y as u32,
        crop_w as u32,
        crop_h as u32,
    );

    let rotated = match params.rotation % 360 {
        90 => cropped.rotate90(),
        180 => cropped.rotate180(),
        270 => cropped.rotate270(),
        _ => cropped,
    };

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY);
    rotated.write_with_encoder(encoder)?;

    let preview_ref = format!("data:image/jpeg;base64,{}", BASE64.encode(&bytes));
    let file_size = bytes.len() as u64;

    Ok(PendingImage {
        bytes,
        file_name: format!("{}.jpg", panel_id),
        file_size,
        preview_ref,
    })
}

/// Phase B: durable upload with bounded retry.
#[derive(Debug, Clone)]
pub struct Uploader {
    attempts: u32,
    backoff: Duration,
}

impl Default for Uploader {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl Uploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tune the retry schedule (tests use a zero backoff).
    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Upload a rendered blob under the customer's namespace and resolve its
    /// public URL. Transient failures retry with fixed backoff; exhaustion
    /// propagates to the caller, never silently dropping the image.
    pub async fn upload_pending(
        &self,
        blob_store: &dyn BlobStorage,
        customer_id: &str,
        panel_id: &str,
        pending: &PendingImage,
    ) -> Result<String> {
        let path = format!(
            "{}/{}-{}",
            customer_id,
            chrono::Utc::now().timestamp_millis(),
            pending.file_name
        );

        for attempt in 1..=self.attempts {
            match blob_store
                .upload(&path, pending.bytes.clone(), "image/jpeg")
                .await
            {
                Ok(()) => return Ok(blob_store.public_url(&path)),
                Err(err) => {
                    warn!(panel_id, attempt, %err, "image upload attempt failed");
                    if attempt < self.attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(SubmissionError::UploadFailed {
            panel_id: panel_id.to_string(),
            attempts: self.attempts,
        })
    }
}
