/// Panels: the smallest editable units of the comic template
use serde::{Deserialize, Serialize};

/// What a panel holds: an image slot, a free-text field, or the cover date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Image,
    Text,
    Date,
}

/// A locally rendered image that has not been uploaded yet.
///
/// `preview_ref` is a data URL derived from the rendered bytes, so the UI can
/// show the image without a network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub file_size: u64,
    pub preview_ref: String,
}

/// Where an image panel's pixels currently live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum ImageSource {
    /// Rendered locally, waiting for upload at submit time.
    #[serde(rename = "pending")]
    Pending(PendingImage),

    /// Uploaded to durable blob storage; the string is the public URL.
    #[serde(rename = "durable")]
    Durable(String),
}

impl ImageSource {
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageSource::Pending(_))
    }
}

/// One editable slot in a page.
///
/// `id` is template-defined, unique across the whole document, and never
/// changes after instantiation. `content` holds literal text, a `"D\nMon"`
/// date encoding, or an image reference (preview data URL while pending,
/// public URL once durable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub kind: PanelKind,
    pub content: String,
    pub placeholder: String,
    pub image: Option<ImageSource>,
}

impl Panel {
    pub fn new(id: impl Into<String>, kind: PanelKind, placeholder: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: String::new(),
            placeholder: placeholder.into(),
            image: None,
        }
    }

    /// Date panel pre-filled with the template default, e.g. `"3\nMar"`.
    pub fn date(id: impl Into<String>, default_content: impl Into<String>) -> Self {
        let default_content = default_content.into();
        Self {
            id: id.into(),
            kind: PanelKind::Date,
            content: default_content.clone(),
            placeholder: default_content,
            image: None,
        }
    }

    /// Sole mutation entry point for text and date panels.
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.content = value.into();
    }

    /// Combine a day/month change with the existing `"D\nMon"` encoding.
    ///
    /// Whichever half is `None` keeps its current value, so setting the day
    /// and then the month in two calls does not drop the first edit.
    pub fn set_date_part(&mut self, day: Option<&str>, month: Option<&str>) {
        let mut lines = self.content.splitn(2, '\n');
        let current_day = lines.next().unwrap_or("").to_string();
        let current_month = lines.next().unwrap_or("").to_string();

        let day = day.map(str::to_string).unwrap_or(current_day);
        let month = month.map(str::to_string).unwrap_or(current_month);
        self.content = format!("{}\n{}", day, month);
    }

    /// Install a freshly rendered local image. Only the capture adapter's
    /// output ever reaches this; raw file selection goes through crop first.
    pub fn set_pending_image(&mut self, pending: PendingImage) {
        self.content = pending.preview_ref.clone();
        self.image = Some(ImageSource::Pending(pending));
    }

    /// Rewrite the panel to its uploaded form. Clears the pending blob: a
    /// durably uploaded panel never retains a local reference.
    pub fn set_durable_image(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.content = url.clone();
        self.image = Some(ImageSource::Durable(url));
    }

    pub fn pending_image(&self) -> Option<&PendingImage> {
        match &self.image {
            Some(ImageSource::Pending(p)) => Some(p),
            _ => None,
        }
    }

    /// True for an image panel that has an actual image source, pending or
    /// durable. A panel with stale leftover text but no source is not
    /// considered an image.
    pub fn has_image_source(&self) -> bool {
        self.kind == PanelKind::Image && !self.content.is_empty() && self.image.is_some()
    }
}
