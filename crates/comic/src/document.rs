/// The full in-memory editable state for one customer's comic.
///
/// A document is built fresh from the static template, rehydrated in place
/// from any prior stored record, mutated panel by panel for the session, and
/// projected in full at every persistence point. It is exclusively owned by
/// one editing session.
use serde::{Deserialize, Serialize};

use crate::{
    comic_template, AuxFields, ComicError, ImageRef, Page, Panel, PanelKind, PendingImage,
    RecordFields, Result, SubmissionRecord, COVER_CAPTION_PANEL, DATE_PANEL, DEFAULT_COVER_DATE,
    MESSAGE_PANEL, SUBTITLE_PANEL, TITLE_PANEL,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,

    /// Bumped on every mutation. Persistence payloads carry this stamp so a
    /// write issued for an older state can be recognised and dropped.
    pub revision: u64,
}

impl Document {
    /// Instantiate from the static template. Deep-built per call, so the
    /// document is fully independent of any other instance.
    pub fn from_template() -> Self {
        Self {
            pages: comic_template(),
            revision: 0,
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Locate a panel anywhere in the document, first match wins.
    pub fn find_panel(&self, panel_id: &str) -> Option<&Panel> {
        self.pages
            .iter()
            .flat_map(|page| page.panels.iter())
            .find(|panel| panel.id == panel_id)
    }

    fn find_panel_mut_anywhere(&mut self, panel_id: &str) -> Option<&mut Panel> {
        self.pages
            .iter_mut()
            .flat_map(|page| page.panels.iter_mut())
            .find(|panel| panel.id == panel_id)
    }

    fn panel_mut(&mut self, page_index: usize, panel_id: &str) -> Result<&mut Panel> {
        let page = self
            .pages
            .get_mut(page_index)
            .ok_or(ComicError::PageOutOfRange(page_index))?;
        page.panels
            .iter_mut()
            .find(|panel| panel.id == panel_id)
            .ok_or_else(|| ComicError::PanelNotFound(panel_id.to_string()))
    }

    /// Overwrite a text or date panel's content. Synchronous and local; the
    /// caller receives the updated document so it can persist immediately.
    pub fn set_panel_content(
        &mut self,
        page_index: usize,
        panel_id: &str,
        value: &str,
    ) -> Result<&Document> {
        let panel = self.panel_mut(page_index, panel_id)?;
        if panel.kind == PanelKind::Image {
            return Err(ComicError::WrongPanelKind(panel_id.to_string(), "text"));
        }
        panel.set_text(value);
        self.bump();
        Ok(self)
    }

    /// Combine a day/month edit with the panel's existing date encoding.
    pub fn set_date_part(
        &mut self,
        page_index: usize,
        panel_id: &str,
        day: Option<&str>,
        month: Option<&str>,
    ) -> Result<&Document> {
        let panel = self.panel_mut(page_index, panel_id)?;
        if panel.kind != PanelKind::Date {
            return Err(ComicError::WrongPanelKind(panel_id.to_string(), "date"));
        }
        panel.set_date_part(day, month);
        self.bump();
        Ok(self)
    }

    /// Install a capture-adapter product into an image panel.
    pub fn set_panel_image(
        &mut self,
        page_index: usize,
        panel_id: &str,
        pending: PendingImage,
    ) -> Result<&Document> {
        let panel = self.panel_mut(page_index, panel_id)?;
        if panel.kind != PanelKind::Image {
            return Err(ComicError::WrongPanelKind(panel_id.to_string(), "image"));
        }
        panel.set_pending_image(pending);
        self.bump();
        Ok(self)
    }

    /// Rewrite an image panel to its uploaded URL, clearing the pending blob.
    pub fn promote_panel_image(&mut self, panel_id: &str, url: &str) -> Result<&Document> {
        let panel = self
            .find_panel_mut_anywhere(panel_id)
            .ok_or_else(|| ComicError::PanelNotFound(panel_id.to_string()))?;
        panel.set_durable_image(url);
        self.bump();
        Ok(self)
    }

    /// Every panel whose image is still only a local pending blob, in
    /// traversal order.
    pub fn pending_panels(&self) -> Vec<(&str, &PendingImage)> {
        self.pages
            .iter()
            .flat_map(|page| page.panels.iter())
            .filter_map(|panel| {
                panel
                    .pending_image()
                    .map(|pending| (panel.id.as_str(), pending))
            })
            .collect()
    }

    /// Map a prior stored record back onto the template.
    ///
    /// Image refs whose panel id no longer exists in the template are skipped
    /// silently; the template is allowed to evolve past old rows. Auxiliary
    /// text fields are decoded once here and fanned out to their designated
    /// panels; fields absent from the decoded structure keep their template
    /// defaults.
    pub fn rehydrate(&mut self, record: &SubmissionRecord) {
        for image in &record.images {
            if let Some(panel) = self.find_panel_mut_anywhere(&image.id) {
                panel.set_durable_image(&image.url);
            }
        }

        if !record.title.is_empty() {
            if let Some(panel) = self.find_panel_mut_anywhere(TITLE_PANEL) {
                panel.set_text(&record.title);
            }
        }

        if !record.description.is_empty() {
            match AuxFields::decode(&record.description) {
                AuxFields::Legacy(raw) => {
                    if let Some(panel) = self.find_panel_mut_anywhere(SUBTITLE_PANEL) {
                        panel.set_text(&raw);
                    }
                }
                AuxFields::Structured {
                    subtitle,
                    cover_caption,
                    message_text,
                    cover_date,
                } => {
                    let fields = [
                        (SUBTITLE_PANEL, subtitle),
                        (COVER_CAPTION_PANEL, cover_caption),
                        (MESSAGE_PANEL, message_text),
                        (DATE_PANEL, cover_date),
                    ];
                    for (panel_id, value) in fields {
                        if value.is_empty() {
                            continue;
                        }
                        if let Some(panel) = self.find_panel_mut_anywhere(panel_id) {
                            panel.set_text(&value);
                        }
                    }
                }
            }
        }

        self.bump();
    }

    /// Project the document into the record fields shared by draft saves and
    /// final submission.
    ///
    /// An image panel contributes an entry iff its content is non-empty and
    /// it carries an actual image source; `order_index` is dense and follows
    /// page-major, panel-minor traversal order no matter in which order the
    /// panels were edited.
    pub fn to_record_fields(&self) -> Result<RecordFields> {
        let mut images = Vec::new();
        let mut order_index = 0u32;

        for page in &self.pages {
            for panel in &page.panels {
                if panel.has_image_source() {
                    images.push(ImageRef {
                        id: panel.id.clone(),
                        url: panel.content.clone(),
                        caption: String::new(),
                        order_index,
                        file_name: format!("{}.jpg", panel.id),
                        file_size: panel.pending_image().map(|p| p.file_size).unwrap_or(0),
                    });
                    order_index += 1;
                }
            }
        }

        let content_of = |panel_id: &str| {
            self.find_panel(panel_id)
                .map(|panel| panel.content.clone())
                .unwrap_or_default()
        };

        let cover_date = content_of(DATE_PANEL);
        let aux = AuxFields::Structured {
            subtitle: content_of(SUBTITLE_PANEL),
            cover_caption: content_of(COVER_CAPTION_PANEL),
            message_text: content_of(MESSAGE_PANEL),
            // The template default is not a user edit; persisting it would
            // make every draft look like it had a chosen date.
            cover_date: if cover_date == DEFAULT_COVER_DATE {
                String::new()
            } else {
                cover_date
            },
        };

        Ok(RecordFields {
            title: content_of(TITLE_PANEL),
            description: aux.encode()?,
            date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubmissionStatus;

    fn record_with(fields: RecordFields) -> SubmissionRecord {
        SubmissionRecord {
            id: "r1".to_string(),
            customer_id: "9876543210".to_string(),
            title: fields.title,
            description: fields.description,
            date: fields.date,
            images: fields.images,
            status: SubmissionStatus::Draft,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn pending(name: &str) -> PendingImage {
        PendingImage {
            bytes: vec![0xff, 0xd8],
            file_name: format!("{}.jpg", name),
            file_size: 2,
            preview_ref: format!("data:image/jpeg;base64,{}", name),
        }
    }

    #[test]
    fn test_projection_follows_traversal_order_not_edit_order() {
        let mut doc = Document::from_template();
        // Edit in reverse page order.
        doc.set_panel_image(4, "image6", pending("image6")).unwrap();
        doc.set_panel_image(2, "image1", pending("image1")).unwrap();
        doc.set_panel_image(0, "coverImage", pending("coverImage"))
            .unwrap();

        let fields = doc.to_record_fields().unwrap();
        let ids: Vec<_> = fields.images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["coverImage", "image1", "image6"]);
        let indices: Vec<_> = fields.images.iter().map(|i| i.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_image_panel_does_not_contribute() {
        let mut doc = Document::from_template();
        doc.set_panel_image(2, "image1", pending("image1")).unwrap();
        doc.set_panel_image(3, "image3", pending("image3")).unwrap();
        // image2 never edited: 3 image panels on pages 1-2, only 2 contribute.

        let fields = doc.to_record_fields().unwrap();
        assert_eq!(fields.images.len(), 2);
        assert!(fields.images.iter().all(|i| i.id != "image2"));
        assert_eq!(fields.images[0].order_index, 0);
        assert_eq!(fields.images[1].order_index, 1);
    }

    #[test]
    fn test_rehydration_is_idempotent_on_visible_content() {
        let mut original = Document::from_template();
        original.set_panel_content(0, "title", "Birthday").unwrap();
        original
            .set_panel_content(0, "subtitle", "for mum")
            .unwrap();
        original
            .set_panel_content(1, "messageText", "happy 60th!")
            .unwrap();
        original
            .promote_panel_image("image1", "https://cdn.example.com/1.jpg")
            .unwrap();
        // Give image1 a durable source so it projects.
        let fields = original.to_record_fields().unwrap();

        let mut restored = Document::from_template();
        restored.rehydrate(&record_with(fields));

        for page in &original.pages {
            for panel in &page.panels {
                let other = restored.find_panel(&panel.id).unwrap();
                assert_eq!(other.content, panel.content, "panel {}", panel.id);
            }
        }
    }

    #[test]
    fn test_rehydrate_skips_stale_panel_ids() {
        let mut fields = Document::from_template().to_record_fields().unwrap();
        fields.images.push(ImageRef {
            id: "image99".to_string(),
            url: "https://cdn.example.com/gone.jpg".to_string(),
            caption: String::new(),
            order_index: 0,
            file_name: "image99.jpg".to_string(),
            file_size: 0,
        });

        let mut doc = Document::from_template();
        doc.rehydrate(&record_with(fields));
        assert!(doc.find_panel("image99").is_none());
    }

    #[test]
    fn test_rehydrate_legacy_description_maps_to_subtitle() {
        let mut fields = Document::from_template().to_record_fields().unwrap();
        fields.description = "plain old subtitle".to_string();

        let mut doc = Document::from_template();
        doc.rehydrate(&record_with(fields));
        assert_eq!(
            doc.find_panel("subtitle").unwrap().content,
            "plain old subtitle"
        );
        // Other aux panels keep their template defaults.
        assert_eq!(doc.find_panel("messageText").unwrap().content, "");
        assert_eq!(doc.find_panel("date").unwrap().content, DEFAULT_COVER_DATE);
    }

    #[test]
    fn test_rehydrated_image_has_no_pending_blob() {
        let mut fields = Document::from_template().to_record_fields().unwrap();
        fields.images.push(ImageRef {
            id: "coverImage".to_string(),
            url: "https://cdn.example.com/cover.jpg".to_string(),
            caption: String::new(),
            order_index: 0,
            file_name: "coverImage.jpg".to_string(),
            file_size: 0,
        });

        let mut doc = Document::from_template();
        doc.rehydrate(&record_with(fields));
        let panel = doc.find_panel("coverImage").unwrap();
        assert!(panel.pending_image().is_none());
        assert!(panel.has_image_source());
        assert!(doc.pending_panels().is_empty());
    }

    #[test]
    fn test_mutations_bump_revision() {
        let mut doc = Document::from_template();
        assert_eq!(doc.revision, 0);
        doc.set_panel_content(0, "title", "a").unwrap();
        doc.set_panel_content(0, "title", "ab").unwrap();
        assert_eq!(doc.revision, 2);
    }

    #[test]
    fn test_set_panel_content_rejects_image_panels() {
        let mut doc = Document::from_template();
        let err = doc.set_panel_content(0, "coverImage", "oops").unwrap_err();
        assert!(matches!(err, ComicError::WrongPanelKind(_, _)));
    }

    #[test]
    fn test_date_edit_through_document() {
        let mut doc = Document::from_template();
        doc.set_date_part(0, "date", Some("5"), None).unwrap();
        doc.set_date_part(0, "date", None, Some("Jun")).unwrap();
        assert_eq!(doc.find_panel("date").unwrap().content, "5\nJun");
    }
}
