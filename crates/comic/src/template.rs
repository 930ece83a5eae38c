/// The fixed product template: cover, message page, ten numbered interior
/// pages. Page and panel composition is not user-editable; sessions only
/// mutate panel content.
use serde::{Deserialize, Serialize};

use crate::{Panel, PanelKind};

/// Fixed ordered group of panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub panels: Vec<Panel>,
}

impl Page {
    pub fn new(id: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            id: id.into(),
            panels,
        }
    }
}

/// Panel ids the auxiliary text fields map onto, by fixed convention.
pub const TITLE_PANEL: &str = "title";
pub const SUBTITLE_PANEL: &str = "subtitle";
pub const DATE_PANEL: &str = "date";
pub const COVER_CAPTION_PANEL: &str = "coverCaption";
pub const MESSAGE_PANEL: &str = "messageText";

pub const DEFAULT_COVER_DATE: &str = "3\nMar";

/// Number of numbered interior pages in the product variant.
pub const INTERIOR_PAGE_COUNT: usize = 10;

fn image(id: &str, placeholder: &str) -> Panel {
    Panel::new(id, PanelKind::Image, placeholder)
}

fn text(id: &str, placeholder: &str) -> Panel {
    Panel::new(id, PanelKind::Text, placeholder)
}

/// Build a fresh template instance. Every call constructs the pages from
/// scratch so no document ever aliases a shared constant.
pub fn comic_template() -> Vec<Page> {
    vec![
        Page::new(
            "cover",
            vec![
                text(TITLE_PANEL, "Add a title"),
                text(SUBTITLE_PANEL, "Add a subtitle"),
                Panel::date(DATE_PANEL, DEFAULT_COVER_DATE),
                image("coverImage", "Click to add image"),
                text(COVER_CAPTION_PANEL, "Add a caption"),
            ],
        ),
        Page::new("message", vec![text(MESSAGE_PANEL, "Message here")]),
        Page::new(
            "page1",
            vec![
                image("image1", "1"),
                text("caption1", "Add a caption here"),
                image("image2", "2"),
            ],
        ),
        Page::new(
            "page2",
            vec![image("image3", "3"), text("caption3", "Add a caption here")],
        ),
        Page::new(
            "page3",
            vec![
                image("image4", "4"),
                image("image5", "5"),
                image("image6", "6"),
                text("caption6", "Add a caption here"),
            ],
        ),
        Page::new(
            "page4",
            vec![
                image("image7", "7"),
                text("caption7", "Add a caption here"),
                image("image8", "8"),
            ],
        ),
        Page::new(
            "page5",
            vec![image("image9", "9"), text("caption9", "Add a caption here")],
        ),
        Page::new(
            "page6",
            vec![
                image("image10", "10"),
                text("caption10", "Add a caption here"),
                image("image11", "11"),
            ],
        ),
        Page::new(
            "page7",
            vec![
                image("image12", "12"),
                text("caption12", "Add a caption here"),
                image("image13", "13"),
                image("image14", "14"),
            ],
        ),
        Page::new(
            "page8",
            vec![
                image("image15", "15"),
                text("caption15", "Add a caption here"),
            ],
        ),
        Page::new(
            "page9",
            vec![
                image("image16", "16"),
                text("caption16", "Add a caption here"),
                image("image17", "17"),
            ],
        ),
        Page::new(
            "page10",
            vec![
                image("image18", "18"),
                text("caption18", "Add a caption here"),
            ],
        ),
    ]
}
