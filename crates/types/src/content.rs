//! Sized content produced by the typesetting collaborator and placed on pages.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single typeset line, offset from the top of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub baseline: f64,
    pub width: f64,
}

/// What a content box draws. The renderer decides how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BoxContent {
    Text {
        lines: Vec<TextLine>,
        font_size: f64,
        leading: f64,
    },
    Image {
        source: PathBuf,
    },
    Filled {
        color: Option<String>,
    },
    Group {
        name: String,
        items: Vec<PlacedItem>,
    },
}

/// A rectangular, already measured piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBox {
    pub size: Size,
    pub content: BoxContent,
}

impl ContentBox {
    pub fn new(size: Size, content: BoxContent) -> Self {
        Self { size, content }
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }
}

/// A content box at an absolute position (page or group relative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "box")]
    pub content: ContentBox,
    /// Destination id when the item is the target of a marker.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub destination: Option<u64>,
}

impl PlacedItem {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.content.width(), self.content.height())
    }
}

/// Bounding box of a list of placed items, `None` when the list is empty.
pub fn extent(items: &[PlacedItem]) -> Option<Rect> {
    items
        .iter()
        .map(PlacedItem::bounds)
        .reduce(|acc, r| acc.union(&r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(w: f64, h: f64) -> ContentBox {
        ContentBox::new(Size::new(w, h), BoxContent::Filled { color: None })
    }

    #[test]
    fn extent_of_placed_items() {
        let items = vec![
            PlacedItem { x: 0.0, y: 0.0, content: filled(10.0, 10.0), destination: None },
            PlacedItem { x: 20.0, y: 5.0, content: filled(10.0, 20.0), destination: None },
        ];
        assert_eq!(extent(&items), Some(Rect::new(0.0, 0.0, 30.0, 25.0)));
        assert_eq!(extent(&[]), None);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(filled(1.0, 2.0)).unwrap();
        assert_eq!(json["content"]["kind"], "filled");
        assert_eq!(json["size"]["height"], 2.0);
    }
}
