//! Where finished pages go.
use gridpress_layout::Page;
use gridpress_types::PlacedItem;
use serde::{Deserialize, Serialize};
use std::io;

/// A finished page: its size and every item placed on it, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOutput {
    pub number: u32,
    pub pagetype: String,
    pub width: f64,
    pub height: f64,
    pub items: Vec<PlacedItem>,
}

impl From<Page> for PageOutput {
    fn from(page: Page) -> Self {
        PageOutput {
            number: page.number,
            pagetype: page.pagetype,
            width: page.size.width,
            height: page.size.height,
            items: page.items,
        }
    }
}

/// Receives pages as they are finalized.
pub trait PageSink {
    fn ship_page(&mut self, page: PageOutput) -> io::Result<()>;
}

/// Keeps all pages in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pages: Vec<PageOutput>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[PageOutput] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<PageOutput> {
        self.pages
    }
}

impl PageSink for CollectingSink {
    fn ship_page(&mut self, page: PageOutput) -> io::Result<()> {
        log::debug!("Page {} finished with {} item(s)", page.number, page.items.len());
        self.pages.push(page);
        Ok(())
    }
}

/// Writes one JSON document per page, one per line.
pub struct JsonLinesSink<W: io::Write> {
    writer: W,
}

impl<W: io::Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> PageSink for JsonLinesSink<W> {
    fn ship_page(&mut self, page: PageOutput) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, &page)?;
        self.writer.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpress_types::{BoxContent, ContentBox, Size};

    fn page(number: u32) -> PageOutput {
        PageOutput {
            number,
            pagetype: "Default Page".into(),
            width: 100.0,
            height: 200.0,
            items: vec![PlacedItem {
                x: 1.0,
                y: 2.0,
                content: ContentBox::new(Size::new(3.0, 4.0), BoxContent::Filled { color: None }),
                destination: None,
            }],
        }
    }

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::new();
        sink.ship_page(page(1)).unwrap();
        sink.ship_page(page(2)).unwrap();
        let numbers: Vec<u32> = sink.pages().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.ship_page(page(1)).unwrap();
        sink.ship_page(page(2)).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: PageOutput = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, page(1));
        assert!(lines[1].contains("\"kind\":\"filled\""));
    }
}
