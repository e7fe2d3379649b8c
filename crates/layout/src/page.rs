use crate::LayoutError;
use crate::grid::{Grid, GridSettings};
use crate::pagetype::PageType;
use gridpress_style::Margins;
use gridpress_types::{ContentBox, PlacedItem, Size};

/// A page under construction: its template, grid, and everything placed so far.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub pagetype: String,
    pub size: Size,
    pub margins: Margins,
    pub grid: Grid,
    pub items: Vec<PlacedItem>,
}

impl Page {
    pub fn new(
        number: u32,
        pagetype: &PageType,
        size: Size,
        settings: &GridSettings,
    ) -> Result<Self, LayoutError> {
        let mut grid = Grid::for_page(size, pagetype.margins, settings)?;
        for area in &pagetype.areas {
            let frames = area.frames.iter().map(|f| f.to_frame()).collect();
            grid.define_area(&area.name, frames)?;
        }
        Ok(Self {
            number,
            pagetype: pagetype.name.clone(),
            size,
            margins: pagetype.margins,
            grid,
            items: Vec::new(),
        })
    }

    /// Places a box with its top left corner at `(x, y)`, measured from the page's
    /// top left corner.
    pub fn place(&mut self, x: f64, y: f64, content: ContentBox, destination: Option<u64>) {
        self.items.push(PlacedItem {
            x,
            y,
            content,
            destination,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
