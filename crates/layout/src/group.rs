use crate::grid::Grid;
use gridpress_types::{BoxContent, ContentBox, PlacedItem, Size, content::extent};

/// Content laid out off-page on a private grid, to be measured and placed later.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub grid: Grid,
    items: Vec<PlacedItem>,
    measured: Option<Size>,
}

impl Group {
    /// `grid` should be group scoped, see [`Grid::group_grid`].
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
            items: Vec::new(),
            measured: None,
        }
    }

    pub fn place(&mut self, x: f64, y: f64, content: ContentBox, destination: Option<u64>) {
        self.items.push(PlacedItem {
            x,
            y,
            content,
            destination,
        });
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Measures the placed content. Until this is called the group has no size.
    pub fn finish(&mut self) -> Size {
        let size = extent(&self.items)
            .map(|r| Size::new(r.right().max(0.0), r.bottom().max(0.0)))
            .unwrap_or_default();
        self.measured = Some(size);
        size
    }

    pub fn measured(&self) -> Option<Size> {
        self.measured
    }

    /// Measured width in grid cells.
    pub fn width_in_cells(&self) -> Option<u32> {
        self.measured.map(|s| self.grid.width_to_columns(s.width))
    }

    /// Measured height in grid cells.
    pub fn height_in_cells(&self) -> Option<u32> {
        self.measured.map(|s| self.grid.height_to_rows(s.height))
    }

    /// The group as a single box, `None` before it is measured.
    pub fn to_content_box(&self) -> Option<ContentBox> {
        self.measured.map(|size| {
            ContentBox::new(
                size,
                BoxContent::Group {
                    name: self.name.clone(),
                    items: self.items.clone(),
                },
            )
        })
    }
}
