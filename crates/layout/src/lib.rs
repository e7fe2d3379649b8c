//! Grid-based page space allocation.
//!
//! A page (or group) owns a [`Grid`]: a matrix of equally sized cells separated by
//! gaps. Content is placed into named [`Area`]s made of rectangular frames, each with
//! its own flow cursor. Occupied cells are counted in an [`AllocationMatrix`] that only
//! ever grows during a run.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Unknown area '{0}'")]
    UnknownArea(String),
    #[error("The page leaves no room for a grid cell: {available_width:.2}pt x {available_height:.2}pt available.")]
    EmptyGrid {
        available_width: f64,
        available_height: f64,
    },
    #[error("Invalid grid setting: {0}")]
    InvalidGrid(String),
    #[error("Frame {column},{row} ({width}x{height}) lies outside the {nx}x{ny} grid of area '{area}'.")]
    FrameOutOfGrid {
        area: String,
        column: u32,
        row: u32,
        width: u32,
        height: u32,
        nx: u32,
        ny: u32,
    },
    #[error("Group '{0}' is not defined")]
    UnknownGroup(String),
    #[error("Page type '{0}' is not defined")]
    UnknownPageType(String),
}

pub mod area;
pub mod grid;
pub mod group;
pub mod ids;
pub mod matrix;
pub mod page;
pub mod pagetype;
pub mod sizing;

pub use area::{Area, Frame, PAGE_AREA};
pub use grid::{Grid, GridSettings, PlacementReport};
pub use group::Group;
pub use ids::{IdGenerator, next_id};
pub use matrix::AllocationMatrix;
pub use page::Page;
pub use pagetype::{AreaDefinition, FrameSpec, PageType, PageTypeRegistry, DEFAULT_PAGETYPE};
pub use sizing::{SizeRequest, resolve_size};

// Re-export geometry types used throughout the layout API
pub use gridpress_types::{ContentBox, PlacedItem, Rect, Size};
