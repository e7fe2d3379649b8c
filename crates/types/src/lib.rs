pub mod content;
pub mod geometry;

pub use content::{BoxContent, ContentBox, PlacedItem, TextLine};
pub use geometry::{Rect, Size};
