pub mod dimension;
pub mod parsers;

pub use dimension::{Extent, Margins, PageSize};
pub use parsers::StyleParseError;
