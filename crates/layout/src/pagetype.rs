//! Page templates and their selection.
use crate::area::Frame;
use gridpress_style::Margins;
use log::debug;

/// Name of the always-eligible fallback page type.
pub const DEFAULT_PAGETYPE: &str = "Default Page";

/// A frame of a named area as declared on a page type, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub column: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameSpec {
    pub fn new(column: u32, row: u32, width: u32, height: u32) -> Self {
        Self {
            column,
            row,
            width,
            height,
        }
    }

    pub fn to_frame(self) -> Frame {
        Frame::new(self.column, self.row, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaDefinition {
    pub name: String,
    pub frames: Vec<FrameSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageType {
    pub name: String,
    /// Eligibility expression, evaluated against the data node that needs a page.
    pub test: String,
    pub margins: Margins,
    pub areas: Vec<AreaDefinition>,
}

impl PageType {
    pub fn new(name: impl Into<String>, test: impl Into<String>, margins: Margins) -> Self {
        Self {
            name: name.into(),
            test: test.into(),
            margins,
            areas: Vec::new(),
        }
    }
}

/// Page types in declaration order. The fallback type is always the first entry.
#[derive(Debug, Clone)]
pub struct PageTypeRegistry {
    types: Vec<PageType>,
}

impl PageTypeRegistry {
    pub fn new(default_margins: Margins) -> Self {
        Self {
            types: vec![PageType::new(DEFAULT_PAGETYPE, "true()", default_margins)],
        }
    }

    /// Appends a page type. A type declared again under the same name replaces the
    /// earlier declaration and counts as the most recent one.
    pub fn register(&mut self, pagetype: PageType) {
        if let Some(pos) = self.types.iter().position(|t| t.name == pagetype.name) {
            debug!("Page type '{}' redeclared", pagetype.name);
            self.types.remove(pos);
        }
        self.types.push(pagetype);
    }

    pub fn get(&self, name: &str) -> Option<&PageType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageType> {
        self.types.iter()
    }

    /// Returns the most recently registered page type for which `eligible` is true.
    /// The first error returned by `eligible` aborts the search.
    pub fn select<E>(
        &self,
        mut eligible: impl FnMut(&PageType) -> Result<bool, E>,
    ) -> Result<Option<&PageType>, E> {
        for pagetype in self.types.iter().rev() {
            if eligible(pagetype)? {
                debug!("Selected page type '{}'", pagetype.name);
                return Ok(Some(pagetype));
            }
        }
        Ok(None)
    }
}
