//! Named page regions and their frames.

/// Name of the reserved area spanning the whole grid.
pub const PAGE_AREA: &str = "_page";

/// A rectangle in grid cells with its own flow cursor. All coordinates are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub column: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
    pub cursor_column: u32,
    pub cursor_row: u32,
}

impl Frame {
    pub fn new(column: u32, row: u32, width: u32, height: u32) -> Self {
        Self {
            column,
            row,
            width,
            height,
            cursor_column: 1,
            cursor_row: 1,
        }
    }

    /// Absolute grid column of a frame-relative column.
    pub fn absolute_column(&self, column: i64) -> i64 {
        i64::from(self.column) + column - 1
    }

    /// Absolute grid row of a frame-relative row.
    pub fn absolute_row(&self, row: i64) -> i64 {
        i64::from(self.row) + row - 1
    }

    pub fn reset_cursor(&mut self) {
        self.cursor_column = 1;
        self.cursor_row = 1;
    }
}

/// A named region made of one or more frames; flow continues from one frame to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub name: String,
    frames: Vec<Frame>,
    current: usize,
}

impl Area {
    /// Creates an area. `frames` must not be empty.
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        debug_assert!(!frames.is_empty(), "an area needs at least one frame");
        Self {
            name: name.into(),
            frames,
            current: 0,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frames[self.current]
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.current]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Zero-based index of the active frame.
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Whether the flow has not moved yet: first frame, cursor at its top left.
    pub fn at_start(&self) -> bool {
        let frame = self.frame();
        self.current == 0 && frame.cursor_column == 1 && frame.cursor_row == 1
    }

    /// Switches to the next frame with its cursor at the top left. Returns `false`
    /// if the active frame is the last one.
    pub fn advance_frame(&mut self) -> bool {
        if self.current + 1 >= self.frames.len() {
            return false;
        }
        self.current += 1;
        self.frames[self.current].reset_cursor();
        true
    }
}
