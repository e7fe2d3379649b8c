//! Grid geometry and cell allocation for one page or group.
use crate::LayoutError;
use crate::area::{Area, Frame, PAGE_AREA};
use crate::matrix::AllocationMatrix;
use gridpress_style::Margins;
use gridpress_types::Size;
use log::{debug, warn};
use std::collections::HashMap;

/// Tolerance, in cell units, when converting lengths back to cells.
const EPSILON: f64 = 0.005;

/// Row count of a group grid. Groups have no page bottom.
pub const GROUP_ROWS: u32 = 10_000;

/// Cell geometry requested by configuration or `SetGrid`. A column/row count,
/// when present, takes precedence over the cell size on that axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub columns: Option<u32>,
    pub rows: Option<u32>,
}

impl Default for GridSettings {
    fn default() -> Self {
        // 1cm square cells without gaps
        Self {
            cell_width: 28.346_457,
            cell_height: 28.346_457,
            gap_x: 0.0,
            gap_y: 0.0,
            columns: None,
            rows: None,
        }
    }
}

/// Page edges breached by a placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl PlacementReport {
    pub fn is_inside(&self) -> bool {
        !(self.left || self.top || self.right || self.bottom)
    }

    fn breached_edges(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.left, "left"),
            (self.top, "top"),
            (self.right, "right"),
            (self.bottom, "bottom"),
        ]
        .into_iter()
        .filter_map(|(hit, edge)| hit.then_some(edge))
    }
}

fn resolve_axis(
    available: f64,
    cell: f64,
    gap: f64,
    count: Option<u32>,
    axis: &str,
) -> Result<(f64, u32), LayoutError> {
    match count {
        Some(0) => Err(LayoutError::InvalidGrid(format!("{} count must be at least 1", axis))),
        Some(n) => {
            let cell = (available - f64::from(n - 1) * gap) / f64::from(n);
            if cell <= 0.0 {
                return Err(LayoutError::InvalidGrid(format!(
                    "{} {}s with a gap of {:.2}pt do not fit into {:.2}pt",
                    n, axis, gap, available
                )));
            }
            Ok((cell, n))
        }
        None => {
            if cell <= 0.0 {
                return Err(LayoutError::InvalidGrid(format!("{} size must be positive", axis)));
            }
            let n = ((available + gap) / (cell + gap) + EPSILON).floor().max(0.0);
            Ok((cell, n as u32))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub nx: u32,
    pub ny: u32,
    pub margins: Margins,
    matrix: AllocationMatrix,
    areas: HashMap<String, Area>,
    group_scoped: bool,
}

impl Grid {
    /// Builds the grid for a page of the given size. The reserved page area spans
    /// all `nx` x `ny` cells.
    pub fn for_page(
        page: Size,
        margins: Margins,
        settings: &GridSettings,
    ) -> Result<Self, LayoutError> {
        let available_width = page.width - margins.left - margins.right;
        let available_height = page.height - margins.top - margins.bottom;
        let empty = || LayoutError::EmptyGrid {
            available_width,
            available_height,
        };
        if available_width <= 0.0 || available_height <= 0.0 {
            return Err(empty());
        }
        let (cell_width, nx) = resolve_axis(
            available_width,
            settings.cell_width,
            settings.gap_x,
            settings.columns,
            "column",
        )?;
        let (cell_height, ny) = resolve_axis(
            available_height,
            settings.cell_height,
            settings.gap_y,
            settings.rows,
            "row",
        )?;
        if nx == 0 || ny == 0 {
            return Err(empty());
        }
        debug!(
            "Page grid {}x{} with cells {:.2}pt x {:.2}pt",
            nx, ny, cell_width, cell_height
        );
        Ok(Self::build(
            cell_width,
            cell_height,
            settings.gap_x,
            settings.gap_y,
            nx,
            ny,
            margins,
            false,
        ))
    }

    /// A group-scoped grid with this grid's cell geometry and width, without margins.
    pub fn group_grid(&self) -> Self {
        Self::build(
            self.cell_width,
            self.cell_height,
            self.gap_x,
            self.gap_y,
            self.nx,
            GROUP_ROWS,
            Margins::default(),
            true,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        cell_width: f64,
        cell_height: f64,
        gap_x: f64,
        gap_y: f64,
        nx: u32,
        ny: u32,
        margins: Margins,
        group_scoped: bool,
    ) -> Self {
        let mut areas = HashMap::new();
        areas.insert(
            PAGE_AREA.to_string(),
            Area::new(PAGE_AREA, vec![Frame::new(1, 1, nx, ny)]),
        );
        Self {
            cell_width,
            cell_height,
            gap_x,
            gap_y,
            nx,
            ny,
            margins,
            matrix: AllocationMatrix::new(),
            areas,
            group_scoped,
        }
    }

    pub fn is_group_scoped(&self) -> bool {
        self.group_scoped
    }

    pub fn matrix(&self) -> &AllocationMatrix {
        &self.matrix
    }

    pub fn allocate(&mut self, x: u32, y: u32) {
        self.matrix.allocate(x, y);
    }

    pub fn occupancy(&self, x: u32, y: u32) -> u32 {
        self.matrix.occupancy(x, y)
    }

    // --- Areas ---

    /// Adds (or replaces) a named area. Every frame must lie inside the grid.
    pub fn define_area(&mut self, name: &str, frames: Vec<Frame>) -> Result<(), LayoutError> {
        if frames.is_empty() {
            return Err(LayoutError::InvalidGrid(format!("area '{}' has no frames", name)));
        }
        for f in &frames {
            let fits = f.column >= 1
                && f.row >= 1
                && f.width >= 1
                && f.height >= 1
                && spans_within(f.column, f.width, self.nx)
                && spans_within(f.row, f.height, self.ny);
            if !fits {
                return Err(LayoutError::FrameOutOfGrid {
                    area: name.to_string(),
                    column: f.column,
                    row: f.row,
                    width: f.width,
                    height: f.height,
                    nx: self.nx,
                    ny: self.ny,
                });
            }
        }
        self.areas.insert(name.to_string(), Area::new(name, frames));
        Ok(())
    }

    pub fn has_area(&self, name: &str) -> bool {
        self.areas.contains_key(name)
    }

    pub fn area(&self, name: &str) -> Result<&Area, LayoutError> {
        self.areas
            .get(name)
            .ok_or_else(|| LayoutError::UnknownArea(name.to_string()))
    }

    fn area_mut(&mut self, name: &str) -> Result<&mut Area, LayoutError> {
        self.areas
            .get_mut(name)
            .ok_or_else(|| LayoutError::UnknownArea(name.to_string()))
    }

    fn frame(&self, area: &str) -> Result<&Frame, LayoutError> {
        Ok(self.area(area)?.frame())
    }

    /// Moves the area's flow to its next frame. `false` when no frame is left.
    pub fn advance_frame(&mut self, area: &str) -> Result<bool, LayoutError> {
        Ok(self.area_mut(area)?.advance_frame())
    }

    /// Current (column, row) of the area's flow cursor, frame-relative.
    pub fn cursor(&self, area: &str) -> Result<(u32, u32), LayoutError> {
        let frame = self.frame(area)?;
        Ok((frame.cursor_column, frame.cursor_row))
    }

    /// Whether nothing has advanced the area's flow on this grid yet.
    pub fn at_flow_start(&self, area: &str) -> Result<bool, LayoutError> {
        Ok(self.area(area)?.at_start())
    }

    pub fn set_cursor(&mut self, area: &str, column: u32, row: u32) -> Result<(), LayoutError> {
        let frame = self.area_mut(area)?.frame_mut();
        frame.cursor_column = column.max(1);
        frame.cursor_row = row.max(1);
        Ok(())
    }

    /// Width of the area's active frame in cells.
    pub fn frame_width(&self, area: &str) -> Result<u32, LayoutError> {
        Ok(self.frame(area)?.width)
    }

    // --- Geometry ---

    /// Horizontal offset of a frame-relative column from the page's left edge.
    pub fn pos_x(&self, column: i64, area: &str) -> Result<f64, LayoutError> {
        let absolute = self.frame(area)?.absolute_column(column);
        Ok(self.margins.left + (absolute - 1) as f64 * (self.cell_width + self.gap_x))
    }

    /// Vertical offset of a frame-relative row from the page's top edge.
    pub fn pos_y(&self, row: i64, area: &str) -> Result<f64, LayoutError> {
        let absolute = self.frame(area)?.absolute_row(row);
        Ok(self.margins.top + (absolute - 1) as f64 * (self.cell_height + self.gap_y))
    }

    /// Length spanned by `columns` cells including the gaps between them.
    pub fn width(&self, columns: u32) -> f64 {
        span(columns, self.cell_width, self.gap_x)
    }

    /// Length spanned by `rows` cells including the gaps between them.
    pub fn height(&self, rows: u32) -> f64 {
        span(rows, self.cell_height, self.gap_y)
    }

    pub fn width_to_columns(&self, length: f64) -> u32 {
        cells_for(length, self.cell_width, self.gap_x)
    }

    pub fn height_to_rows(&self, length: f64) -> u32 {
        cells_for(length, self.cell_height, self.gap_y)
    }

    // --- Flow ---

    fn row_is_free(&self, frame: &Frame, column: u32, columns: u32, row: u32) -> bool {
        if column < 1
            || row < 1
            || row > frame.height
            || !spans_within(column, columns, frame.width)
        {
            return false;
        }
        let y = frame.absolute_row(i64::from(row));
        (column..column + columns).all(|c| {
            let x = frame.absolute_column(i64::from(c));
            x >= 1
                && y >= 1
                && x <= i64::from(self.nx)
                && y <= i64::from(self.ny)
                && self.matrix.is_free(x as u32, y as u32)
        })
    }

    /// Whether `columns` cells starting at `column` in frame row `row` are free and
    /// inside the active frame.
    pub fn fits_in_row(
        &self,
        column: u32,
        columns: u32,
        row: u32,
        area: &str,
    ) -> Result<bool, LayoutError> {
        let frame = self.frame(area)?;
        Ok(self.row_is_free(frame, column, columns, row))
    }

    /// First frame row at or below the cursor where a `columns` x `rows` block starting
    /// at `start_column` is entirely free. `None` when the active frame has no such row.
    pub fn find_suitable_row(
        &self,
        columns: u32,
        rows: u32,
        start_column: u32,
        area: &str,
    ) -> Result<Option<u32>, LayoutError> {
        let frame = self.frame(area)?;
        let columns = columns.max(1);
        let rows = rows.max(1);
        if start_column < 1
            || !spans_within(start_column, columns, frame.width)
            || rows > frame.height
        {
            return Ok(None);
        }
        let last_candidate = frame.height - rows + 1;
        let found = (frame.cursor_row..=last_candidate).find(|&candidate| {
            (candidate..candidate + rows).all(|r| self.row_is_free(frame, start_column, columns, r))
        });
        Ok(found)
    }

    /// Marks the cells of a `columns` x `rows` block at frame-relative `(x, y)` and
    /// advances the frame's cursor past it. Cells outside the grid are skipped and
    /// reported; the warning is not logged for group grids.
    pub fn allocate_block(
        &mut self,
        x: i64,
        y: i64,
        columns: u32,
        rows: u32,
        area: &str,
    ) -> Result<PlacementReport, LayoutError> {
        let frame = self.frame(area)?.clone();
        let (nx, ny) = (i64::from(self.nx), i64::from(self.ny));
        let mut report = PlacementReport::default();
        if columns > 0 && rows > 0 {
            let (left, right) = (
                frame.absolute_column(x),
                frame.absolute_column(x) + i64::from(columns) - 1,
            );
            let (top, bottom) = (frame.absolute_row(y), frame.absolute_row(y) + i64::from(rows) - 1);
            report.left = left < 1;
            report.right = right > nx;
            report.top = top < 1;
            report.bottom = bottom > ny;
            // Only the part inside the grid is marked, so oversized blocks stay cheap.
            for ay in top.max(1)..=bottom.min(ny) {
                for ax in left.max(1)..=right.min(nx) {
                    self.matrix.allocate(ax as u32, ay as u32);
                }
            }
        }
        if !self.group_scoped {
            for edge in report.breached_edges() {
                warn!(
                    "Object at {},{} ({}x{} cells) in area '{}' exceeds the {} margin.",
                    x, y, columns, rows, area, edge
                );
            }
        }

        let target = self.area_mut(area)?.frame_mut();
        if x + i64::from(columns) > i64::from(frame.width) {
            target.cursor_column = 1;
            target.cursor_row = clamp_cursor(y + i64::from(rows));
        } else {
            target.cursor_column = clamp_cursor(x + i64::from(columns));
            target.cursor_row = clamp_cursor(y);
        }
        Ok(report)
    }

    /// Moves the cursor to the start of the next free full-width row, skipping
    /// `rows - 1` additional rows. At column 1 the current row counts as used.
    /// Returns `false` when the active frame has no free row left.
    pub fn next_row(&mut self, area: &str, rows: u32) -> Result<bool, LayoutError> {
        let rows = rows.max(1);
        let frame = self.area_mut(area)?.frame_mut();
        let advance = if frame.cursor_column == 1 { rows } else { rows - 1 };
        frame.cursor_row = frame.cursor_row.saturating_add(advance);
        frame.cursor_column = 1;
        let width = frame.width;
        match self.find_suitable_row(width, 1, 1, area)? {
            Some(row) => {
                self.area_mut(area)?.frame_mut().cursor_row = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Whether `cells` cells starting at `start` end at or before `limit`.
fn spans_within(start: u32, cells: u32, limit: u32) -> bool {
    u64::from(start) + u64::from(cells.max(1)) - 1 <= u64::from(limit)
}

fn span(cells: u32, cell: f64, gap: f64) -> f64 {
    if cells == 0 {
        return 0.0;
    }
    f64::from(cells) * cell + f64::from(cells - 1) * gap
}

fn cells_for(length: f64, cell: f64, gap: f64) -> u32 {
    if length <= 0.0 {
        return 0;
    }
    (length / (cell + gap) - EPSILON).ceil().max(0.0) as u32
}

fn clamp_cursor(value: i64) -> u32 {
    value.clamp(1, i64::from(u32::MAX)) as u32
}
