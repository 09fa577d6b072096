//! Grid geometry and cell calculations
//!
//! This module maps the logical icon grid of a zone onto pixel rectangles
//! inside the zone window and derives the window size from the grid metrics.
//! Coordinates are relative to the zone window's top-left corner.

use std::ops::Range;

use thiserror::Error;

use crate::config::settings::SettingsRecord;
use crate::domain::core::Rect;

/// Errors that can occur during grid operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Grid dimensions are invalid (zero)
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: u32, cols: u32 },

    /// Cell side would be empty
    #[error("Invalid cell size: {size}px")]
    InvalidCellSize { size: u32 },

    /// Slot is outside the visible page
    #[error("Slot {slot} is outside the grid page of {capacity} cells")]
    InvalidSlot { slot: usize, capacity: usize },
}

/// Icon grid of a zone
///
/// Cells are square and laid out row-major with a fixed spacing, inside
/// margins given by the zone's scale offsets and below its title bar. When
/// the search row is shown it takes the first grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneGrid {
    rows: u32,
    cols: u32,
    cell_size: u32,
    offset_x: i32,
    offset_y: i32,
    title_height: i32,
    search_row: bool,
}

impl ZoneGrid {
    /// Gap between neighbouring cells
    pub const CELL_SPACING: i32 = 8;
    /// Room reserved for a scrollbar
    pub const SCROLLBAR_EXTENT: i32 = 17;
    /// Minimum zone window width
    pub const MIN_WIDTH: i32 = 160;
    /// Minimum height of the area below the title bar
    pub const MIN_BODY_HEIGHT: i32 = 50;
    /// Height of the search input inside the search row
    pub const SEARCH_BAR_HEIGHT: i32 = 24;

    /// Creates a grid from explicit metrics
    ///
    /// # Arguments
    /// * `rows` - Number of visible rows (must be > 0)
    /// * `cols` - Number of columns (must be > 0)
    /// * `cell_size` - Side of a square cell in pixels (must be > 0)
    /// * `offset_x`, `offset_y` - Margins around the grid; negative values count as zero
    /// * `title_height` - Height of the title bar above the grid
    pub fn new(
        rows: u32,
        cols: u32,
        cell_size: u32,
        offset_x: i32,
        offset_y: i32,
        title_height: i32,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        if cell_size == 0 {
            return Err(GridError::InvalidCellSize { size: cell_size });
        }

        Ok(Self {
            rows,
            cols,
            cell_size,
            offset_x: offset_x.max(0),
            offset_y: offset_y.max(0),
            title_height: title_height.max(0),
            search_row: false,
        })
    }

    /// Builds the grid of a settings record, clamping anything unusable
    pub fn from_settings(settings: &SettingsRecord) -> Self {
        Self {
            rows: settings.rows.max(1) as u32,
            cols: settings.cols.max(1) as u32,
            cell_size: settings.cell_size().max(1) as u32,
            offset_x: settings.scale_offset_x.max(0),
            offset_y: settings.scale_offset_y.max(0),
            title_height: settings.title_height.max(0),
            search_row: false,
        }
    }

    /// Reserves (or releases) the first row for the search input
    pub fn with_search_row(mut self, shown: bool) -> Self {
        self.search_row = shown;
        self
    }

    /// Returns the grid dimensions as (rows, cols)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn title_height(&self) -> i32 {
        self.title_height
    }

    /// Rows available for entries on one page
    pub fn page_rows(&self) -> u32 {
        if self.search_row {
            (self.rows - 1).max(1)
        } else {
            self.rows
        }
    }

    /// Number of entry cells on one page
    pub fn capacity(&self) -> usize {
        (self.page_rows() * self.cols) as usize
    }

    /// Rows needed to show `entry_count` entries
    pub fn total_rows(&self, entry_count: usize) -> u32 {
        entry_count.div_ceil(self.cols as usize) as u32
    }

    /// Largest first visible row for `entry_count` entries
    pub fn max_scroll(&self, entry_count: usize) -> u32 {
        self.total_rows(entry_count).saturating_sub(self.page_rows())
    }

    /// Entry indices shown when the page starts at `scroll_row`
    pub fn visible_range(&self, scroll_row: u32, entry_count: usize) -> Range<usize> {
        let first_row = scroll_row.min(self.max_scroll(entry_count));
        let start = (first_row * self.cols) as usize;
        let end = (start + self.capacity()).min(entry_count);
        start.min(end)..end
    }

    /// Converts a page slot to its rectangle inside the zone window
    ///
    /// # Arguments
    /// * `slot` - Row-major index into the visible page
    ///
    /// # Returns
    /// Cell rectangle or GridError if the slot is outside the page
    pub fn cell_rect(&self, slot: usize) -> Result<Rect, GridError> {
        let capacity = self.capacity();
        if slot >= capacity {
            return Err(GridError::InvalidSlot { slot, capacity });
        }

        let cols = self.cols as usize;
        let row = (slot / cols) as i32 + i32::from(self.search_row);
        let col = (slot % cols) as i32;
        let pitch = self.cell_size as i32 + Self::CELL_SPACING;

        Ok(Rect::new(
            self.offset_x + col * pitch,
            self.body_top() + row * pitch,
            self.cell_size as i32,
            self.cell_size as i32,
        ))
    }

    /// Finds the page slot under a window-relative point
    ///
    /// Points on the spacing between cells hit nothing.
    pub fn slot_at(&self, x: i32, y: i32) -> Option<usize> {
        let pitch = self.cell_size as i32 + Self::CELL_SPACING;
        let local_x = x - self.offset_x;
        let local_y = y - self.body_top();
        if local_x < 0 || local_y < 0 {
            return None;
        }

        let col = local_x / pitch;
        let row = local_y / pitch - i32::from(self.search_row);
        if row < 0 || col >= self.cols as i32 || row >= self.page_rows() as i32 {
            return None;
        }
        if local_x % pitch >= self.cell_size as i32 || local_y % pitch >= self.cell_size as i32 {
            return None;
        }

        Some(row as usize * self.cols as usize + col as usize)
    }

    /// Rectangle of the search input, when the search row is shown
    pub fn search_rect(&self) -> Option<Rect> {
        self.search_row.then(|| {
            Rect::new(
                self.offset_x,
                self.body_top(),
                self.content_width(),
                Self::SEARCH_BAR_HEIGHT.min(self.cell_size as i32),
            )
        })
    }

    /// Window size needed for `entry_count` entries as (width, height)
    ///
    /// A scrollbar's width is always reserved; its height is added when the
    /// entries overflow one page.
    pub fn window_size(&self, entry_count: usize) -> (i32, i32) {
        let rows = self.rows as i32;
        let cell = self.cell_size as i32;

        let width = self.content_width() + 2 * self.offset_x + Self::SCROLLBAR_EXTENT;
        let mut height = rows * cell + (rows - 1) * Self::CELL_SPACING + self.title_height + 2 * self.offset_y;
        if entry_count > (self.rows * self.cols) as usize {
            height += Self::SCROLLBAR_EXTENT;
        }

        (
            width.max(Self::MIN_WIDTH),
            height.max(self.title_height + Self::MIN_BODY_HEIGHT),
        )
    }

    fn content_width(&self) -> i32 {
        let cols = self.cols as i32;
        cols * self.cell_size as i32 + (cols - 1) * Self::CELL_SPACING
    }

    fn body_top(&self) -> i32 {
        self.title_height + self.offset_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_grid() -> ZoneGrid {
        // 5 x 4 grid of 64px cells, 1px margins, 28px title
        ZoneGrid::from_settings(&SettingsRecord::default())
    }

    #[test]
    fn grid_creation_valid() {
        let grid = ZoneGrid::new(3, 2, 40, 0, 0, 20).unwrap();
        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid.cell_size(), 40);
        assert_eq!(grid.capacity(), 6);
    }

    #[test]
    fn grid_creation_invalid_dimensions() {
        let result = ZoneGrid::new(0, 2, 40, 0, 0, 20);
        assert!(matches!(result, Err(GridError::InvalidDimensions { rows: 0, cols: 2 })));

        let result = ZoneGrid::new(3, 0, 40, 0, 0, 20);
        assert!(matches!(result, Err(GridError::InvalidDimensions { rows: 3, cols: 0 })));

        let result = ZoneGrid::new(3, 2, 0, 0, 0, 20);
        assert!(matches!(result, Err(GridError::InvalidCellSize { size: 0 })));
    }

    #[test]
    fn cell_rect_calculation() {
        let grid = default_grid();

        assert_eq!(grid.cell_rect(0).unwrap(), Rect::new(1, 29, 64, 64));
        assert_eq!(grid.cell_rect(1).unwrap(), Rect::new(73, 29, 64, 64));
        assert_eq!(grid.cell_rect(4).unwrap(), Rect::new(1, 101, 64, 64));
        assert!(matches!(
            grid.cell_rect(20),
            Err(GridError::InvalidSlot { slot: 20, capacity: 20 })
        ));
    }

    #[test]
    fn search_row_shifts_cells_down() {
        let grid = default_grid().with_search_row(true);
        assert_eq!(grid.page_rows(), 4);
        assert_eq!(grid.capacity(), 16);
        assert_eq!(grid.cell_rect(0).unwrap(), Rect::new(1, 101, 64, 64));
        assert_eq!(grid.search_rect(), Some(Rect::new(1, 29, 280, 24)));
        assert_eq!(default_grid().search_rect(), None);
    }

    #[test]
    fn slot_hit_testing() {
        let grid = default_grid();
        assert_eq!(grid.slot_at(1, 29), Some(0));
        assert_eq!(grid.slot_at(80, 120), Some(5));
        // spacing between columns
        assert_eq!(grid.slot_at(68, 40), None);
        // title bar
        assert_eq!(grid.slot_at(10, 5), None);
        // right of the last column
        assert_eq!(grid.slot_at(400, 40), None);

        let searching = grid.with_search_row(true);
        assert_eq!(searching.slot_at(1, 29), None);
        assert_eq!(searching.slot_at(1, 101), Some(0));
    }

    #[test]
    fn window_size_from_metrics() {
        let grid = default_grid();
        // 4*64 + 3*8 + 2 + 17 wide, 5*64 + 4*8 + 28 + 2 high
        assert_eq!(grid.window_size(0), (299, 382));
        // overflowing one page adds a scrollbar's height
        assert_eq!(grid.window_size(21), (299, 399));
    }

    #[test]
    fn window_size_respects_minimums() {
        let grid = ZoneGrid::new(1, 1, 20, -5, -5, 28).unwrap();
        assert_eq!(grid.window_size(0), (160, 78));
    }

    #[test]
    fn scrolling_ranges() {
        let grid = ZoneGrid::new(2, 3, 40, 0, 0, 20).unwrap();
        assert_eq!(grid.total_rows(7), 3);
        assert_eq!(grid.max_scroll(7), 1);
        assert_eq!(grid.visible_range(0, 7), 0..6);
        assert_eq!(grid.visible_range(1, 7), 3..7);
        // scrolled past the end clamps to the last page
        assert_eq!(grid.visible_range(9, 7), 3..7);
        assert_eq!(grid.visible_range(0, 0), 0..0);
    }
}
