//! Render targets — the surface the renderer draws on.
//!
//! The renderer only knows this trait. The terminal implementation lives in
//! `viewer::terminal`; [`MemoryTarget`] is a plain character grid for
//! running the viewer headless.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A rectangle in target coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub row: u16,
    pub col: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub fn new(row: u16, col: u16, width: u16, height: u16) -> Self {
        Self {
            row,
            col,
            width,
            height,
        }
    }

    /// The region inside a one-cell border.
    pub fn inner(&self) -> Region {
        Region {
            row: self.row + 1,
            col: self.col + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }

    pub fn bottom(&self) -> u16 {
        self.row + self.height
    }

    pub fn right(&self) -> u16 {
        self.col + self.width
    }

    pub fn contains(&self, row: u16, col: u16) -> bool {
        row >= self.row && row < self.bottom() && col >= self.col && col < self.right()
    }
}

/// Visual attribute for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Normal,
    /// Section headers and pane titles.
    Header,
    /// The selected list row.
    Highlight,
    /// The status legend.
    Bold,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("write outside target at row {row}, col {col}")]
    OutOfBounds { row: u16, col: u16 },

    #[error("render backend failed: {0}")]
    Backend(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Backend(err.to_string())
    }
}

/// Trait for drawing surfaces.
pub trait RenderTarget {
    /// Current size. Terminal targets pick up resizes here.
    fn size(&mut self) -> Result<Size, RenderError>;

    /// Write `text` starting at (`row`, `col`). Text running past the right
    /// edge of the target is an error; callers clip first.
    fn write_text(&mut self, row: u16, col: u16, text: &str, style: Style)
        -> Result<(), RenderError>;

    /// Draw a single-line box along the edge of `region`.
    fn draw_border(&mut self, region: Region) -> Result<(), RenderError>;

    /// Blank every cell in `region`.
    fn clear(&mut self, region: Region) -> Result<(), RenderError>;

    /// Push the finished frame out. Called once per frame.
    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::Normal,
        }
    }
}

/// In-memory character grid.
///
/// Failures can be scripted with [`MemoryTarget::fail_writes_on_row`] to
/// exercise the renderer's error handling.
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    size: Size,
    cells: Vec<Cell>,
    failing_row: Option<u16>,
    failures_left: usize,
    presented: usize,
}

impl MemoryTarget {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            cells: vec![Cell::default(); width as usize * height as usize],
            failing_row: None,
            failures_left: 0,
            presented: 0,
        }
    }

    /// Resize the grid, dropping its contents.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self {
            failing_row: self.failing_row,
            failures_left: self.failures_left,
            presented: self.presented,
            ..Self::new(width, height)
        };
    }

    /// Make the next `times` writes touching `row` fail with a backend error.
    pub fn fail_writes_on_row(&mut self, row: u16, times: usize) {
        self.failing_row = Some(row);
        self.failures_left = times;
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> usize {
        self.presented
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        if row >= self.size.height || col >= self.size.width {
            return None;
        }
        Some(self.cells[self.index(row, col)])
    }

    /// One row as a string, trailing blanks removed.
    pub fn row_text(&self, row: u16) -> String {
        (0..self.size.width)
            .filter_map(|col| self.cell(row, col).map(|c| c.ch))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// All rows joined with newlines.
    pub fn contents(&self) -> String {
        (0..self.size.height)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.size.width as usize + col as usize
    }

    fn set(&mut self, row: u16, col: u16, ch: char, style: Style) {
        let idx = self.index(row, col);
        self.cells[idx] = Cell { ch, style };
    }

    fn check_region(&self, region: Region) -> Result<(), RenderError> {
        if region.bottom() > self.size.height || region.right() > self.size.width {
            return Err(RenderError::OutOfBounds {
                row: region.bottom(),
                col: region.right(),
            });
        }
        Ok(())
    }
}

impl RenderTarget for MemoryTarget {
    fn size(&mut self) -> Result<Size, RenderError> {
        Ok(self.size)
    }

    fn write_text(
        &mut self,
        row: u16,
        col: u16,
        text: &str,
        style: Style,
    ) -> Result<(), RenderError> {
        if self.failing_row == Some(row) && self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(RenderError::Backend(format!("scripted failure on row {}", row)));
        }
        let len = text.chars().count() as u16;
        if row >= self.size.height || col.saturating_add(len) > self.size.width {
            return Err(RenderError::OutOfBounds { row, col });
        }
        for (i, ch) in text.chars().enumerate() {
            self.set(row, col + i as u16, ch, style);
        }
        Ok(())
    }

    fn draw_border(&mut self, region: Region) -> Result<(), RenderError> {
        self.check_region(region)?;
        if region.width < 2 || region.height < 2 {
            return Ok(());
        }
        let (top, bottom) = (region.row, region.bottom() - 1);
        let (left, right) = (region.col, region.right() - 1);
        for col in left + 1..right {
            self.set(top, col, '─', Style::Normal);
            self.set(bottom, col, '─', Style::Normal);
        }
        for row in top + 1..bottom {
            self.set(row, left, '│', Style::Normal);
            self.set(row, right, '│', Style::Normal);
        }
        self.set(top, left, '┌', Style::Normal);
        self.set(top, right, '┐', Style::Normal);
        self.set(bottom, left, '└', Style::Normal);
        self.set(bottom, right, '┘', Style::Normal);
        Ok(())
    }

    fn clear(&mut self, region: Region) -> Result<(), RenderError> {
        self.check_region(region)?;
        for row in region.row..region.bottom() {
            for col in region.col..region.right() {
                self.set(row, col, ' ', Style::Normal);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let mut t = MemoryTarget::new(10, 3);
        t.write_text(1, 2, "hey", Style::Highlight).unwrap();
        assert_eq!(t.row_text(1), "  hey");
        assert_eq!(t.cell(1, 2).unwrap().style, Style::Highlight);
    }

    #[test]
    fn test_write_past_edge_is_error() {
        let mut t = MemoryTarget::new(5, 2);
        assert!(matches!(
            t.write_text(0, 3, "abc", Style::Normal),
            Err(RenderError::OutOfBounds { .. })
        ));
        assert!(t.write_text(2, 0, "a", Style::Normal).is_err());
        assert_eq!(t.row_text(0), "");
    }

    #[test]
    fn test_border() {
        let mut t = MemoryTarget::new(4, 3);
        t.draw_border(Region::new(0, 0, 4, 3)).unwrap();
        assert_eq!(t.contents(), "┌──┐\n│  │\n└──┘");
        assert!(t.draw_border(Region::new(0, 0, 5, 3)).is_err());
    }

    #[test]
    fn test_scripted_failure() {
        let mut t = MemoryTarget::new(5, 2);
        t.fail_writes_on_row(1, 1);
        assert!(matches!(
            t.write_text(1, 0, "a", Style::Normal),
            Err(RenderError::Backend(_))
        ));
        assert!(t.write_text(1, 0, "a", Style::Normal).is_ok());
    }

    #[test]
    fn test_region_inner() {
        let r = Region::new(0, 30, 20, 10);
        assert_eq!(r.inner(), Region::new(1, 31, 18, 8));
        assert!(r.contains(0, 30));
        assert!(!r.contains(10, 30));
    }
}
