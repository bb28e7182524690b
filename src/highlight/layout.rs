//! Layout snapshots and character-range to rectangle mapping
//!
//! A token can wrap across visual lines, so one character range maps to
//! zero, one or several rectangles.

use tracing::debug;
use unicode_width::UnicodeWidthChar;

use super::tokenizer::TokenRange;

/// Axis-aligned box in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point lies inside (right and bottom edges excluded)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Line-wrapped geometry of the current text, as seen by the host
pub trait TextLayout {
    /// Number of characters the layout currently covers
    fn char_count(&self) -> usize;

    /// Selection rectangles for the character range `start..end`, one per
    /// visual line touched, top-to-bottom
    fn selection_rects(&self, start: usize, end: usize) -> Vec<Rect>;
}

/// Map a token range onto the rectangles that cover it
///
/// Ranges that no longer fit the layout produce no rectangles.
pub fn map_to_rectangles<L: TextLayout + ?Sized>(range: TokenRange, layout: &L) -> Vec<Rect> {
    let count = layout.char_count();
    let Some(end) = range.checked_end().filter(|&end| end <= count) else {
        debug!(
            offset = range.offset,
            len = range.len,
            chars = count,
            "stale token range ignored"
        );
        return Vec::new();
    };
    if range.is_empty() {
        return Vec::new();
    }
    layout.selection_rects(range.offset, end)
}

/// Placement of one character in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
    /// Display width in cells (0 for line breaks and combining marks)
    pub width: usize,
}

/// Monospace, character-wrapped layout
///
/// Every character occupies `width` cells of `cell_width` x `cell_height`.
/// Lines break at `\n` and whenever the next glyph would cross `columns`.
#[derive(Debug, Clone)]
pub struct GridLayout {
    text: String,
    columns: usize,
    cell_width: f32,
    cell_height: f32,
    cells: Vec<CellPos>,
}

impl GridLayout {
    /// Lay out `text` in a grid `columns` cells wide with unit cells
    pub fn new(text: &str, columns: usize) -> Self {
        Self::with_cell_size(text, columns, 1.0, 1.0)
    }

    pub fn with_cell_size(text: &str, columns: usize, cell_width: f32, cell_height: f32) -> Self {
        let mut layout = Self {
            text: text.to_string(),
            columns: columns.max(1),
            cell_width,
            cell_height,
            cells: Vec::new(),
        };
        layout.reflow();
        layout
    }

    /// Replace the text and re-wrap
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.reflow();
    }

    /// Change the wrap width and re-wrap
    pub fn resize(&mut self, columns: usize) {
        self.columns = columns.max(1);
        self.reflow();
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of visual lines
    pub fn line_count(&self) -> usize {
        match self.cells.last() {
            None => 1,
            Some(last) if self.text.ends_with('\n') => last.row + 2,
            Some(last) => last.row + 1,
        }
    }

    /// Grid position of a character
    pub fn cell(&self, char_idx: usize) -> Option<CellPos> {
        self.cells.get(char_idx).copied()
    }

    /// Where a caret at `char_idx` would sit (`char_idx == char_count()`
    /// is the end of the text)
    pub fn caret_position(&self, char_idx: usize) -> (usize, usize) {
        if let Some(cell) = self.cells.get(char_idx) {
            return (cell.row, cell.col);
        }
        match self.cells.last() {
            None => (0, 0),
            Some(last) if self.text.ends_with('\n') => (last.row + 1, 0),
            Some(last) => {
                let col = last.col + last.width;
                if col >= self.columns {
                    (last.row + 1, 0)
                } else {
                    (last.row, col)
                }
            }
        }
    }

    fn reflow(&mut self) {
        self.cells.clear();
        let mut row = 0;
        let mut col = 0;
        for ch in self.text.chars() {
            if ch == '\n' {
                self.cells.push(CellPos { row, col, width: 0 });
                row += 1;
                col = 0;
                continue;
            }
            let width = ch.width().unwrap_or(0);
            if col > 0 && col + width > self.columns {
                row += 1;
                col = 0;
            }
            self.cells.push(CellPos { row, col, width });
            col += width;
        }
    }

    fn row_rect(&self, row: usize, first_col: usize, last_col: usize) -> Rect {
        Rect::new(
            first_col as f32 * self.cell_width,
            row as f32 * self.cell_height,
            (last_col - first_col) as f32 * self.cell_width,
            self.cell_height,
        )
    }
}

impl TextLayout for GridLayout {
    fn char_count(&self) -> usize {
        self.cells.len()
    }

    fn selection_rects(&self, start: usize, end: usize) -> Vec<Rect> {
        let Some(cells) = self.cells.get(start..end) else {
            return Vec::new();
        };

        // (row, first col, one past last col) for the line being collected
        let mut rects = Vec::new();
        let mut current: Option<(usize, usize, usize)> = None;
        for cell in cells.iter().filter(|c| c.width > 0) {
            match current {
                Some((row, first, _)) if row == cell.row => {
                    current = Some((row, first, cell.col + cell.width));
                }
                _ => {
                    if let Some((row, first, last)) = current {
                        rects.push(self.row_rect(row, first, last));
                    }
                    current = Some((cell.row, cell.col, cell.col + cell.width));
                }
            }
        }
        if let Some((row, first, last)) = current {
            rects.push(self.row_rect(row, first, last));
        }
        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Layout double that returns a fixed rectangle for any in-bounds range
    struct FixedLayout {
        chars: usize,
        rect: Rect,
    }

    impl TextLayout for FixedLayout {
        fn char_count(&self) -> usize {
            self.chars
        }

        fn selection_rects(&self, _start: usize, _end: usize) -> Vec<Rect> {
            vec![self.rect]
        }
    }

    #[test]
    fn test_single_line_token_roundtrip() {
        let rect = Rect::new(12.0, 4.0, 30.0, 17.0);
        let layout = FixedLayout { chars: 20, rect };
        assert_eq!(map_to_rectangles(TokenRange::new(3, 5), &layout), vec![rect]);
    }

    #[test]
    fn test_stale_range_maps_to_nothing() {
        let layout = FixedLayout {
            chars: 4,
            rect: Rect::default(),
        };
        assert!(map_to_rectangles(TokenRange::new(2, 5), &layout).is_empty());
        assert!(map_to_rectangles(TokenRange::new(9, 1), &layout).is_empty());
        assert!(map_to_rectangles(TokenRange::new(4, 0), &layout).is_empty());
    }

    #[test]
    fn test_overflowing_range_maps_to_nothing() {
        let layout = GridLayout::new("#abc", 10);
        assert!(map_to_rectangles(TokenRange::new(1, usize::MAX), &layout).is_empty());
        assert!(map_to_rectangles(TokenRange::new(usize::MAX, 1), &layout).is_empty());
        assert!(layout.selection_rects(3, 1).is_empty());
    }

    #[test]
    fn test_grid_single_line() {
        let layout = GridLayout::with_cell_size("hello #world", 40, 8.0, 16.0);
        let rects = map_to_rectangles(TokenRange::new(6, 6), &layout);
        assert_eq!(rects, vec![Rect::new(48.0, 0.0, 48.0, 16.0)]);
    }

    #[test]
    fn test_grid_wrapped_token() {
        // Width 10: "hello #wor" | "ld"
        let layout = GridLayout::new("hello #world", 10);
        let rects = map_to_rectangles(TokenRange::new(6, 6), &layout);
        assert_eq!(
            rects,
            vec![Rect::new(6.0, 0.0, 4.0, 1.0), Rect::new(0.0, 1.0, 2.0, 1.0)]
        );
    }

    #[test]
    fn test_grid_hard_breaks() {
        let layout = GridLayout::new("ab\n#cd", 10);
        assert_eq!(layout.line_count(), 2);
        assert_eq!(layout.cell(3), Some(CellPos { row: 1, col: 0, width: 1 }));
        assert_eq!(
            layout.selection_rects(1, 5),
            vec![Rect::new(1.0, 0.0, 1.0, 1.0), Rect::new(0.0, 1.0, 2.0, 1.0)]
        );
    }

    #[test]
    fn test_grid_wide_glyphs_wrap_whole() {
        // Two-cell glyphs never straddle the right edge
        let layout = GridLayout::new("a日本", 4);
        assert_eq!(layout.cell(1), Some(CellPos { row: 0, col: 1, width: 2 }));
        assert_eq!(layout.cell(2), Some(CellPos { row: 1, col: 0, width: 2 }));
    }

    #[test]
    fn test_grid_resize_rewraps() {
        let mut layout = GridLayout::new("#abcdef", 20);
        assert_eq!(layout.selection_rects(0, 7).len(), 1);
        layout.resize(4);
        assert_eq!(layout.selection_rects(0, 7).len(), 2);
        assert_eq!(layout.line_count(), 2);
    }

    #[test]
    fn test_caret_position() {
        let layout = GridLayout::new("abcd", 4);
        assert_eq!(layout.caret_position(0), (0, 0));
        assert_eq!(layout.caret_position(4), (1, 0));
        let layout = GridLayout::new("ab\n", 4);
        assert_eq!(layout.caret_position(3), (1, 0));
        assert_eq!(GridLayout::new("", 4).caret_position(0), (0, 0));
    }
}
