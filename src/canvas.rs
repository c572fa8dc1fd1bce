//! absolute-position drawing.
//!
//! every primitive is queued into an in-memory frame. nothing reaches the terminal until
//! [`Canvas::present()`] writes the whole frame at once, so a draw step is never half-visible.
//!
//! coordinates are 1-based terminal cells, `(row, col)`.

use {
    crossterm::{
        QueueableCommand, cursor,
        style::{self, Stylize},
        terminal,
    },
    std::io::{self, Write},
};

/// the column holding each graph's vertical axis.
pub const ORIGIN_COL: u16 = 8;

/// the width that labels are padded or truncated to.
pub const LABEL_WIDTH: usize = 20;

/// a drawing surface over some terminal-like output.
pub struct Canvas<W = io::Stdout> {
    out: W,
    frame: Vec<u8>,
}

// === impl Canvas ===

impl Canvas {
    /// returns a canvas drawing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Canvas<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: Vec::new(),
        }
    }

    /// writes the queued frame to the output, and flushes it.
    pub fn present(&mut self) -> io::Result<()> {
        let Self { out, frame } = self;
        out.write_all(frame)?;
        frame.clear();
        out.flush()
    }

    /// clears the screen and homes the cursor.
    pub fn clear(&mut self) -> io::Result<()> {
        self.frame
            .queue(terminal::Clear(terminal::ClearType::All))?
            .queue(cursor::MoveTo(0, 0))
            .map(drop)
    }

    /// moves the cursor to the start of `row`, below whatever has been drawn.
    pub fn park(&mut self, row: u16) -> io::Result<()> {
        self.frame.queue(cursor::MoveTo(0, row.saturating_sub(1))).map(drop)
    }

    /// writes `text` verbatim at `(row, col)`.
    pub fn text(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        self.move_to(row, col)?.queue(style::Print(text)).map(drop)
    }

    /// writes `text` at `(row, col)` into a fixed-width field.
    ///
    /// the field is padded, so a shorter label overwrites every character of a longer one.
    pub fn draw_label(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        let field = text.chars().take(LABEL_WIDTH).collect::<String>();
        let field = format!("{field:<LABEL_WIDTH$}");
        self.text(row, col, &field)
    }

    /// draws a vertical axis of `height` rows and a horizontal axis of `width` columns.
    ///
    /// the axes meet at [`ORIGIN_COL`] on row `row_offset + height`. `origin_label` is written
    /// beside the origin, `top_label` beside the top of the vertical axis.
    pub fn draw_axis(
        &mut self,
        height: u16,
        width: u16,
        origin_label: &str,
        top_label: &str,
        row_offset: u16,
    ) -> io::Result<()> {
        let origin_row = row_offset + height;

        for row in row_offset..=origin_row {
            self.move_to(row, ORIGIN_COL)?
                .queue(style::PrintStyledContent('|'.grey()))?;
        }
        for col in ORIGIN_COL..=ORIGIN_COL.saturating_add(width) {
            self.move_to(origin_row, col)?
                .queue(style::PrintStyledContent('-'.grey()))?;
        }

        self.text(origin_row, 1, origin_label)?;
        self.text(row_offset, 1, top_label)
    }

    /// plots `glyph` at sample `x`, level `y`, on a graph `height` rows tall.
    ///
    /// `y` is clamped to the graph, so a point never lands outside of its axes.
    pub fn draw_point(
        &mut self,
        x: u16,
        y: u16,
        height: u16,
        row_offset: u16,
        glyph: style::StyledContent<char>,
    ) -> io::Result<()> {
        let row = row_offset + (height - y.min(height));
        let col = ORIGIN_COL.saturating_add(x);
        self.move_to(row, col)?
            .queue(style::PrintStyledContent(glyph))
            .map(drop)
    }

    /// draws one 4x3 core box with its top-left corner at `(row, col)`.
    pub fn draw_core(&mut self, row: u16, col: u16) -> io::Result<()> {
        const TOP: &str = "+--+";
        const SIDE: &str = "|  |";

        self.text(row, col, TOP)?;
        self.text(row + 1, col, SIDE)?;
        self.text(row + 2, col, TOP)
    }

    fn move_to(&mut self, row: u16, col: u16) -> io::Result<&mut Vec<u8>> {
        let (x, y) = (col.saturating_sub(1), row.saturating_sub(1));
        self.frame.queue(cursor::MoveTo(x, y))
    }

    /// returns a reference to the underlying output.
    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.out
    }
}
