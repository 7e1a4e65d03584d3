//! Re-render streamed markdown in place in the terminal.
//!
//! [IncrementalMarkdownPrinter] keeps everything pushed so far and redraws it from a cursor anchor, so a streamed
//! reply reads like the text is being typed out.

use std::io::{self, stdout, Write};
use termimad::crossterm::{cursor, ExecutableCommand};
use termimad::crossterm::terminal::Clear;
use termimad::crossterm::terminal::ClearType::FromCursorDown;
use termimad::{FmtLine, FmtText, MadSkin};

struct RenderedMarkdown {
    text: String,
    line_width: Vec<usize>,
}

impl From<FmtText<'_, '_>> for RenderedMarkdown {
    fn from(fmt_text: FmtText<'_, '_>) -> Self {
        let text = format!("{}", fmt_text);
        let line_width = fmt_text.lines.iter().map(FmtLine::visible_length).collect();
        Self {
            text,
            line_width,
        }
    }
}

fn clamp_to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn not_activated() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "markdown printer is not activated")
}

#[derive(Default)]
pub struct AnchoredMarkdownPrinter {
    pub skin: MadSkin,
    pub wrap_width: Option<usize>,
    cursor_anchor: Option<(u16, u16)>,
    hide_cursor: bool,
}

impl AnchoredMarkdownPrinter {
    pub fn activated(&self) -> bool {
        self.cursor_anchor.is_some()
    }

    /// Anchor at the current cursor position. Does nothing if already activated.
    pub fn activate(&mut self, hide_cursor: bool) -> io::Result<()> {
        if self.activated() {
            return Ok(());
        }
        self.cursor_anchor = Some(cursor::position()?);
        if hide_cursor {
            stdout().execute(cursor::Hide)?;
        }
        self.hide_cursor = hide_cursor;
        Ok(())
    }

    pub fn deactivate(&mut self) -> io::Result<()> {
        if self.cursor_anchor.take().is_some() && self.hide_cursor {
            stdout().execute(cursor::Show)?;
        }
        Ok(())
    }

    fn print_rendered(&mut self, rendered_markdown: &RenderedMarkdown) -> io::Result<()> {
        let (column, row) = self.cursor_anchor.ok_or_else(not_activated)?;
        // restore cursor position to anchor and clear previous output
        stdout()
            .execute(cursor::MoveTo(column, row))?
            .execute(Clear(FromCursorDown))?;
        let rows = clamp_to_u16(rendered_markdown.line_width.len());
        let columns = clamp_to_u16(rendered_markdown.line_width.last().copied().unwrap_or(0));
        print!("{}", rendered_markdown.text);
        stdout().flush()?;
        // the cursor position is relative to the terminal not the screen/history, so the anchor drifts when the output scrolls
        let (column, row) = cursor::position()?;
        self.cursor_anchor = Some((column.saturating_sub(columns), row.saturating_sub(rows)));
        Ok(())
    }
}

impl Drop for AnchoredMarkdownPrinter {
    fn drop(&mut self) {
        let _ = self.deactivate();
    }
}

/// Accumulates markdown chunks and redraws the whole buffer on every print.
#[derive(Default)]
pub struct IncrementalMarkdownPrinter {
    pub anchored_printer: AnchoredMarkdownPrinter,
    markdown_string_buffer: String,
    buffer_changed: bool,
    rendered_string_cache: Option<RenderedMarkdown>,
}

impl IncrementalMarkdownPrinter {
    pub fn activate(&mut self, hide_cursor: bool) -> io::Result<()> {
        self.anchored_printer.activate(hide_cursor)
    }

    pub fn activated(&self) -> bool {
        self.anchored_printer.activated()
    }

    pub fn deactivate(&mut self) -> io::Result<()> {
        self.anchored_printer.deactivate()
    }

    /// Everything pushed so far.
    pub fn buffer(&self) -> &str {
        &self.markdown_string_buffer
    }

    pub fn push_str(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.markdown_string_buffer.push_str(chunk);
        self.buffer_changed = true
    }

    pub fn push_and_print(&mut self, chunk: &str) -> io::Result<()> {
        self.push_str(chunk);
        self.print()
    }

    pub fn print(&mut self) -> io::Result<()> {
        if !self.activated() {
            return Err(not_activated());
        }
        if self.buffer_changed {
            let rendered = FmtText::from(&self.anchored_printer.skin, &self.markdown_string_buffer, self.anchored_printer.wrap_width).into();
            self.rendered_string_cache = Some(rendered);
            self.buffer_changed = false;
        }
        match &self.rendered_string_cache {
            Some(rendered) => self.anchored_printer.print_rendered(rendered),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test_printing {
    use super::{clamp_to_u16, IncrementalMarkdownPrinter};

    #[test]
    fn test_clamp_to_u16() {
        assert_eq!(80, clamp_to_u16(80));
        assert_eq!(u16::MAX, clamp_to_u16(70_000));
    }

    #[test]
    fn test_buffer_accumulates_without_terminal() {
        let mut printer = IncrementalMarkdownPrinter::default();
        printer.push_str("# Sports");
        printer.push_str("");
        printer.push_str("\n* Cricket");
        assert_eq!("# Sports\n* Cricket", printer.buffer());
        assert!(!printer.activated());
        assert!(printer.print().is_err());
    }
}
