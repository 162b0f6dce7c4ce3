//! Terminal output using crossterm

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal,
};

use crate::error::Result;

/// Fallback size when output is not a terminal
const DEFAULT_COLS: u16 = 80;
const DEFAULT_ROWS: u16 = 24;

/// Text attributes for one painted run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl TermStyle {
    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Styled line output over any writer
pub struct Terminal<W: Write> {
    out: W,
    /// Terminal width in columns
    cols: u16,
    /// Terminal height in rows
    rows: u16,
}

impl Terminal<io::Stdout> {
    /// Terminal over stdout, sized from the real terminal when there is one
    pub fn stdout() -> Self {
        let (cols, rows) = terminal::size().unwrap_or((DEFAULT_COLS, DEFAULT_ROWS));
        Self::with_size(io::stdout(), cols, rows)
    }
}

impl<W: Write> Terminal<W> {
    /// Terminal over a writer with a fixed size
    pub fn with_size(out: W, cols: u16, rows: u16) -> Self {
        Self { out, cols, rows }
    }

    /// Get terminal width
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Get terminal height
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Write a string with the current attributes
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        queue!(self.out, Print(s))?;
        Ok(())
    }

    /// Write a string in a style, resetting afterwards
    pub fn write_styled(&mut self, s: &str, style: &TermStyle) -> Result<()> {
        if style.is_default() {
            return self.write_str(s);
        }
        self.apply_style(style)?;
        self.write_str(s)?;
        self.reset_attributes()
    }

    /// Apply a style to subsequent output
    pub fn apply_style(&mut self, style: &TermStyle) -> Result<()> {
        if let Some(fg) = style.fg {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.italic {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        if style.underline {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        if style.strikethrough {
            queue!(self.out, SetAttribute(Attribute::CrossedOut))?;
        }
        Ok(())
    }

    /// Set dim/faint mode (for line numbers)
    pub fn set_dim(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        } else {
            queue!(self.out, SetAttribute(Attribute::NormalIntensity))?;
        }
        Ok(())
    }

    /// Reset all attributes
    pub fn reset_attributes(&mut self) -> Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    /// End the current line
    pub fn newline(&mut self) -> Result<()> {
        queue!(self.out, Print("\n"))?;
        Ok(())
    }

    /// Flush output buffer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Consume the terminal, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_has_no_escapes() {
        let mut term = Terminal::with_size(Vec::new(), 80, 24);
        term.write_styled("plain", &TermStyle::default()).unwrap();
        term.newline().unwrap();
        assert_eq!(term.into_inner(), b"plain\n");
    }

    #[test]
    fn test_styled_output_resets() {
        let mut term = Terminal::with_size(Vec::new(), 80, 24);
        let style = TermStyle {
            bold: true,
            bg: Some(Color::Rgb { r: 1, g: 2, b: 3 }),
            ..Default::default()
        };
        term.write_styled("hi", &style).unwrap();
        let out = String::from_utf8(term.into_inner()).unwrap();
        assert!(out.contains("48;2;1;2;3"));
        assert!(out.contains("hi"));
        assert!(out.ends_with("\u{1b}[0m"));
    }
}
