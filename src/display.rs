//! Terminal painting of the editable surface
//!
//! Paints the lines inside a viewport, splitting each line at the
//! visible decorations and clipping it to the terminal width.

use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

use crate::editable::{EditorHighlighter, Viewport};
use crate::error::Result;
use crate::highlight::{FontModifier, StyleDescriptor, TextSnapshot};
use crate::terminal::{TermStyle, Terminal};

/// Display options
#[derive(Debug, Clone, Default)]
pub struct Display {
    /// Whether to show line numbers
    pub show_line_numbers: bool,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate width needed for line numbers (including separator)
    fn line_number_width(&self, line_count: usize) -> usize {
        if !self.show_line_numbers {
            return 0;
        }
        let digits = line_count.max(1).to_string().len();
        digits.max(3) + 1 // minimum 3 digits + space
    }

    /// Paint the lines of `text` inside `viewport`
    pub fn render<W: std::io::Write>(
        &self,
        terminal: &mut Terminal<W>,
        text: &str,
        highlighter: &EditorHighlighter,
        viewport: Viewport,
    ) -> Result<()> {
        let snapshot = TextSnapshot::new(text);
        let line_starts = snapshot.line_starts();
        let lnum_width = self.line_number_width(line_starts.len());
        let text_cols = (terminal.cols() as usize).saturating_sub(lnum_width);

        for (line_idx, &line_start) in line_starts.iter().enumerate() {
            let line_end = line_starts
                .get(line_idx + 1)
                .map(|next| next - 1)
                .unwrap_or(snapshot.len_chars());
            if line_end < viewport.from || line_start >= viewport.to.max(viewport.from + 1) {
                continue;
            }

            if self.show_line_numbers {
                let lnum_str = format!("{:>width$} ", line_idx + 1, width = lnum_width - 1);
                terminal.set_dim(true)?;
                terminal.write_str(&lnum_str)?;
                terminal.set_dim(false)?;
            }

            self.render_line(terminal, &snapshot, line_start, line_end, highlighter, text_cols)?;
            terminal.newline()?;
        }

        terminal.flush()
    }

    /// Paint one line, clipped to `max_cols`
    fn render_line<W: std::io::Write>(
        &self,
        terminal: &mut Terminal<W>,
        snapshot: &TextSnapshot,
        line_start: usize,
        line_end: usize,
        highlighter: &EditorHighlighter,
        max_cols: usize,
    ) -> Result<()> {
        let mut col = 0;
        let mut pos = line_start;

        let line = Viewport::new(line_start, line_end);
        for deco in highlighter.visible(line) {
            let from = deco.from.max(line_start);
            let to = deco.to.min(line_end);
            if from > pos {
                col = write_clipped(terminal, snapshot.slice(pos, from), &TermStyle::default(), col, max_cols)?;
            }
            let text = apply_case(snapshot.slice(from, to), &deco.style);
            col = write_clipped(terminal, &text, &term_style(&deco.style), col, max_cols)?;
            pos = to;
        }

        if pos < line_end {
            write_clipped(terminal, snapshot.slice(pos, line_end), &TermStyle::default(), col, max_cols)?;
        }
        Ok(())
    }
}

/// Write as much of `text` as fits; returns the new column
fn write_clipped<W: std::io::Write>(
    terminal: &mut Terminal<W>,
    text: &str,
    style: &TermStyle,
    col: usize,
    max_cols: usize,
) -> Result<usize> {
    let remaining = max_cols.saturating_sub(col);
    if remaining == 0 {
        return Ok(col);
    }
    let (fitted, width) = truncate_to_width(text, remaining);
    if !fitted.is_empty() {
        terminal.write_styled(&fitted, style)?;
    }
    Ok(col + width)
}

/// Truncate a string to fit within a display width, returning its width
fn truncate_to_width(s: &str, max_width: usize) -> (String, usize) {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = if ch == '\t' { 1 } else { ch.width().unwrap_or(1) };
        if width + ch_width > max_width {
            break;
        }
        result.push(if ch == '\t' { ' ' } else { ch });
        width += ch_width;
    }

    (result, width)
}

/// Terminal attributes for a style descriptor
pub fn term_style(style: &StyleDescriptor) -> TermStyle {
    let mut term = TermStyle {
        fg: style.color_var.as_deref().and_then(parse_hex_color),
        bg: style.background_var.as_deref().and_then(parse_hex_color),
        ..Default::default()
    };
    for modifier in style.modifiers() {
        match modifier {
            FontModifier::Bold => term.bold = true,
            FontModifier::Italic => term.italic = true,
            FontModifier::Underline => term.underline = true,
            FontModifier::Strikethrough => term.strikethrough = true,
            FontModifier::Uppercase | FontModifier::Lowercase | FontModifier::Capitalize => {}
        }
    }
    term
}

/// Apply case-transform modifiers to matched text
fn apply_case(text: &str, style: &StyleDescriptor) -> String {
    let mut out = text.to_string();
    for modifier in style.modifiers() {
        out = match modifier {
            FontModifier::Uppercase => out.to_uppercase(),
            FontModifier::Lowercase => out.to_lowercase(),
            FontModifier::Capitalize => capitalize_words(&out),
            _ => out,
        };
    }
    out
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    out
}

/// Parse "#rgb" or "#rrggbb" into a terminal color
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).ok();
    match hex.len() {
        3 => Some(Color::Rgb {
            r: channel(0, 1)? * 17,
            g: channel(1, 1)? * 17,
            b: channel(2, 1)? * 17,
        }),
        6 => Some(Color::Rgb {
            r: channel(0, 2)?,
            g: channel(2, 2)?,
            b: channel(4, 2)?,
        }),
        _ => None,
    }
}
