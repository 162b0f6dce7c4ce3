//! Per-rule pattern matching
//!
//! Literal rules match whole words case-insensitively. Regex rules are
//! wrapped as `\b(pattern)\b` and matched case-insensitively with Unicode
//! word boundaries; capture group 1 is the highlighted extent.

use regex::{Regex, RegexBuilder};

use super::rule::KeywordRule;
use super::snapshot::TextSnapshot;
use crate::error::{HighlightError, Result};

/// Characters that separate words for literal matching
const WORD_DELIMITERS: [char; 6] = [' ', ',', '.', ';', '\n', '\t'];

/// A match of one rule, in char offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan<'r> {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Rule that produced the match
    pub rule: &'r KeywordRule,
}

/// A compiled rule pattern
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Lowercased, trimmed literal word
    Literal(String),
    /// Word-bounded, case-insensitive regex
    Regex(Regex),
}

impl Matcher {
    /// Compile a rule's pattern
    pub fn compile(rule: &KeywordRule) -> Result<Self> {
        if !rule.is_regex {
            return Ok(Matcher::Literal(rule.pattern.trim().to_lowercase()));
        }

        RegexBuilder::new(&format!(r"\b({})\b", rule.pattern))
            .case_insensitive(true)
            .unicode(true)
            .build()
            .map(Matcher::Regex)
            .map_err(|source| HighlightError::Pattern {
                pattern: rule.pattern.clone(),
                source,
            })
    }

    /// Find all match ranges (char offsets), ascending and non-overlapping
    pub fn find_ranges(&self, snapshot: &TextSnapshot) -> Vec<(usize, usize)> {
        match self {
            Matcher::Literal(word) => split_words(snapshot.as_str())
                .into_iter()
                .filter(|(_, _, token)| token.to_lowercase() == *word)
                .map(|(start, end, _)| (start, end))
                .collect(),
            Matcher::Regex(regex) => regex
                .captures_iter(snapshot.as_str())
                .filter_map(|caps| caps.get(1))
                // Empty matches would highlight nothing
                .filter(|m| m.start() < m.end())
                .map(|m| (snapshot.char_offset(m.start()), snapshot.char_offset(m.end())))
                .collect(),
        }
    }
}

/// Match a single rule against a snapshot
pub fn match_rule<'r>(snapshot: &TextSnapshot, rule: &'r KeywordRule) -> Result<Vec<MatchSpan<'r>>> {
    let matcher = Matcher::compile(rule)?;
    Ok(matcher
        .find_ranges(snapshot)
        .into_iter()
        .map(|(start, end)| MatchSpan { start, end, rule })
        .collect())
}

/// Split text into words on the fixed delimiter set
///
/// Returns `(start, end, word)` with char offsets into `text`. Words are
/// trimmed of surrounding whitespace; blank words are dropped.
pub fn split_words(text: &str) -> Vec<(usize, usize, &str)> {
    let mut words = Vec::new();
    let mut word_start: Option<(usize, usize)> = None;
    let mut char_idx = 0;

    for (byte_idx, ch) in text.char_indices() {
        if WORD_DELIMITERS.contains(&ch) {
            if let Some((start_char, start_byte)) = word_start.take() {
                push_trimmed(&mut words, text, start_char, start_byte, byte_idx);
            }
        } else if word_start.is_none() {
            word_start = Some((char_idx, byte_idx));
        }
        char_idx += 1;
    }

    if let Some((start_char, start_byte)) = word_start {
        push_trimmed(&mut words, text, start_char, start_byte, text.len());
    }

    words
}

fn push_trimmed<'t>(
    words: &mut Vec<(usize, usize, &'t str)>,
    text: &'t str,
    start_char: usize,
    start_byte: usize,
    end_byte: usize,
) {
    let raw = &text[start_byte..end_byte];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    let start = start_char + raw[..lead].chars().count();
    let end = start + trimmed.chars().count();
    words.push((start, end, trimmed));
}
