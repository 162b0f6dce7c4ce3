//! Editable-surface highlighting
//!
//! Keeps a decoration set for a mutable text buffer. The set is rebuilt
//! from the whole document whenever the text or the visible range
//! changes; renderers then consume only the decorations in view.

use std::ops::Range;

use tracing::debug;

use crate::highlight::{KeywordRule, RuleSet, StyleDescriptor, TextSnapshot};

/// A styled range in buffer coordinates (char offsets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub style: StyleDescriptor,
}

impl Decoration {
    /// Check if this decoration intersects a range
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        self.from < range.end && range.start < self.to
    }
}

/// Decorations computed from one snapshot of the buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    /// Ascending, non-overlapping decorations
    decorations: Vec<Decoration>,
    /// Computation that produced this set (0 = never computed)
    generation: u64,
}

impl DecorationSet {
    /// All decorations
    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    /// Decorations intersecting a range
    pub fn in_range(&self, range: Range<usize>) -> impl Iterator<Item = &Decoration> {
        // Sorted and non-overlapping, so ends ascend as well
        let first = self.decorations.partition_point(|d| d.to <= range.start);
        self.decorations[first..]
            .iter()
            .take_while(move |d| d.from < range.end)
    }

    /// Number of decorations
    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    /// Generation of the computation that produced this set
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The visible portion of a buffer, in char offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub from: usize,
    pub to: usize,
}

impl Viewport {
    /// Create a viewport over a char range
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to: to.max(from) }
    }

    /// Viewport covering `height` lines starting at `top_line`
    pub fn from_lines(snapshot: &TextSnapshot, top_line: usize, height: usize) -> Self {
        let starts = snapshot.line_starts();
        let len = snapshot.len_chars();
        let from = starts.get(top_line).copied().unwrap_or(len);
        let to = starts
            .get(top_line.saturating_add(height))
            .copied()
            .unwrap_or(len);
        Self::new(from, to)
    }

    /// Viewport covering the whole snapshot
    pub fn whole(snapshot: &TextSnapshot) -> Self {
        Self::new(0, snapshot.len_chars())
    }

    /// As a range
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }
}

/// What changed since the last paint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewUpdate {
    pub doc_changed: bool,
    pub viewport_changed: bool,
}

impl ViewUpdate {
    /// The document text changed
    pub fn doc() -> Self {
        Self {
            doc_changed: true,
            ..Default::default()
        }
    }

    /// The visible range changed
    pub fn viewport() -> Self {
        Self {
            viewport_changed: true,
            ..Default::default()
        }
    }

    /// Whether decorations must be rebuilt
    pub fn needs_rebuild(&self) -> bool {
        self.doc_changed || self.viewport_changed
    }
}

/// Decoration state for one editable buffer
#[derive(Debug, Default)]
pub struct EditorHighlighter {
    /// Current decorations
    decorations: DecorationSet,
    /// Last generation handed out by `build`
    issued: u64,
    /// Rule list `compiled` was built from
    rules: Vec<KeywordRule>,
    compiled: RuleSet,
}

impl EditorHighlighter {
    /// Create a highlighter with decorations for the initial text
    pub fn new(text: &str, rules: &[KeywordRule]) -> Self {
        let mut highlighter = Self::default();
        let set = highlighter.build(text, rules);
        highlighter.accept(set);
        highlighter
    }

    /// Current decorations
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// Handle a view update, rebuilding if the text or viewport changed
    ///
    /// Returns true if the decorations were replaced.
    pub fn update(&mut self, update: &ViewUpdate, text: &str, rules: &[KeywordRule]) -> bool {
        if !update.needs_rebuild() {
            return false;
        }
        let set = self.build(text, rules);
        self.accept(set)
    }

    /// Compute a fresh decoration set for the whole document
    ///
    /// The result carries a new generation; hand it to `accept` to make
    /// it current.
    pub fn build(&mut self, text: &str, rules: &[KeywordRule]) -> DecorationSet {
        self.issued += 1;
        if self.rules != rules {
            self.compiled = RuleSet::compile(rules);
            self.rules = rules.to_vec();
        }

        let snapshot = TextSnapshot::new(text);
        let decorations: Vec<Decoration> = self
            .compiled
            .resolve(&snapshot)
            .into_iter()
            .map(|ann| Decoration {
                from: ann.start,
                to: ann.end,
                style: ann.style,
            })
            .collect();

        debug!(
            "Built {} decorations (generation {})",
            decorations.len(),
            self.issued
        );

        DecorationSet {
            decorations,
            generation: self.issued,
        }
    }

    /// Replace the current set unless `set` is older than it
    ///
    /// Returns true if `set` became current.
    pub fn accept(&mut self, set: DecorationSet) -> bool {
        if set.generation < self.decorations.generation {
            debug!(
                "Discarding stale decorations (generation {} < {})",
                set.generation, self.decorations.generation
            );
            return false;
        }
        self.decorations = set;
        true
    }

    /// Decorations intersecting the viewport
    pub fn visible(&self, viewport: Viewport) -> impl Iterator<Item = &Decoration> {
        self.decorations.in_range(viewport.range())
    }
}
