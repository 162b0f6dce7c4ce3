//! Keyword matching and segmentation
//!
//! This module turns a text snapshot and an ordered list of keyword
//! rules into styled, non-overlapping annotations:
//! - Per-rule matching (literal words or word-bounded regex)
//! - Merging and priority resolution across the rule list
//! - Style descriptors consumed by the surface adapters

mod snapshot;
mod rule;
mod style;
mod matcher;
mod resolver;

pub use snapshot::TextSnapshot;
pub use rule::{FontModifier, KeywordRule};
pub use style::{resolve_style, StyleDescriptor, BACKGROUND_VAR, BASE_CLASS, COLOR_VAR};
pub use matcher::{match_rule, split_words, MatchSpan, Matcher};
pub use resolver::{resolve, segments, Annotation, RuleSet, Segment};
