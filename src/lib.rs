//! keyword-highlighter - highlight user-defined keywords in text
//!
//! Given a document's text and an ordered list of keyword rules (literal
//! words or regex patterns, each with a style), the engine produces an
//! ordered, non-overlapping list of styled annotations. Two adapters
//! consume them: one keeps decorations for an editable buffer, the other
//! rewrites a rendered element tree in place.

pub mod config;
pub mod display;
pub mod editable;
pub mod error;
pub mod highlight;
pub mod rendered;
pub mod terminal;

pub use config::Config;
pub use editable::{Decoration, DecorationSet, EditorHighlighter, ViewUpdate, Viewport};
pub use error::{HighlightError, Result};
pub use highlight::{resolve, Annotation, KeywordRule, RuleSet, StyleDescriptor, TextSnapshot};
pub use rendered::{highlight_tree, Element, Node};
