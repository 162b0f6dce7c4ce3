//! Keyword rules
//!
//! A rule pairs a pattern (literal word or regex) with the style applied
//! to its matches. Rules are owned by the settings layer; the matching
//! engine only ever reads a borrowed slice of them.

use serde::{Deserialize, Serialize};

/// Font modifiers a rule can apply to its matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontModifier {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl FontModifier {
    /// All modifiers, in the order their classes are emitted
    pub const ALL: [FontModifier; 7] = [
        FontModifier::Bold,
        FontModifier::Italic,
        FontModifier::Underline,
        FontModifier::Strikethrough,
        FontModifier::Uppercase,
        FontModifier::Lowercase,
        FontModifier::Capitalize,
    ];

    /// Lowercase name, as used in settings files and class names
    pub fn name(&self) -> &'static str {
        match self {
            FontModifier::Bold => "bold",
            FontModifier::Italic => "italic",
            FontModifier::Underline => "underline",
            FontModifier::Strikethrough => "strikethrough",
            FontModifier::Uppercase => "uppercase",
            FontModifier::Lowercase => "lowercase",
            FontModifier::Capitalize => "capitalize",
        }
    }

    /// Parse a modifier from its name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// A user-defined keyword rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRule {
    /// Literal word or regex source
    #[serde(rename = "keyword")]
    pub pattern: String,
    /// Foreground color (e.g. "#000000")
    pub color: String,
    /// Background color (e.g. "#A9CCE3")
    pub background_color: String,
    /// Font modifiers, treated as a set
    #[serde(default)]
    pub font_modifiers: Vec<FontModifier>,
    /// Rules persisted before this flag existed show their color
    #[serde(default = "default_true")]
    pub show_color: bool,
    #[serde(default = "default_true")]
    pub show_background_color: bool,
    /// Treat `pattern` as a regular expression
    #[serde(default)]
    pub is_regex: bool,
}

fn default_true() -> bool {
    true
}

impl KeywordRule {
    /// Default foreground for new rules
    pub const DEFAULT_COLOR: &'static str = "#000000";
    /// Default background for new rules
    pub const DEFAULT_BACKGROUND: &'static str = "#FFE08A";

    /// Create a literal rule with default colors
    pub fn literal(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            color: Self::DEFAULT_COLOR.to_string(),
            background_color: Self::DEFAULT_BACKGROUND.to_string(),
            font_modifiers: Vec::new(),
            show_color: true,
            show_background_color: true,
            is_regex: false,
        }
    }

    /// Create a regex rule with default colors
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            is_regex: true,
            ..Self::literal(pattern)
        }
    }

    /// Builder: set foreground and background colors
    pub fn with_colors(mut self, color: &str, background: &str) -> Self {
        self.color = color.to_string();
        self.background_color = background.to_string();
        self
    }

    /// Builder: add a font modifier
    pub fn with_modifier(mut self, modifier: FontModifier) -> Self {
        if !self.font_modifiers.contains(&modifier) {
            self.font_modifiers.push(modifier);
        }
        self
    }

    /// Builder: set color visibility flags
    pub fn with_visibility(mut self, show_color: bool, show_background_color: bool) -> Self {
        self.show_color = show_color;
        self.show_background_color = show_background_color;
        self
    }

    /// A rule takes part in matching only with a non-blank pattern
    pub fn is_active(&self) -> bool {
        !self.pattern.trim().is_empty()
    }

    /// Check whether a font modifier is set
    pub fn has_modifier(&self, modifier: FontModifier) -> bool {
        self.font_modifiers.contains(&modifier)
    }
}
