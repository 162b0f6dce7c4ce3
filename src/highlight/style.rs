//! Renderer-agnostic style descriptors
//!
//! A rule's colors, visibility flags and font modifiers map to a list of
//! class names plus two optional color variables. Both surfaces paint
//! from this descriptor alone.

use super::rule::{FontModifier, KeywordRule};

/// Class carried by every highlight
pub const BASE_CLASS: &str = "kh-highlighted";
/// Name of the foreground color variable
pub const COLOR_VAR: &str = "--kh-c";
/// Name of the background color variable
pub const BACKGROUND_VAR: &str = "--kh-bgc";

/// Style of one annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StyleDescriptor {
    /// Class names, base class first
    pub class_names: Vec<String>,
    /// Value for `--kh-c`; absent means no foreground override
    pub color_var: Option<String>,
    /// Value for `--kh-bgc`; absent means no background override
    pub background_var: Option<String>,
}

impl StyleDescriptor {
    /// Check whether a class is present
    pub fn has_class(&self, class: &str) -> bool {
        self.class_names.iter().any(|c| c == class)
    }

    /// Font modifiers encoded in the class list
    pub fn modifiers(&self) -> impl Iterator<Item = FontModifier> + '_ {
        FontModifier::ALL
            .into_iter()
            .filter(|m| self.has_class(&modifier_class(*m)))
    }

    /// Space separated class attribute value
    pub fn class_attr(&self) -> String {
        self.class_names.join(" ")
    }

    /// Style properties as (variable, value) pairs, foreground first
    pub fn variables(&self) -> Vec<(&'static str, &str)> {
        let mut vars = Vec::with_capacity(2);
        if let Some(color) = &self.color_var {
            vars.push((COLOR_VAR, color.as_str()));
        }
        if let Some(background) = &self.background_var {
            vars.push((BACKGROUND_VAR, background.as_str()));
        }
        vars
    }
}

/// Class name for a font modifier
fn modifier_class(modifier: FontModifier) -> String {
    format!("kh-{}", modifier.name())
}

/// Build the style descriptor for a rule
pub fn resolve_style(rule: &KeywordRule) -> StyleDescriptor {
    let mut class_names = vec![BASE_CLASS.to_string()];
    class_names.extend(
        FontModifier::ALL
            .into_iter()
            .filter(|m| rule.has_modifier(*m))
            .map(modifier_class),
    );

    StyleDescriptor {
        class_names,
        color_var: rule.show_color.then(|| rule.color.clone()),
        background_var: rule
            .show_background_color
            .then(|| rule.background_color.clone()),
    }
}
