//! Keyword rule settings
//!
//! Loads the rule list from ~/.keyword-highlighter.toml (or
//! %USERPROFILE%\.keyword-highlighter.toml on Windows), or from an explicit
//! TOML or JSON file. JSON uses the same layout as the settings export.
//!
//! Example:
//! ```toml
//! [[keywords]]
//! keyword = "TODO\\.*"
//! color = "#000000"
//! backgroundColor = "#A9CCE3"
//! isRegex = true
//!
//! [[keywords]]
//! keyword = "FIXME"
//! color = "#000000"
//! backgroundColor = "#BAA2E8"
//! fontModifiers = ["bold"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{HighlightError, Result};
use crate::highlight::KeywordRule;

/// Name of the settings file in the home directory
const CONFIG_FILE: &str = ".keyword-highlighter.toml";

/// Highlighter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Keyword rules in priority order
    #[serde(default = "default_keywords")]
    pub keywords: Vec<KeywordRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

/// Rules shipped out of the box
pub fn default_keywords() -> Vec<KeywordRule> {
    vec![
        KeywordRule::regex(r"TODO\.*").with_colors("#000000", "#A9CCE3"),
        KeywordRule::regex(r"туду\.*").with_colors("#000000", "#8DE3C2"),
        KeywordRule::literal("FIXME").with_colors("#000000", "#BAA2E8"),
    ]
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(CONFIG_FILE))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(CONFIG_FILE))
        }
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load settings from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load settings from a TOML file, or a JSON rule export (`.json`)
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config = if is_json {
            Self {
                keywords: import_json(&contents)?,
            }
        } else {
            Self::parse(&contents)?
        };
        config.prune_empty();
        Ok(config)
    }

    /// Parse TOML settings
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Drop rules whose pattern is empty or whitespace only
    pub fn prune_empty(&mut self) {
        let before = self.keywords.len();
        self.keywords.retain(KeywordRule::is_active);
        if self.keywords.len() != before {
            debug!("Pruned {} empty keyword rules", before - self.keywords.len());
        }
    }

    /// Append a new literal rule, seeded from an editor selection
    ///
    /// Returns the index of the new rule.
    pub fn add_keyword(&mut self, selection: Option<&str>) -> usize {
        let pattern = selection.map(keyword_from_selection).unwrap_or_default();
        self.keywords.push(KeywordRule::literal(pattern));
        self.keywords.len() - 1
    }

    /// Remove the rule at `index`, if present
    pub fn remove_keyword(&mut self, index: usize) -> Option<KeywordRule> {
        (index < self.keywords.len()).then(|| self.keywords.remove(index))
    }
}

/// Turn selected text into a keyword pattern
///
/// Surrounding whitespace and one trailing colon are dropped, so
/// selecting "TODO:" yields "TODO".
pub fn keyword_from_selection(selection: &str) -> String {
    let trimmed = selection.trim();
    trimmed.strip_suffix(':').unwrap_or(trimmed).to_string()
}

/// Parse a JSON rule export
///
/// The data must be an array; each entry needs string `keyword`,
/// `color` and `backgroundColor` fields.
pub fn import_json(data: &str) -> Result<Vec<KeywordRule>> {
    let value: serde_json::Value = serde_json::from_str(data.trim())?;
    let serde_json::Value::Array(items) = value else {
        return Err(HighlightError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| HighlightError::InvalidRule {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Serialize rules as pretty-printed JSON
pub fn export_json(rules: &[KeywordRule]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rules)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::FontModifier;

    #[test]
    fn test_parse_config() {
        let contents = r##"
# Comment
[[keywords]]
keyword = "TODO\\.*"
color = "#000000"
backgroundColor = "#A9CCE3"
isRegex = true

[[keywords]]
keyword = "FIXME"
color = "#111111"
backgroundColor = "#BAA2E8"
fontModifiers = ["bold", "underline"]
showColor = false
        "##;

        let config = Config::parse(contents).unwrap();
        assert_eq!(config.keywords.len(), 2);
        assert_eq!(config.keywords[0].pattern, r"TODO\.*");
        assert!(config.keywords[0].is_regex);
        assert!(config.keywords[0].show_color);
        assert_eq!(
            config.keywords[1].font_modifiers,
            vec![FontModifier::Bold, FontModifier::Underline]
        );
        assert!(!config.keywords[1].show_color);
        assert!(config.keywords[1].show_background_color);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.keywords.len(), 3);
    }

    #[test]
    fn test_parse_invalid() {
        let err = Config::parse("[[keywords]]\nkeyword = 3").unwrap_err();
        assert!(matches!(err, HighlightError::Toml(_)));
    }

    #[test]
    fn test_prune_empty() {
        let mut config = Config {
            keywords: vec![
                KeywordRule::literal("a"),
                KeywordRule::literal(""),
                KeywordRule::literal("   "),
                KeywordRule::regex("b"),
            ],
        };
        config.prune_empty();
        let patterns: Vec<_> = config.keywords.iter().map(|k| k.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["a", "b"]);
    }

    #[test]
    fn test_keyword_from_selection() {
        assert_eq!(keyword_from_selection("  TODO: "), "TODO");
        assert_eq!(keyword_from_selection("NOTE"), "NOTE");
        assert_eq!(keyword_from_selection("a::"), "a:");
        assert_eq!(keyword_from_selection(""), "");
    }

    #[test]
    fn test_add_and_remove_keyword() {
        let mut config = Config { keywords: Vec::new() };
        assert_eq!(config.add_keyword(Some("HACK:")), 0);
        assert_eq!(config.add_keyword(None), 1);
        assert_eq!(config.keywords[0].pattern, "HACK");
        assert!(!config.keywords[0].is_regex);
        assert_eq!(config.keywords[1].pattern, "");

        assert_eq!(config.remove_keyword(5), None);
        assert_eq!(config.remove_keyword(0).map(|k| k.pattern), Some("HACK".to_string()));
        assert_eq!(config.keywords.len(), 1);
    }

    #[test]
    fn test_import_export() {
        let exported = export_json(&default_keywords()).unwrap();
        assert!(exported.contains("\"backgroundColor\": \"#A9CCE3\""));
        assert_eq!(import_json(&exported).unwrap(), default_keywords());
    }

    #[test]
    fn test_import_rejects_bad_data() {
        assert!(matches!(import_json("{}"), Err(HighlightError::NotAnArray)));
        assert!(matches!(import_json("not json"), Err(HighlightError::Json(_))));

        let data = r##"[
            {"keyword": "ok", "color": "#000", "backgroundColor": "#fff"},
            {"keyword": "bad", "color": 7, "backgroundColor": "#fff"}
        ]"##;
        match import_json(data) {
            Err(HighlightError::InvalidRule { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
