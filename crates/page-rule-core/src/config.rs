//! Mode configuration.
//!
//! Loading from disk is up to the host; the struct is plain serde data with defaults for
//! every field.

use serde::{Deserialize, Serialize};

use crate::overrides::RuleStyle;
use crate::scanner::FORM_FEED_PATTERN;

/// Default rule glyph (BOX DRAWINGS LIGHT HORIZONTAL).
pub const DEFAULT_RULE_CHAR: char = '─';

/// Options for the page rule mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRuleConfig {
    /// Delimiter regex (multi-line mode).
    pub delimiter: String,
    /// Glyph repeated to draw the rule.
    pub rule_char: char,
    /// Upper bound for the rule width in cells (`None`: full viewport width).
    pub max_width: Option<usize>,
    /// Forces a rule style instead of choosing one from the surface capability.
    pub rule_style: Option<RuleStyle>,
    /// Nudge the cursor off rule spans on interactive navigation.
    pub avoid_cursor: bool,
    /// Language ids for which the workspace enables the mode on open.
    pub enabled_languages: Vec<String>,
}

impl Default for PageRuleConfig {
    fn default() -> Self {
        Self {
            delimiter: FORM_FEED_PATTERN.to_string(),
            rule_char: DEFAULT_RULE_CHAR,
            max_width: None,
            rule_style: None,
            avoid_cursor: false,
            enabled_languages: Vec::new(),
        }
    }
}

impl PageRuleConfig {
    /// Returns `true` if the workspace should enable the mode for `language_id`.
    pub fn enables_language(&self, language_id: &str) -> bool {
        self.enabled_languages.iter().any(|id| id == language_id)
    }
}
