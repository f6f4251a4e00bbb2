//! Display override manager.
//!
//! Maps every delimiter occurrence to a "draw a full-width rule here" override on the host
//! surface and keeps the set in step with the text. Overrides are derived state: they are
//! recomputed from fresh scans around each edit rather than patched edit-by-edit, and they
//! know nothing about folding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use unicode_width::UnicodeWidthChar;

use crate::config::PageRuleConfig;
use crate::edit::TextEdit;
use crate::error::HostError;
use crate::host::{DisplaySurface, MarkerId, SurfaceCapability};
use crate::scanner::{DelimiterPattern, DelimiterSpan, occurrences};
use crate::text::Lines;

/// How the rule is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStyle {
    /// Glyphs with a strike-through line (graphical surfaces).
    StrikeThrough,
    /// Glyphs with an underline (terminals, where strike-through is unreliable).
    Underline,
}

impl RuleStyle {
    /// The style suited to a surface capability.
    pub fn for_capability(capability: SurfaceCapability) -> Self {
        match capability {
            SurfaceCapability::Graphical => Self::StrikeThrough,
            SurfaceCapability::TextOnly => Self::Underline,
        }
    }
}

/// Command a host should run when the user interacts with a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Toggle the section that starts at the rule (see `PageRuleMode::toggle_section_at`).
    ToggleSection,
}

/// Behaviour bundle attached to a rendered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionHandlers {
    /// Action bound to a pointer click.
    pub on_click: Option<RuleAction>,
    /// Action bound to the keyboard activation gesture.
    pub on_activate: Option<RuleAction>,
    /// Tooltip shown on hover.
    pub help_text: Option<String>,
}

impl Default for InteractionHandlers {
    fn default() -> Self {
        Self {
            on_click: Some(RuleAction::ToggleSection),
            on_activate: Some(RuleAction::ToggleSection),
            help_text: Some("click: fold or unfold this section".to_string()),
        }
    }
}

/// Whether the cursor may rest on a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    /// No restriction.
    #[default]
    Free,
    /// Interactive moves are nudged past the rule.
    Avoid,
}

/// Kind of cursor movement reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMotion {
    /// Direct user navigation (arrow keys, clicks).
    Interactive,
    /// Movement done by code (search, jumps, the mode's own computations).
    Programmatic,
}

/// Rendering instruction for one delimiter occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOverride {
    /// Strike-through or underline.
    pub style: RuleStyle,
    /// Text drawn in place of the delimiter.
    pub rule_text: String,
    /// Click/activation behaviour.
    pub handlers: InteractionHandlers,
    /// Cursor placement policy.
    pub cursor_policy: CursorPolicy,
}

#[derive(Debug, Clone)]
struct InstalledRule {
    span: DelimiterSpan,
    marker: MarkerId,
    display: DisplayOverride,
}

/// Owns the rule overrides of one buffer.
#[derive(Debug, Clone)]
pub struct OverrideManager {
    pattern: DelimiterPattern,
    rule_char: char,
    max_width: Option<usize>,
    style_override: Option<RuleStyle>,
    cursor_policy: CursorPolicy,
    enabled: bool,
    viewport_width: usize,
    /// Keyed by span start.
    installed: BTreeMap<usize, InstalledRule>,
}

impl OverrideManager {
    /// Create a disabled manager.
    pub fn new(pattern: DelimiterPattern, config: &PageRuleConfig) -> Self {
        Self {
            pattern,
            rule_char: config.rule_char,
            max_width: config.max_width,
            style_override: config.rule_style,
            cursor_policy: if config.avoid_cursor {
                CursorPolicy::Avoid
            } else {
                CursorPolicy::Free
            },
            enabled: false,
            viewport_width: 0,
            installed: BTreeMap::new(),
        }
    }

    /// Returns `true` between [`enable`](Self::enable) and [`disable`](Self::disable).
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Scan the whole buffer and install one override per occurrence.
    ///
    /// Idempotent. If the surface rejects an override, everything installed so far is
    /// removed again and the manager stays disabled.
    pub fn enable(&mut self, text: &str, surface: &mut dyn DisplaySurface) -> Result<(), HostError> {
        if self.enabled {
            return Ok(());
        }

        self.enabled = true;
        self.viewport_width = surface.viewport_width();
        if let Err(err) = self.install_all(text, surface) {
            self.disable(surface);
            return Err(err);
        }

        debug!(rules = self.installed.len(), "rule overrides enabled");
        Ok(())
    }

    /// Remove every override. The buffer displays its literal characters again.
    pub fn disable(&mut self, surface: &mut dyn DisplaySurface) {
        self.remove_all(surface);
        if self.enabled {
            debug!("rule overrides disabled");
        }
        self.enabled = false;
    }

    /// Resynchronize after a text change.
    ///
    /// `text` is the post-edit buffer. With `Some(edit)` only the lines around the edit are
    /// rescanned; with `None` the whole buffer is.
    pub fn on_edit(
        &mut self,
        text: &str,
        edit: Option<&TextEdit>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<(), HostError> {
        if !self.enabled {
            return Ok(());
        }

        let Some(edit) = edit else {
            self.remove_all(surface);
            return self.install_all(text, surface);
        };

        self.shift_for_edit(edit, surface);

        let lines = Lines::new(text);
        let line_region_start = {
            let start = lines.line_start(edit.start);
            lines.line_start(start.saturating_sub(1))
        };
        // Restart from the last rule before the region: a delimiter spanning several lines
        // may begin anywhere after it.
        let region_start = self
            .installed
            .range(..line_region_start)
            .next_back()
            .map_or(0, |(start, _)| *start);
        let mut region_end = {
            let end = lines.line_end(edit.inserted_end());
            lines
                .next_line_start(end)
                .map_or(end, |next| lines.line_end(next))
        };

        let mut fresh: Vec<DelimiterSpan> = Vec::new();
        for span in occurrences(text, &self.pattern, region_start) {
            if span.start > region_end {
                break;
            }
            // Rules starting under this match are superseded by it.
            region_end = region_end.max(span.end);
            fresh.push(span);
        }

        let stale: Vec<usize> = self
            .installed
            .range(region_start..=region_end)
            .filter(|(_, rule)| !fresh.contains(&rule.span))
            .map(|(start, _)| *start)
            .collect();
        for start in &stale {
            if let Some(rule) = self.installed.remove(start) {
                surface.remove_override(rule.marker);
            }
        }

        let mut added = 0usize;
        for span in fresh {
            if !self.installed.contains_key(&span.start) {
                self.install(span, surface)?;
                added += 1;
            }
        }

        trace!(
            region_start,
            region_end,
            removed = stale.len(),
            added,
            "rule overrides resynced"
        );
        Ok(())
    }

    /// Reinstall overrides whose rule text depends on a changed viewport width.
    pub fn refresh_layout(&mut self, surface: &mut dyn DisplaySurface) -> Result<(), HostError> {
        let width = surface.viewport_width();
        if !self.enabled || width == self.viewport_width {
            return Ok(());
        }
        self.viewport_width = width;

        let spans: Vec<DelimiterSpan> = self.installed.values().map(|rule| rule.span).collect();
        self.remove_all(surface);
        for span in spans {
            self.install(span, surface)?;
        }
        debug!(width, "rule overrides relaid out");
        Ok(())
    }

    /// Installed overrides in position order.
    pub fn overrides(&self) -> impl Iterator<Item = (DelimiterSpan, &DisplayOverride)> {
        self.installed.values().map(|rule| (rule.span, &rule.display))
    }

    /// Number of installed overrides.
    pub fn len(&self) -> usize {
        self.installed.len()
    }

    /// Returns `true` if no override is installed.
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    /// The rule span containing `pos`, if any.
    pub fn rule_at(&self, pos: usize) -> Option<DelimiterSpan> {
        self.installed
            .range(..=pos)
            .next_back()
            .map(|(_, rule)| rule.span)
            .filter(|span| span.contains(pos))
    }

    /// Final cursor position for a move from `previous` to `next`.
    ///
    /// With cursor avoidance on, an [`CursorMotion::Interactive`] move that lands on a rule
    /// continues past it in the direction of travel. Programmatic moves are returned
    /// unchanged, and a nudged position is never examined again.
    pub fn adjust_cursor(&self, previous: usize, next: usize, motion: CursorMotion) -> usize {
        if !self.enabled
            || self.cursor_policy == CursorPolicy::Free
            || motion == CursorMotion::Programmatic
        {
            return next;
        }

        let Some(span) = self.rule_at(next) else {
            return next;
        };

        if next < previous && span.start > 0 {
            span.start - 1
        } else {
            span.end
        }
    }

    /// The override drawn for every occurrence at the current geometry.
    pub fn display_for(&self, capability: SurfaceCapability) -> DisplayOverride {
        DisplayOverride {
            style: self
                .style_override
                .unwrap_or_else(|| RuleStyle::for_capability(capability)),
            rule_text: self.rule_text(),
            handlers: InteractionHandlers::default(),
            cursor_policy: self.cursor_policy,
        }
    }

    fn rule_text(&self) -> String {
        let cells = self
            .max_width
            .map_or(self.viewport_width, |max| max.min(self.viewport_width));
        let glyph_width = self.rule_char.width().unwrap_or(1).max(1);
        let count = (cells / glyph_width).max(1);
        std::iter::repeat_n(self.rule_char, count).collect()
    }

    fn install(
        &mut self,
        span: DelimiterSpan,
        surface: &mut dyn DisplaySurface,
    ) -> Result<(), HostError> {
        let display = self.display_for(surface.capability());
        let marker = surface.install_override(span.start..span.end, &display)?;
        self.installed.insert(
            span.start,
            InstalledRule {
                span,
                marker,
                display,
            },
        );
        Ok(())
    }

    fn install_all(&mut self, text: &str, surface: &mut dyn DisplaySurface) -> Result<(), HostError> {
        let spans: Vec<DelimiterSpan> = occurrences(text, &self.pattern, 0).collect();
        for span in spans {
            self.install(span, surface)?;
        }
        Ok(())
    }

    fn remove_all(&mut self, surface: &mut dyn DisplaySurface) {
        for rule in std::mem::take(&mut self.installed).into_values() {
            surface.remove_override(rule.marker);
        }
    }

    /// Drop overrides touched by `edit` and move the others into post-edit coordinates.
    fn shift_for_edit(&mut self, edit: &TextEdit, surface: &mut dyn DisplaySurface) {
        let mut shifted = BTreeMap::new();
        for rule in std::mem::take(&mut self.installed).into_values() {
            if edit.touches(rule.span.start, rule.span.end) {
                surface.remove_override(rule.marker);
                continue;
            }
            let span = DelimiterSpan::new(
                edit.map_position(rule.span.start),
                edit.map_position(rule.span.end),
            );
            shifted.insert(span.start, InstalledRule { span, ..rule });
        }
        self.installed = shifted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    const SAMPLE: &str = "head\n\x0C\n;; Section A\ncode1\n\x0C\n;; Section B\ncode2";

    fn manager(config: &PageRuleConfig) -> OverrideManager {
        OverrideManager::new(DelimiterPattern::form_feed(), config)
    }

    #[test]
    fn test_enable_installs_one_override_per_occurrence() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut overrides = manager(&PageRuleConfig::default());

        overrides.enable(SAMPLE, &mut surface).unwrap();
        overrides.enable(SAMPLE, &mut surface).unwrap();

        let spans: Vec<_> = overrides.overrides().map(|(span, _)| span).collect();
        assert_eq!(spans, vec![DelimiterSpan::new(5, 6), DelimiterSpan::new(26, 27)]);
        assert_eq!(surface.override_count(), 2);

        let (_, display) = overrides.overrides().next().unwrap();
        assert_eq!(display.style, RuleStyle::StrikeThrough);
        assert_eq!(display.rule_text, "─".repeat(10));
    }

    #[test]
    fn test_disable_leaves_no_residue() {
        let mut surface = MemorySurface::new(SurfaceCapability::TextOnly, 10);
        let mut overrides = manager(&PageRuleConfig::default());

        overrides.enable(SAMPLE, &mut surface).unwrap();
        overrides.disable(&mut surface);

        assert!(overrides.is_empty());
        assert!(!overrides.is_enabled());
        assert_eq!(surface.override_count(), 0);
    }

    #[test]
    fn test_style_follows_capability_unless_forced() {
        let text_only = manager(&PageRuleConfig::default());
        assert_eq!(
            text_only.display_for(SurfaceCapability::TextOnly).style,
            RuleStyle::Underline
        );

        let forced = manager(&PageRuleConfig {
            rule_style: Some(RuleStyle::Underline),
            ..PageRuleConfig::default()
        });
        assert_eq!(
            forced.display_for(SurfaceCapability::Graphical).style,
            RuleStyle::Underline
        );
    }

    #[test]
    fn test_rule_width_respects_max_width_and_wide_glyphs() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 80);
        let mut overrides = manager(&PageRuleConfig {
            rule_char: '＝',
            max_width: Some(21),
            ..PageRuleConfig::default()
        });
        overrides.enable("\x0C", &mut surface).unwrap();

        let (_, display) = overrides.overrides().next().unwrap();
        assert_eq!(display.rule_text.chars().count(), 10);
    }

    #[test]
    fn test_edit_adds_and_removes_overrides() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut overrides = manager(&PageRuleConfig::default());
        overrides.enable(SAMPLE, &mut surface).unwrap();

        // Type a new delimiter line at the very start.
        let text = format!("\x0C\n{SAMPLE}");
        let edit = TextEdit::insert(0, 2);
        surface.apply_edit(&edit);
        overrides.on_edit(&text, Some(&edit), &mut surface).unwrap();

        let spans: Vec<_> = overrides.overrides().map(|(span, _)| span).collect();
        assert_eq!(
            spans,
            vec![
                DelimiterSpan::new(0, 1),
                DelimiterSpan::new(7, 8),
                DelimiterSpan::new(28, 29)
            ]
        );

        // Delete the second delimiter character.
        let mut text = text;
        text.remove(7);
        let edit = TextEdit::delete(7..8);
        surface.apply_edit(&edit);
        overrides.on_edit(&text, Some(&edit), &mut surface).unwrap();

        let spans: Vec<_> = overrides.overrides().map(|(span, _)| span).collect();
        assert_eq!(spans, vec![DelimiterSpan::new(0, 1), DelimiterSpan::new(27, 28)]);
        assert_eq!(surface.override_count(), 2);
    }

    #[test]
    fn test_edit_without_range_rescans_everything() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut overrides = manager(&PageRuleConfig::default());
        overrides.enable(SAMPLE, &mut surface).unwrap();

        overrides.on_edit("\x0C\n\x0C\n\x0C", None, &mut surface).unwrap();
        assert_eq!(overrides.len(), 3);
        assert_eq!(surface.override_count(), 3);
    }

    #[test]
    fn test_refresh_layout_tracks_viewport_width() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut overrides = manager(&PageRuleConfig::default());
        overrides.enable(SAMPLE, &mut surface).unwrap();

        surface.set_viewport_width(4);
        overrides.refresh_layout(&mut surface).unwrap();

        assert!(overrides.overrides().all(|(_, d)| d.rule_text == "────"));
        assert_eq!(surface.override_count(), 2);
    }

    #[test]
    fn test_rejected_override_rolls_back() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        surface.set_override_limit(Some(1));
        let mut overrides = manager(&PageRuleConfig::default());

        let err = overrides.enable(SAMPLE, &mut surface).unwrap_err();
        assert!(matches!(err, HostError::OverrideUnavailable(_)));
        assert!(!overrides.is_enabled());
        assert_eq!(surface.override_count(), 0);
    }

    #[test]
    fn test_cursor_avoidance_only_for_interactive_moves() {
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut overrides = manager(&PageRuleConfig {
            avoid_cursor: true,
            ..PageRuleConfig::default()
        });
        overrides.enable(SAMPLE, &mut surface).unwrap();

        assert_eq!(overrides.adjust_cursor(4, 5, CursorMotion::Interactive), 6);
        assert_eq!(overrides.adjust_cursor(6, 5, CursorMotion::Interactive), 4);
        assert_eq!(overrides.adjust_cursor(4, 5, CursorMotion::Programmatic), 5);
        assert_eq!(overrides.adjust_cursor(0, 3, CursorMotion::Interactive), 3);

        let free = manager(&PageRuleConfig::default());
        assert_eq!(free.adjust_cursor(4, 5, CursorMotion::Interactive), 5);
    }
}
