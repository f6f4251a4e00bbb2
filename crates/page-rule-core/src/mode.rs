//! Per-buffer page rule mode.
//!
//! Each buffer owns one [`PageRuleMode`]; there is no global on/off switch, so buffers can
//! be enabled, folded and disabled independently. While enabled, the host must deliver
//! every text change to [`PageRuleMode::handle_edit`] synchronously and in order; once
//! disabled the mode ignores edits until it is enabled again.

use tracing::{debug, warn};

use crate::config::PageRuleConfig;
use crate::edit::TextEdit;
use crate::error::{HostError, PageRuleError};
use crate::folding::{FoldController, FoldRange, ToggleOutcome};
use crate::host::{BufferView, DisplaySurface};
use crate::overrides::{CursorMotion, OverrideManager};
use crate::scanner::DelimiterPattern;

#[derive(Debug)]
enum ModeState {
    Disabled,
    Enabled {
        overrides: OverrideManager,
        folds: FoldController,
    },
}

/// Rule rendering and section folding for one buffer.
#[derive(Debug)]
pub struct PageRuleMode {
    config: PageRuleConfig,
    state: ModeState,
}

impl PageRuleMode {
    /// Create a disabled mode.
    pub fn new(config: PageRuleConfig) -> Self {
        Self {
            config,
            state: ModeState::Disabled,
        }
    }

    /// The configuration the mode was created with.
    pub fn config(&self) -> &PageRuleConfig {
        &self.config
    }

    /// Returns `true` while the mode is on.
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, ModeState::Enabled { .. })
    }

    /// Turn the mode on: compile the delimiter and draw every rule.
    ///
    /// Idempotent. On failure nothing stays installed: an invalid pattern is reported before
    /// the surface is touched, and a surface failure rolls back the overrides installed so
    /// far.
    pub fn enable(
        &mut self,
        view: BufferView<'_>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<(), PageRuleError> {
        if self.is_enabled() {
            return Ok(());
        }

        let pattern = DelimiterPattern::new(&self.config.delimiter)?;
        let mut overrides = OverrideManager::new(pattern.clone(), &self.config);
        overrides.enable(view.text, surface)?;

        debug!(
            delimiter = pattern.as_str(),
            rules = overrides.len(),
            "page rule mode enabled"
        );
        self.state = ModeState::Enabled {
            overrides,
            folds: FoldController::new(pattern),
        };
        Ok(())
    }

    /// Turn the mode off, removing every override and showing every hidden section.
    pub fn disable(&mut self, surface: &mut dyn DisplaySurface) {
        if let ModeState::Enabled {
            mut overrides,
            mut folds,
        } = std::mem::replace(&mut self.state, ModeState::Disabled)
        {
            folds.show_all(surface);
            overrides.disable(surface);
            debug!("page rule mode disabled");
        }
    }

    /// Edit notification. `view.text` is the post-edit buffer.
    ///
    /// Overrides are resynchronized first, then fold ranges. Pass `None` when the host
    /// cannot say which range changed.
    pub fn handle_edit(
        &mut self,
        view: BufferView<'_>,
        edit: Option<&TextEdit>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<(), PageRuleError> {
        let ModeState::Enabled { overrides, folds } = &mut self.state else {
            return Ok(());
        };

        let result = overrides.on_edit(view.text, edit, surface);
        if result.is_ok() {
            folds.on_edit(view, edit, surface);
        }
        self.check_host(result, surface)
    }

    /// Fold or unfold the section at `pos` (bound to clicks on a rule).
    pub fn toggle_section_at(
        &mut self,
        view: BufferView<'_>,
        pos: usize,
        surface: &mut dyn DisplaySurface,
    ) -> Result<ToggleOutcome, PageRuleError> {
        let ModeState::Enabled { folds, .. } = &mut self.state else {
            return Err(PageRuleError::NotEnabled);
        };

        let result = folds.toggle_at(view, pos, surface);
        self.check_host(result, surface)
    }

    /// Fold every section except the one holding the cursor. Returns the hidden count.
    pub fn hide_all_sections(
        &mut self,
        view: BufferView<'_>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<usize, PageRuleError> {
        let ModeState::Enabled { folds, .. } = &mut self.state else {
            return Err(PageRuleError::NotEnabled);
        };

        let result = folds.hide_all(view, surface);
        self.check_host(result, surface)
    }

    /// Unfold every section. A no-op when the mode is off.
    pub fn show_all_sections(&mut self, surface: &mut dyn DisplaySurface) {
        if let ModeState::Enabled { folds, .. } = &mut self.state {
            folds.show_all(surface);
        }
    }

    /// Unfold the section starting at `outer_start`. Returns `false` if it was not folded.
    pub fn show_section(&mut self, outer_start: usize, surface: &mut dyn DisplaySurface) -> bool {
        match &mut self.state {
            ModeState::Enabled { folds, .. } => folds.show(outer_start, surface),
            ModeState::Disabled => false,
        }
    }

    /// Redraw rules after the viewport width changed.
    pub fn on_viewport_resized(
        &mut self,
        surface: &mut dyn DisplaySurface,
    ) -> Result<(), PageRuleError> {
        let ModeState::Enabled { overrides, .. } = &mut self.state else {
            return Ok(());
        };

        let result = overrides.refresh_layout(surface);
        self.check_host(result, surface)
    }

    /// Final cursor position for a move, applying cursor avoidance when configured.
    pub fn adjust_cursor(&self, previous: usize, next: usize, motion: CursorMotion) -> usize {
        match &self.state {
            ModeState::Enabled { overrides, .. } => overrides.adjust_cursor(previous, next, motion),
            ModeState::Disabled => next,
        }
    }

    /// The override manager, while enabled.
    pub fn overrides(&self) -> Option<&OverrideManager> {
        match &self.state {
            ModeState::Enabled { overrides, .. } => Some(overrides),
            ModeState::Disabled => None,
        }
    }

    /// The fold controller, while enabled.
    pub fn folds(&self) -> Option<&FoldController> {
        match &self.state {
            ModeState::Enabled { folds, .. } => Some(folds),
            ModeState::Disabled => None,
        }
    }

    /// Hidden sections (empty while disabled).
    pub fn fold_ranges(&self) -> &[FoldRange] {
        self.folds().map(FoldController::ranges).unwrap_or_default()
    }

    /// A host failure is fatal for this buffer: switch the mode off and report it.
    fn check_host<T>(
        &mut self,
        result: Result<T, HostError>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<T, PageRuleError> {
        result.map_err(|err| {
            warn!(error = %err, "host display failure, disabling page rule mode");
            self.disable(surface);
            PageRuleError::Host(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SurfaceCapability;
    use crate::surface::MemorySurface;
    use page_rule_lang::CommentConfig;

    const SAMPLE: &str = "head\n\x0C\n;; Section A\ncode1\n\x0C\n;; Section B\ncode2";

    #[test]
    fn test_invalid_pattern_leaves_nothing_installed() {
        let comments = CommentConfig::line(";;");
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut mode = PageRuleMode::new(PageRuleConfig {
            delimiter: "[".to_string(),
            ..PageRuleConfig::default()
        });

        let err = mode
            .enable(BufferView::new(SAMPLE, 0, &comments), &mut surface)
            .unwrap_err();
        assert!(matches!(err, PageRuleError::InvalidPattern { .. }));
        assert!(!mode.is_enabled());
        assert_eq!(surface.override_count(), 0);
    }

    #[test]
    fn test_commands_require_enabled_mode() {
        let comments = CommentConfig::line(";;");
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut mode = PageRuleMode::new(PageRuleConfig::default());
        let view = BufferView::new(SAMPLE, 0, &comments);

        assert_eq!(
            mode.toggle_section_at(view, 5, &mut surface),
            Err(PageRuleError::NotEnabled)
        );
        assert_eq!(
            mode.hide_all_sections(view, &mut surface),
            Err(PageRuleError::NotEnabled)
        );
        mode.show_all_sections(&mut surface);
        assert!(mode.handle_edit(view, None, &mut surface).is_ok());
    }

    #[test]
    fn test_disable_after_hide_all_removes_everything() {
        let comments = CommentConfig::line(";;");
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut mode = PageRuleMode::new(PageRuleConfig::default());
        let view = BufferView::new(SAMPLE, 0, &comments);

        mode.enable(view, &mut surface).unwrap();
        assert_eq!(mode.hide_all_sections(view, &mut surface).unwrap(), 2);
        assert_eq!(surface.override_count(), 2);
        assert_eq!(surface.invisible_count(), 2);

        mode.disable(&mut surface);
        assert_eq!(surface.override_count(), 0);
        assert_eq!(surface.invisible_count(), 0);
        assert!(mode.fold_ranges().is_empty());
        assert!(mode.overrides().is_none());
    }

    #[test]
    fn test_host_failure_disables_mode() {
        let comments = CommentConfig::line(";;");
        let mut surface = MemorySurface::new(SurfaceCapability::Graphical, 10);
        let mut mode = PageRuleMode::new(PageRuleConfig::default());
        let view = BufferView::new(SAMPLE, 0, &comments);

        mode.enable(view, &mut surface).unwrap();
        surface.set_invisibility_supported(false);

        let err = mode.hide_all_sections(view, &mut surface).unwrap_err();
        assert!(matches!(
            err,
            PageRuleError::Host(HostError::InvisibilityUnavailable(_))
        ));
        assert!(!mode.is_enabled());
        assert_eq!(surface.override_count(), 0);
    }
}
