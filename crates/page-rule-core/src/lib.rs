#![warn(missing_docs)]
//! Page Rule Core - page delimiter rules and section folding for text buffers
//!
//! # Overview
//!
//! `page-rule-core` finds page delimiters (form feeds by default) in a buffer and asks the
//! host to draw each one as a full-width horizontal rule, without touching the text. On top
//! of the rules it can fold sections: a folded section hides everything up to the next
//! delimiter while keeping the comment lines right after the delimiter visible as a title.
//!
//! The crate is headless. It reads buffer text, receives edit notifications and drives two
//! host primitives (display overrides and invisible text) through the [`DisplaySurface`]
//! trait.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace / Document (reference host)      │  ← Buffers, edits, commands
//! ├─────────────────────────────────────────────┤
//! │  PageRuleMode (per buffer)                  │  ← Enable/disable, edit dispatch
//! ├──────────────────────┬──────────────────────┤
//! │  OverrideManager     │  FoldController      │  ← Rules / hidden sections
//! ├──────────────────────┴──────────────────────┤
//! │  Delimiter Scanner                          │  ← Occurrence spans
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use page_rule_core::{Document, PageRuleConfig};
//! use page_rule_lang::CommentConfig;
//!
//! let text = "head\n\x0C\n;; Section A\ncode1\n\x0C\n;; Section B\ncode2";
//! let mut doc = Document::new(text, PageRuleConfig::default());
//! doc.set_comments(CommentConfig::line(";;"));
//!
//! doc.enable_mode().unwrap();
//! assert_eq!(doc.surface().override_count(), 2);
//!
//! doc.hide_all_sections().unwrap();
//! assert_eq!(doc.mode().fold_ranges().len(), 2);
//!
//! // Editing inside a hidden section reveals it.
//! doc.insert(22, "x").unwrap();
//! assert_eq!(doc.mode().fold_ranges().len(), 1);
//! ```
//!
//! # Module Description
//!
//! - [`scanner`] - delimiter pattern and occurrence scanning
//! - [`overrides`] - rule overrides and cursor avoidance
//! - [`folding`] - hidden sections and edit invalidation
//! - [`mode`] - per-buffer mode tying the two together
//! - [`host`] - capability traits implemented by the host
//! - [`surface`] / [`document`] / [`workspace`] - in-memory reference host
//!
//! # Positions
//!
//! All positions are character offsets (Unicode scalar values). Ranges are half-open unless
//! a method says otherwise.

pub mod config;
pub mod document;
pub mod edit;
pub mod error;
pub mod folding;
pub mod host;
pub mod markers;
pub mod mode;
pub mod overrides;
pub mod scanner;
pub mod surface;
mod text;
pub mod workspace;

pub use config::{DEFAULT_RULE_CHAR, PageRuleConfig};
pub use document::{DEFAULT_VIEWPORT_WIDTH, Document};
pub use edit::TextEdit;
pub use error::{HostError, PageRuleError};
pub use folding::{FoldController, FoldRange, Section, ToggleOutcome};
pub use host::{BufferView, CommentPredicate, DisplaySurface, MarkerId, SurfaceCapability};
pub use markers::{Marker, MarkerTree};
pub use mode::PageRuleMode;
pub use overrides::{
    CursorMotion, CursorPolicy, DisplayOverride, InteractionHandlers, OverrideManager, RuleAction,
    RuleStyle,
};
pub use scanner::{
    DelimiterPattern, DelimiterSpan, FORM_FEED_PATTERN, Occurrences, occurrences, scan, scan_back,
};
pub use surface::MemorySurface;
pub use workspace::{BufferId, Workspace};
