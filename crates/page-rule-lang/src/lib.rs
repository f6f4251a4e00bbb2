#![warn(missing_docs)]
//! `page-rule-lang` - data-driven language configuration helpers for `page-rule-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It provides small structs that hosts use to describe a language's
//! comment syntax, which the fold controller uses to keep section header lines visible.

/// Comment tokens/config for a given language.
///
/// Section folding treats lines that start with one of these tokens (after leading
/// whitespace) as header lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`, `;;`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: None,
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Built-in comment syntax for a handful of common language ids.
    ///
    /// Returns `None` for unknown languages; hosts are expected to supply their own config
    /// in that case.
    pub fn for_language(language_id: &str) -> Option<Self> {
        let config = match language_id {
            "lisp" | "emacs-lisp" | "scheme" | "clojure" => Self::line(";;"),
            "rust" | "go" | "javascript" | "typescript" | "java" | "c" | "cpp" => {
                Self::line_and_block("//", "/*", "*/")
            }
            "python" | "shell" | "ruby" | "toml" | "yaml" | "perl" => Self::line("#"),
            "lua" | "haskell" | "sql" => Self::line("--"),
            "tex" | "latex" | "erlang" => Self::line("%"),
            _ => return None,
        };
        Some(config)
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if `line` starts (after leading whitespace) with a comment token.
    ///
    /// Blank lines never count as comments. A line opening a block comment counts even when
    /// the block is closed on a later line.
    pub fn is_comment_line(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            return false;
        }

        if self.has_line()
            && let Some(token) = self.line.as_deref()
            && trimmed.starts_with(token)
        {
            return true;
        }

        self.has_block()
            && self
                .block_start
                .as_deref()
                .is_some_and(|token| trimmed.starts_with(token))
    }
}
