//! Delimiter scanning.
//!
//! Pure functions over a UTF-8 `&str` that locate occurrences of the page delimiter.
//! All public inputs/outputs are **character offsets**. Scans never fail: a pattern is
//! validated once, when a [`DelimiterPattern`] is built.

use regex::{Regex, RegexBuilder};
use regex_syntax::ParserBuilder;

use crate::error::PageRuleError;
use crate::text::CharIndex;

/// Form feed at the start of a line, the conventional page delimiter.
pub const FORM_FEED_PATTERN: &str = "^\x0C";

/// One occurrence of the delimiter, as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DelimiterSpan {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl DelimiterSpan {
    /// Create a span for `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns `true` if `pos` lies in `[start, end)`.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// A compiled, validated delimiter pattern.
///
/// Patterns are regexes compiled in multi-line mode, so `^` and `$` anchor at line
/// boundaries.
#[derive(Debug, Clone)]
pub struct DelimiterPattern {
    regex: Regex,
}

impl DelimiterPattern {
    /// Compile `pattern`.
    ///
    /// Fails with [`PageRuleError::InvalidPattern`] if the regex does not compile or if any
    /// of its matches can be empty (such a pattern cannot delimit anything).
    pub fn new(pattern: &str) -> Result<Self, PageRuleError> {
        let invalid = |message: String| PageRuleError::InvalidPattern {
            pattern: pattern.to_string(),
            message,
        };

        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|err| invalid(err.to_string()))?;

        let hir = ParserBuilder::new()
            .multi_line(true)
            .build()
            .parse(pattern)
            .map_err(|err| invalid(err.to_string()))?;
        match hir.properties().minimum_len() {
            Some(0) => return Err(invalid("pattern can produce an empty match".to_string())),
            None => return Err(invalid("pattern never matches".to_string())),
            Some(_) => {}
        }

        Ok(Self { regex })
    }

    /// The default delimiter: a form feed at the start of a line.
    pub fn form_feed() -> Self {
        Self {
            regex: RegexBuilder::new(FORM_FEED_PATTERN)
                .multi_line(true)
                .build()
                .expect("valid form feed regex"),
        }
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub(crate) fn find_from(
        &self,
        text: &str,
        index: &CharIndex,
        from_char: usize,
    ) -> Option<DelimiterSpan> {
        let start_byte = index.char_to_byte(from_char.min(index.char_count()));
        let m = self.regex.find_at(text, start_byte)?;
        Some(DelimiterSpan::new(
            index.byte_to_char(m.start()),
            index.byte_to_char(m.end()),
        ))
    }
}

impl Default for DelimiterPattern {
    fn default() -> Self {
        Self::form_feed()
    }
}

/// Find the first occurrence of `pattern` starting at or after `from_char`.
pub fn scan(text: &str, pattern: &DelimiterPattern, from_char: usize) -> Option<DelimiterSpan> {
    let index = CharIndex::new(text);
    pattern.find_from(text, &index, from_char)
}

/// Find the last occurrence of `pattern` whose start is at or before `at_char`.
pub fn scan_back(text: &str, pattern: &DelimiterPattern, at_char: usize) -> Option<DelimiterSpan> {
    occurrences(text, pattern, 0)
        .take_while(|span| span.start <= at_char)
        .last()
}

/// Lazily enumerate every occurrence of `pattern` from `from_char` to the end of `text`.
///
/// The sequence is equivalent to calling [`scan`] repeatedly from each returned span's end.
pub fn occurrences<'a>(
    text: &'a str,
    pattern: &'a DelimiterPattern,
    from_char: usize,
) -> Occurrences<'a> {
    Occurrences {
        text,
        pattern,
        index: CharIndex::new(text),
        next_from: Some(from_char),
    }
}

/// Iterator returned by [`occurrences`].
#[derive(Debug)]
pub struct Occurrences<'a> {
    text: &'a str,
    pattern: &'a DelimiterPattern,
    index: CharIndex,
    next_from: Option<usize>,
}

impl Iterator for Occurrences<'_> {
    type Item = DelimiterSpan;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.next_from?;
        let span = self.pattern.find_from(self.text, &self.index, from);
        self.next_from = span.map(|s| s.end);
        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "head\n\x0C\n;; Section A\ncode1\n\x0C\n;; Section B\ncode2";

    #[test]
    fn test_scan_finds_form_feeds_in_order() {
        let pattern = DelimiterPattern::form_feed();
        let spans: Vec<_> = occurrences(SAMPLE, &pattern, 0).collect();
        assert_eq!(spans, vec![DelimiterSpan::new(5, 6), DelimiterSpan::new(26, 27)]);
    }

    #[test]
    fn test_scan_restarts_from_any_position() {
        let pattern = DelimiterPattern::form_feed();
        assert_eq!(scan(SAMPLE, &pattern, 6), Some(DelimiterSpan::new(26, 27)));
        assert_eq!(scan(SAMPLE, &pattern, 27), None);
        assert_eq!(scan(SAMPLE, &pattern, 1_000), None);
    }

    #[test]
    fn test_scan_back() {
        let pattern = DelimiterPattern::form_feed();
        assert_eq!(scan_back(SAMPLE, &pattern, 4), None);
        assert_eq!(scan_back(SAMPLE, &pattern, 5), Some(DelimiterSpan::new(5, 6)));
        assert_eq!(scan_back(SAMPLE, &pattern, 25), Some(DelimiterSpan::new(5, 6)));
        assert_eq!(scan_back(SAMPLE, &pattern, 40), Some(DelimiterSpan::new(26, 27)));
    }

    #[test]
    fn test_form_feed_must_start_line() {
        let pattern = DelimiterPattern::form_feed();
        assert_eq!(scan("a\x0Cb", &pattern, 0), None);
        assert_eq!(scan("\x0C", &pattern, 0), Some(DelimiterSpan::new(0, 1)));
    }

    #[test]
    fn test_offsets_are_chars_not_bytes() {
        let pattern = DelimiterPattern::new("^---$").unwrap();
        let text = "日本語\n---\n";
        assert_eq!(scan(text, &pattern, 0), Some(DelimiterSpan::new(4, 7)));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            DelimiterPattern::new("(unclosed"),
            Err(PageRuleError::InvalidPattern { .. })
        ));
        assert!(matches!(
            DelimiterPattern::new("x*"),
            Err(PageRuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_patterns_with_an_empty_alternative_are_rejected() {
        // `\b` never matches "" yet can only ever produce empty matches.
        for pattern in [r"\b", r"\b|x", r"^$|\x0C"] {
            assert!(
                matches!(
                    DelimiterPattern::new(pattern),
                    Err(PageRuleError::InvalidPattern { .. })
                ),
                "{pattern} should be rejected"
            );
        }
    }

    #[test]
    fn test_multi_line_delimiter() {
        let pattern = DelimiterPattern::new("^--\n--$").unwrap();
        let spans: Vec<_> = occurrences("a\n--\n--\nb\n--\n--", &pattern, 0).collect();
        assert_eq!(spans, vec![DelimiterSpan::new(2, 7), DelimiterSpan::new(10, 15)]);
    }
}
