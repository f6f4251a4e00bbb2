//! Character-offset helpers over a UTF-8 `&str`.

/// Maps between character offsets and byte offsets of one text snapshot.
#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

/// Line navigation over one text snapshot, in character offsets.
#[derive(Debug)]
pub(crate) struct Lines<'a> {
    text: &'a str,
    index: CharIndex,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            index: CharIndex::new(text),
        }
    }

    pub(crate) fn text(&self) -> &'a str {
        self.text
    }

    pub(crate) fn index(&self) -> &CharIndex {
        &self.index
    }

    pub(crate) fn char_count(&self) -> usize {
        self.index.char_count()
    }

    /// Start of the line containing `pos`.
    pub(crate) fn line_start(&self, pos: usize) -> usize {
        let byte = self.index.char_to_byte(pos);
        self.text[..byte]
            .rfind('\n')
            .map(|b| self.index.byte_to_char(b + 1))
            .unwrap_or(0)
    }

    /// Offset of the `\n` terminating the line containing `pos` (or the text end).
    pub(crate) fn line_end(&self, pos: usize) -> usize {
        let byte = self.index.char_to_byte(pos);
        self.text[byte..]
            .find('\n')
            .map(|b| self.index.byte_to_char(byte + b))
            .unwrap_or_else(|| self.index.char_count())
    }

    /// Start of the line following the one containing `pos`, if there is one.
    pub(crate) fn next_line_start(&self, pos: usize) -> Option<usize> {
        let end = self.line_end(pos);
        (end < self.char_count()).then_some(end + 1)
    }

    /// Content of the line starting at `line_start`, without its terminator (`\n` or `\r\n`).
    pub(crate) fn line_text(&self, line_start: usize) -> &'a str {
        let start = self.index.char_to_byte(line_start);
        let end = self.index.char_to_byte(self.line_end(line_start));
        let line = &self.text[start..end];
        line.strip_suffix('\r').unwrap_or(line)
    }
}
