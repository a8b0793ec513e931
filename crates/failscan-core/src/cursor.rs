//! Forward-only line cursor over an in-memory byte buffer.

use std::borrow::Cow;

/// Line reader shared by the scanner and the reason extractor.
///
/// Each call to [`LineCursor::next_line`] consumes one line, so a line read by
/// the extractor is never seen again by the scanner.
#[derive(Debug)]
pub struct LineCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Move back to the first byte of the buffer.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Byte offset of the next unread line.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a position previously returned by [`LineCursor::position`].
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read the next raw line, including its `\n` terminator if present.
    pub fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.is_exhausted() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let len = match rest.iter().position(|&b| b == b'\n') {
            Some(idx) => idx + 1,
            None => rest.len(),
        };
        self.pos += len;
        Some(&rest[..len])
    }
}

/// Strip a trailing `\n` or `\r\n`.
pub fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Decode a raw line as text, replacing invalid UTF-8 sequences.
///
/// Undecodable bytes never abort a scan; they surface as U+FFFD in the
/// report instead.
pub fn decode(line: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(line);
    if let Cow::Owned(_) = text {
        tracing::debug!(len = line.len(), "line is not valid UTF-8, decoded lossily");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_lines_with_terminators() {
        let mut cursor = LineCursor::new(b"one\ntwo\nthree");
        assert_eq!(cursor.next_line(), Some(&b"one\n"[..]));
        assert_eq!(cursor.next_line(), Some(&b"two\n"[..]));
        assert_eq!(cursor.next_line(), Some(&b"three"[..]));
        assert_eq!(cursor.next_line(), None);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_empty_buffer_has_no_lines() {
        let mut cursor = LineCursor::new(b"");
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn test_blank_lines_are_preserved() {
        let mut cursor = LineCursor::new(b"\n\nx\n");
        assert_eq!(cursor.next_line(), Some(&b"\n"[..]));
        assert_eq!(cursor.next_line(), Some(&b"\n"[..]));
        assert_eq!(cursor.next_line(), Some(&b"x\n"[..]));
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn test_rewind_and_seek() {
        let mut cursor = LineCursor::new(b"a\nb\nc\n");
        cursor.next_line();
        let mark = cursor.position();
        cursor.next_line();
        cursor.next_line();
        assert!(cursor.is_exhausted());

        cursor.seek(mark);
        assert_eq!(cursor.next_line(), Some(&b"b\n"[..]));

        cursor.rewind();
        assert_eq!(cursor.next_line(), Some(&b"a\n"[..]));
    }

    #[test]
    fn test_seek_past_end_clamps() {
        let mut cursor = LineCursor::new(b"a\n");
        cursor.seek(100);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_trim_terminator() {
        assert_eq!(trim_terminator(b"line\n"), b"line");
        assert_eq!(trim_terminator(b"line\r\n"), b"line");
        assert_eq!(trim_terminator(b"line"), b"line");
        assert_eq!(trim_terminator(b"\n"), b"");
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let text = decode(b"bad \xff byte");
        assert_eq!(text, "bad \u{FFFD} byte");
        assert_eq!(decode(b"fine"), "fine");
    }
}
