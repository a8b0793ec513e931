//! Report rendering.
//!
//! Each captured block is written as:
//!
//! ```text
//! ===============================================================================
//! 3 FAILED:
//! 	SomeTest FAILED
//! 	reason line 1
//! ```

use std::io::{self, Write};

use crate::extract::ReasonBlock;

/// Width of the `=` separator preceding every block.
pub const SEPARATOR_WIDTH: usize = 79;

/// Suffix of the header line, written after the failure count.
pub const FAILED_HEADER_SUFFIX: &str = " FAILED:";

/// Prefix of every body line.
pub const TAB_INDENT: &str = "\t";

/// Short-form message written under the banner when no markers were found.
pub const NO_ERRORS_MESSAGE: &str = "No errors found.";

const NO_ERRORS_BANNER: &[&str] = &[
    r"  _   _          _____                           _____                       _ ",
    r" | \ | | ___   | ____|_ __ _ __ ___  _ __ ___   |  ___|__  _   _ _ __    __|  |",
    r" |  \| |/ _ \  |  _| | '__| '__/ _  \| '__/ __| | |_ / _  \| | | | '_ \ /     |",
    r" | |\  | (_) | | |___| |  | | | (_) | |   \__ \ |  _| (_) | |_| | | | | (_|   |",
    r" |_| \_|\___/  |_____|_|  |_|  \___/|_|  |___/ |_|  \___/ \ __,_|_| |_|\__,__ |",
];

/// The separator line, without its newline.
pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Streams report blocks into a sink.
#[derive(Debug)]
pub struct ReportWriter<W: Write> {
    out: W,
    blocks: usize,
    fallback_written: bool,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            blocks: 0,
            fallback_written: false,
        }
    }

    /// Write one `(count, block)` entry. `count` is the decimal failure count.
    pub fn write_block(&mut self, count: &str, block: &ReasonBlock) -> io::Result<()> {
        writeln!(self.out, "{}", separator())?;
        writeln!(self.out, "{}{}", count, FAILED_HEADER_SUFFIX)?;
        for line in block.lines() {
            writeln!(self.out, "{}{}", TAB_INDENT, line)?;
        }
        self.blocks += 1;
        Ok(())
    }

    /// Write the "No Errors Found" banner and message.
    ///
    /// Only the first call writes anything.
    pub fn write_fallback(&mut self) -> io::Result<()> {
        if self.fallback_written {
            return Ok(());
        }
        writeln!(self.out)?;
        for line in NO_ERRORS_BANNER {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{}", NO_ERRORS_MESSAGE)?;
        self.fallback_written = true;
        Ok(())
    }

    /// Number of blocks written so far.
    pub fn blocks_written(&self) -> usize {
        self.blocks
    }

    pub fn fallback_written(&self) -> bool {
        self.fallback_written
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    /// Hand back the sink without flushing, e.g. to discard it after an error.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str]) -> ReasonBlock {
        let mut cursor_input = String::new();
        for line in lines {
            cursor_input.push_str(line);
            cursor_input.push('\n');
        }
        let mut cursor = crate::LineCursor::new(cursor_input.as_bytes());
        crate::extract(&mut cursor, crate::Patterns::get(), Default::default()).block
    }

    #[test]
    fn test_block_format() {
        let mut writer = ReportWriter::new(Vec::new());
        writer
            .write_block("3", &block(&["SomeTest FAILED", "why"]))
            .unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();

        let expected = format!("{}\n3 FAILED:\n\tSomeTest FAILED\n\twhy\n", "=".repeat(79));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_block_writes_header_only() {
        let mut writer = ReportWriter::new(Vec::new());
        writer.write_block("7", &ReasonBlock::default()).unwrap();
        assert_eq!(writer.blocks_written(), 1);
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(out.ends_with("\n7 FAILED:\n"));
    }

    #[test]
    fn test_fallback_written_once() {
        let mut writer = ReportWriter::new(Vec::new());
        writer.write_fallback().unwrap();
        writer.write_fallback().unwrap();
        assert!(writer.fallback_written());
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();

        assert_eq!(out.matches(NO_ERRORS_MESSAGE).count(), 1);
        assert!(out.starts_with('\n'));
        assert!(out.contains(r"|_| \_|\___/"));
        assert!(!out.contains(&separator()));
    }

    #[test]
    fn test_separator_width() {
        assert_eq!(separator().len(), 79);
        assert!(separator().chars().all(|c| c == '='));
    }
}
