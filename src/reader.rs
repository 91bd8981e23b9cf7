use std::io::BufRead;

use crate::error::{Error, ErrorKind, Result};

/// Comments start with this character in the first column.
pub const COMMENT_CHAR: char = '!';

/// One non-blank input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based.
    pub number: u32,
    /// Content with surrounding whitespace removed.
    pub text: String,
    pub comment: bool,
}

/// Where section parsers get their lines from.
pub trait LineSource {
    /// Get the next non-blank line. Comment lines are skipped when
    /// `skip_comments` is set.
    fn next_line(&mut self, skip_comments: bool) -> Result<Option<Line>>;

    /// Return a line so that the next call to `next_line` yields it again.
    fn push_back(&mut self, line: Line);

    /// Number of the last line read from the input.
    fn line_number(&self) -> u32;
}

/// Reads an export line by line, skipping blank lines.
///
/// The reader owns its input. A single line can be pushed back, which
/// is how the header scan stops in front of the first command line.
#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    line: u32,
    pushed: Option<Line>,
    eof: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(input: R) -> LineReader<R> {
        LineReader {
            input,
            line: 0,
            pushed: None,
            eof: false,
        }
    }

    fn read_raw(&mut self) -> Result<Option<String>> {
        if self.eof {
            return Ok(None);
        }
        let mut buf = String::new();
        let n = self.input.read_line(&mut buf).map_err(|e| {
            Error::new(ErrorKind::Io, e.to_string(), self.line + 1)
        })?;
        if n == 0 {
            trace!("end of input after line {}", self.line);
            self.eof = true;
            return Ok(None);
        }
        self.line += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn next_line(&mut self, skip_comments: bool) -> Result<Option<Line>> {
        if let Some(line) = self.pushed.take() {
            if !(skip_comments && line.comment) {
                return Ok(Some(line));
            }
            trace!("skipping comment: {}", line.text);
        }
        while let Some(raw) = self.read_raw()? {
            if raw.trim().is_empty() {
                continue;
            }
            let comment = raw.starts_with(COMMENT_CHAR);
            if skip_comments && comment {
                trace!("skipping comment: {}", raw);
                continue;
            }
            trace!("line {}: {}", self.line, raw);
            return Ok(Some(Line {
                number: self.line,
                text: raw.trim().to_string(),
                comment,
            }));
        }
        Ok(None)
    }

    fn push_back(&mut self, line: Line) {
        debug_assert!(self.pushed.is_none());
        self.pushed = Some(line);
    }

    fn line_number(&self) -> u32 {
        self.line
    }
}
