//! Single-pass streaming record parser.
//!
//! The parser owns a sliding-window buffer of twice the maximum record
//! size. Three cursors delimit its state: `upto` marks the start of the
//! current record (everything before it is consumed), `cursor` is the scan
//! position, and `datalen` is the end of valid buffered bytes. Compaction
//! shifts the live span back to offset zero; refilling happens right after
//! each record boundary whenever the remaining lookahead would drop below
//! one full record, so a record that fits the configured maximum is always
//! entirely buffered before it is scanned.

use log::debug;
use std::io::{ErrorKind, Read};

use super::config::CsvConfig;
use super::error::CsvError;
use crate::groupstream::error::{GroupByError, GroupByResult};

const QUOTE: u8 = b'"';
const RECORD_TERMINATOR: u8 = b'\n';

/// Receiver of parsing events.
///
/// The parser drives a sink through one `field` call per field and one
/// `end_of_record` call per record terminator. The field slice borrows the
/// parser's buffer and is invalidated by the next parser operation: a sink
/// that keeps a value beyond the callback must copy it into owned storage.
///
/// Either callback may return an error to abort the run.
pub trait RecordSink {
    /// One field of the current record
    fn field(&mut self, value: &[u8]) -> GroupByResult<()>;

    /// The current record is complete
    fn end_of_record(&mut self) -> GroupByResult<()>;
}

/// Streaming parser over any byte source.
pub struct CsvParser<R: Read> {
    reader: R,
    delimiter: u8,
    max_record_size: usize,
    buf: Vec<u8>,
    /// Start of the current record; bytes before this are consumed
    upto: usize,
    /// Current scan position
    cursor: usize,
    /// End of valid buffered bytes
    datalen: usize,
    eof: bool,
    line: usize,
}

impl<R: Read> CsvParser<R> {
    /// Create a parser reading from `reader`.
    ///
    /// Fails if the configuration is unusable: a zero record size, or a
    /// delimiter that collides with the quote or record terminator bytes.
    pub fn new(reader: R, config: &CsvConfig) -> GroupByResult<Self> {
        if config.max_record_size == 0 {
            return Err(GroupByError::config_error("max record size must be at least 1"));
        }
        if config.delimiter == QUOTE || config.delimiter == RECORD_TERMINATOR {
            return Err(GroupByError::config_error(
                "delimiter cannot be the quote or newline character",
            ));
        }
        debug!(
            "new parser with max_record_size = {} and buf_size = {}",
            config.max_record_size,
            2 * config.max_record_size
        );
        Ok(Self {
            reader,
            delimiter: config.delimiter,
            max_record_size: config.max_record_size,
            buf: vec![0; 2 * config.max_record_size],
            upto: 0,
            cursor: 0,
            datalen: 0,
            eof: false,
            line: 1,
        })
    }

    /// 1-based number of the line currently being parsed
    pub fn line(&self) -> usize {
        self.line
    }

    /// Shift the unconsumed span back to offset zero and rebase cursors.
    fn discard(&mut self) {
        if self.upto < self.datalen {
            debug!("discarding {} consumed bytes", self.upto);
            self.buf.copy_within(self.upto..self.datalen, 0);
            self.datalen -= self.upto;
            self.cursor -= self.upto;
        } else {
            self.datalen = 0;
            self.cursor = 0;
        }
        self.upto = 0;
    }

    /// Compact, then read until the buffer is full or the source is
    /// exhausted. An interrupted read is retried; any other read error is
    /// fatal.
    fn feed(&mut self) -> GroupByResult<()> {
        if self.eof {
            return Ok(());
        }
        self.discard();
        while self.datalen < self.buf.len() {
            match self.reader.read(&mut self.buf[self.datalen..]) {
                Ok(0) => {
                    debug!("hit end of input");
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    debug!("read {} new bytes", n);
                    self.datalen += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(CsvError::Io {
                        message: e.to_string(),
                    }
                    .into())
                }
            }
        }
        Ok(())
    }

    /// Advance `cursor` to the next occurrence of any of `targets` within
    /// the buffered window. Returns false when the window is exhausted
    /// first.
    fn find(&mut self, targets: &[u8]) -> bool {
        while self.cursor < self.datalen {
            if targets.contains(&self.buf[self.cursor]) {
                return true;
            }
            self.cursor += 1;
        }
        false
    }

    /// Run the parser to completion, delivering every field and record
    /// boundary to `sink`.
    ///
    /// Ends successfully when the source is exhausted and every buffered
    /// byte has been consumed; end of input in the middle of a record is a
    /// parse error.
    pub fn parse<S: RecordSink>(&mut self, sink: &mut S) -> GroupByResult<()> {
        self.feed()?;
        loop {
            if self.eof && self.upto >= self.datalen {
                break;
            }
            if self.cursor >= self.datalen {
                self.feed()?;
                if self.cursor >= self.datalen {
                    if self.eof && self.upto >= self.datalen {
                        break;
                    }
                    return Err(self.premature_end().into());
                }
            }

            let quoted = self.buf[self.cursor] == QUOTE;
            if quoted {
                self.cursor += 1;
            }
            let start = self.cursor;

            if quoted {
                loop {
                    if !self.find(&[QUOTE]) {
                        return Err(CsvError::NoTerminatingQuote { line: self.line }.into());
                    }
                    let next = self.cursor + 1;
                    if next >= self.datalen {
                        return Err(self.premature_end().into());
                    }
                    if self.buf[next] == QUOTE {
                        // escaped quote, keep scanning
                        self.cursor += 2;
                    } else if self.buf[next] != self.delimiter && self.buf[next] != RECORD_TERMINATOR
                    {
                        return Err(CsvError::MalformedQuote { line: self.line }.into());
                    } else {
                        break;
                    }
                }
            } else if !self.find(&[self.delimiter, RECORD_TERMINATOR]) {
                return Err(self.premature_end().into());
            }

            sink.field(&self.buf[start..self.cursor])?;

            if quoted {
                // move past the closing quote onto the delimiter or terminator
                self.cursor += 1;
            }

            if self.buf[self.cursor] == RECORD_TERMINATOR {
                sink.end_of_record()?;
                self.line += 1;
                self.cursor += 1;
                self.upto = self.cursor;
                debug!(
                    "eol, cursor={}, datalen={}, upto={}",
                    self.cursor, self.datalen, self.upto
                );
                // keep a full record of lookahead available
                if self.datalen - self.upto < self.max_record_size {
                    self.feed()?;
                }
            } else {
                self.cursor += 1;
            }
        }
        Ok(())
    }

    /// Classify a scan that ran out of buffered bytes: at end of input a
    /// short remainder is a truncated record, anything else means the
    /// record did not fit the window.
    fn premature_end(&self) -> CsvError {
        if self.eof && self.datalen - self.upto < self.max_record_size {
            CsvError::UnexpectedEof { line: self.line }
        } else {
            CsvError::RecordTooLong { line: self.line }
        }
    }
}
