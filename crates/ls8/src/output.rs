//! Prints `PRN` values as decimal lines.

use std::io::{self, Write};

use ls8_core::OutputSink;

/// [`OutputSink`] that writes each value in decimal on its own line.
///
/// The first write failure is kept and later values are skipped; the
/// machine keeps running either way.
#[derive(Debug)]
pub struct DecimalLines<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> DecimalLines<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Returns the write error that stopped output, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<W: Write> OutputSink for DecimalLines<W> {
    fn emit(&mut self, value: u8) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{value}") {
            self.error = Some(e);
        }
    }
}
