//! Trace printer.
//!
//! Each cycle renders as one line with the program counter, the three bytes
//! at `PC` and the eight general registers, all in two-digit uppercase hex:
//!
//! ```text
//! TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4
//! ```

use std::io::{self, Write};

use ls8_core::{TraceEvent, TraceSink, TraceSnapshot};

/// Renders one `TRACE:` line, without a trailing newline.
#[must_use]
pub fn format_trace_line(snapshot: &TraceSnapshot) -> String {
    let [opcode, operand_a, operand_b] = snapshot.bytes;
    let registers = snapshot
        .registers
        .iter()
        .map(|value| format!("{value:02X}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "TRACE: {:02X} | {opcode:02X} {operand_a:02X} {operand_b:02X} | {registers}",
        snapshot.pc
    )
}

/// [`TraceSink`] that writes a `TRACE:` line for every instruction start.
///
/// Other events are ignored. Tracing stops at the first write failure, which
/// is kept for [`TraceWriter::take_error`].
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> TraceWriter<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Returns the write error that stopped tracing, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn on_event(&mut self, event: TraceEvent) {
        if self.error.is_some() {
            return;
        }
        if let TraceEvent::InstructionStart(snapshot) = event {
            if let Err(e) = writeln!(self.writer, "{}", format_trace_line(&snapshot)) {
                self.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_trace_line, TraceWriter};
    use ls8_core::{FaultCode, TraceEvent, TraceSink, TraceSnapshot};
    use std::io::{self, Write};

    struct ClosedStream {
        writes: usize,
    }

    impl Write for ClosedStream {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            Err(io::Error::other("stream closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn formats_boot_state_line() {
        let snapshot = TraceSnapshot {
            pc: 0,
            bytes: [0x82, 0x00, 0x08],
            registers: [0, 0, 0, 0, 0, 0, 0, 0xF4],
        };

        assert_eq!(
            format_trace_line(&snapshot),
            "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4"
        );
    }

    #[test]
    fn formats_uppercase_two_digit_hex() {
        let snapshot = TraceSnapshot {
            pc: 0xAB,
            bytes: [0x0A, 0xFF, 0x01],
            registers: [0x0C, 1, 2, 3, 4, 5, 6, 0xEE],
        };

        assert_eq!(
            format_trace_line(&snapshot),
            "TRACE: AB | 0A FF 01 | 0C 01 02 03 04 05 06 EE"
        );
    }

    #[test]
    fn writer_prints_only_instruction_starts() {
        let snapshot = TraceSnapshot {
            pc: 3,
            bytes: [0x01, 0x00, 0x00],
            registers: [8, 0, 0, 0, 0, 0, 0, 0xF4],
        };
        let mut buffer: Vec<u8> = Vec::new();
        let mut writer = TraceWriter::new(&mut buffer);

        writer.on_event(TraceEvent::InstructionStart(snapshot));
        writer.on_event(TraceEvent::InstructionRetired { pc: 0, next_pc: 3 });
        writer.on_event(TraceEvent::Halted { pc: 3 });
        writer.on_event(TraceEvent::FaultRaised {
            cause: FaultCode::UnknownOpcode,
            pc: 3,
        });

        assert_eq!(
            String::from_utf8(buffer).expect("utf-8"),
            "TRACE: 03 | 01 00 00 | 08 00 00 00 00 00 00 F4\n"
        );
    }

    #[test]
    fn tracing_stops_after_the_first_write_error() {
        let snapshot = TraceSnapshot {
            pc: 0,
            bytes: [0x01, 0x00, 0x00],
            registers: [0, 0, 0, 0, 0, 0, 0, 0xF4],
        };
        let mut stream = ClosedStream { writes: 0 };
        let mut writer = TraceWriter::new(&mut stream);

        writer.on_event(TraceEvent::InstructionStart(snapshot));
        writer.on_event(TraceEvent::InstructionStart(snapshot));

        let error = writer.take_error().expect("write error is kept");
        assert_eq!(error.to_string(), "stream closed");
        assert_eq!(stream.writes, 1);
    }
}
