//! Loader for the LS-8 program text format.
//!
//! A program file holds one byte per line, written as binary digits. A `#`
//! starts a comment that runs to the end of the line. Lines that are empty
//! once the comment is removed are skipped:
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ls8_core::MEMORY_BYTES;
use thiserror::Error;

/// Longest binary literal accepted on one line.
pub const MAX_LITERAL_DIGITS: usize = 8;

/// Failure to turn a program file into a memory image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The program file does not exist.
    #[error("program file not found: {}", path.display())]
    FileNotFound {
        /// Path that was opened.
        path: PathBuf,
    },
    /// The program file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying read failure.
        source: io::Error,
    },
    /// A line is not a binary literal of at most eight digits.
    #[error("line {line}: malformed instruction `{text}`")]
    MalformedLine {
        /// 1-indexed line number.
        line: usize,
        /// The offending line, comment included.
        text: String,
    },
    /// The program has more bytes than memory holds.
    #[error("program is {len} bytes but memory holds {max}", max = MEMORY_BYTES)]
    ProgramTooLarge {
        /// Number of bytes decoded from the file.
        len: usize,
    },
}

/// Decodes program text into the bytes to place at address 0.
///
/// Stops at the first malformed line.
///
/// # Errors
///
/// Returns [`LoadError::MalformedLine`] for a line that is not a binary
/// literal and [`LoadError::ProgramTooLarge`] when the decoded program does not
/// fit in memory.
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut program = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let code = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
        if code.is_empty() {
            continue;
        }

        let byte = parse_literal(code).ok_or_else(|| LoadError::MalformedLine {
            line: index + 1,
            text: raw.trim().to_string(),
        })?;
        program.push(byte);
    }

    if program.len() > MEMORY_BYTES {
        return Err(LoadError::ProgramTooLarge { len: program.len() });
    }

    Ok(program)
}

/// Reads and decodes the program file at `path`.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] when `path` does not exist,
/// [`LoadError::Io`] for any other read failure, and the errors of
/// [`parse_program`] for bad content.
pub fn load_program(path: &Path) -> Result<Vec<u8>, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_program(&source)
}

fn parse_literal(code: &str) -> Option<u8> {
    if code.len() > MAX_LITERAL_DIGITS || !code.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(code, 2).ok()
}
