use std::fmt;

use thiserror::Error;

/// Fault classes used to label diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// The opcode byte could not be decoded into a known instruction.
    Decode,
    /// A decoded instruction could not complete.
    Execute,
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => write!(f, "decode"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Stable fault taxonomy for the execution engine.
///
/// Every fault is terminal: the run loop latches it into
/// [`RunState::Faulted`](crate::RunState::Faulted) and executes nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Opcode byte is not present in the opcode table.
    #[error("unknown opcode")]
    UnknownOpcode = 0x01,
    /// Opcode is routed to the ALU but has no ALU operation mapping.
    #[error("unsupported alu operation")]
    UnsupportedAluOperation = 0x02,
    /// `DIV` or `MOD` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero = 0x03,
    /// Register operand byte outside `0..=7`.
    #[error("register operand out of range")]
    InvalidRegister = 0x04,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnknownOpcode => FaultClass::Decode,
            Self::UnsupportedAluOperation | Self::DivisionByZero | Self::InvalidRegister => {
                FaultClass::Execute
            }
        }
    }
}
