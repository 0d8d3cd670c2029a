//! Stateless arithmetic, logic and compare operations.
//!
//! All results are taken modulo 256. The ALU never touches machine state
//! itself: it returns an [`AluResult`] that the execute pipeline commits.

use std::cmp::Ordering;

use crate::state::{FLAGS_E, FLAGS_G, FLAGS_L};
use crate::{FaultCode, Opcode};

/// ALU operation tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Cmp,
}

impl AluOp {
    /// Maps an opcode to its ALU operation. `None` for non-ALU opcodes.
    #[must_use]
    pub const fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Add => Some(Self::Add),
            Opcode::Sub => Some(Self::Sub),
            Opcode::Mul => Some(Self::Mul),
            Opcode::Div => Some(Self::Div),
            Opcode::Mod => Some(Self::Mod),
            Opcode::Inc => Some(Self::Inc),
            Opcode::Dec => Some(Self::Dec),
            Opcode::And => Some(Self::And),
            Opcode::Or => Some(Self::Or),
            Opcode::Xor => Some(Self::Xor),
            Opcode::Not => Some(Self::Not),
            Opcode::Shl => Some(Self::Shl),
            Opcode::Shr => Some(Self::Shr),
            Opcode::Cmp => Some(Self::Cmp),
            Opcode::Nop
            | Opcode::Hlt
            | Opcode::Ret
            | Opcode::Push
            | Opcode::Pop
            | Opcode::Prn
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Jeq
            | Opcode::Jne
            | Opcode::Jgt
            | Opcode::Jlt
            | Opcode::Jle
            | Opcode::Jge
            | Opcode::Ldi => None,
        }
    }

    /// Returns `true` for operations that only read `Ra`.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::Inc | Self::Dec | Self::Not)
    }
}

/// Value produced by one ALU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluResult {
    /// New value for `Ra`.
    Value(u8),
    /// New `FL` contents; registers are left alone.
    Flags(u8),
}

/// Evaluates `op` over the current values of `Ra` and `Rb`.
///
/// # Errors
///
/// Returns [`FaultCode::DivisionByZero`] for `DIV`/`MOD` with `b == 0`.
pub fn evaluate(op: AluOp, a: u8, b: u8) -> Result<AluResult, FaultCode> {
    let value = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a.checked_div(b).ok_or(FaultCode::DivisionByZero)?,
        AluOp::Mod => a.checked_rem(b).ok_or(FaultCode::DivisionByZero)?,
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Not => !a,
        AluOp::Shl => a.checked_shl(u32::from(b)).unwrap_or(0),
        AluOp::Shr => a.checked_shr(u32::from(b)).unwrap_or(0),
        AluOp::Cmp => return Ok(AluResult::Flags(compare_flags(a, b))),
    };

    Ok(AluResult::Value(value))
}

/// `FL` contents after comparing `a` with `b`: exactly one of `E/G/L`.
#[must_use]
pub fn compare_flags(a: u8, b: u8) -> u8 {
    match a.cmp(&b) {
        Ordering::Less => FLAGS_L,
        Ordering::Equal => FLAGS_E,
        Ordering::Greater => FLAGS_G,
    }
}
