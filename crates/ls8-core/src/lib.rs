//! Core emulator crate for the LS-8 8-bit register machine.

/// Flat 256-byte memory store.
pub mod memory;
pub use memory::{LoadImageError, Memory, MEMORY_BYTES};

/// Register file and run-state model primitives.
pub mod state;
pub use state::{
    GeneralRegister, RegisterFile, RunState, FLAGS_ACTIVE_MASK, FLAGS_E, FLAGS_G, FLAGS_L,
    GENERAL_REGISTER_COUNT, SP_RESET_VALUE,
};

/// Fault taxonomy for decode and execute failures.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Opcode table and encoding-bit helpers.
pub mod encoding;
pub use encoding::{Opcode, ALU_BIT, OPCODE_TABLE, OPERAND_COUNT_SHIFT};

/// Arithmetic/logic unit.
pub mod alu;
pub use alu::{compare_flags, evaluate, AluOp, AluResult};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    AluStride, CoreConfig, CoreState, NoTrace, OutputSink, RunOutcome, StepOutcome, Termination,
    TraceEvent, TraceSink, TraceSnapshot,
};

/// Fetch/decode/execute pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, fetch, run, step_one, ExecuteState, FetchedInstruction,
    FlagsUpdate,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
