//! Public host-facing API contracts for embedding the emulator core.

use crate::state::{RegisterFile, RunState, GENERAL_REGISTER_COUNT};
use crate::{FaultCode, LoadImageError, Memory, Opcode};

/// How far `PC` advances after an ALU instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AluStride {
    /// Every ALU instruction is three bytes wide, unary ones included.
    #[default]
    Fixed,
    /// Width follows the operand count encoded in the opcode's top bits.
    Encoded,
}

impl AluStride {
    /// Instruction width for `opcode` under this policy.
    #[must_use]
    pub const fn width(self, opcode: Opcode) -> u8 {
        match self {
            Self::Fixed => 3,
            Self::Encoded => opcode.width(),
        }
    }
}

/// Top-level immutable configuration for a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// ALU instruction width policy.
    pub alu_stride: AluStride,
    /// Host-imposed upper bound on executed steps. `None` runs until a
    /// terminal state.
    pub step_budget: Option<u64>,
    /// Enables trace callback dispatch from [`run`](crate::run).
    pub tracing_enabled: bool,
}

/// Complete machine state: register file, memory and run state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// `R0..R7`, `PC` and `FL`.
    pub registers: RegisterFile,
    /// Flat 256-byte memory image.
    pub memory: Memory,
    /// Current execution state.
    pub run_state: RunState,
}

impl CoreState {
    /// Creates a machine with `image` loaded at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`LoadImageError::ProgramTooLarge`] when `image` exceeds memory.
    pub fn with_program(image: &[u8]) -> Result<Self, LoadImageError> {
        let mut state = Self::default();
        state.memory.load_image(image)?;
        Ok(state)
    }

    /// Restores boot register values and clears any terminal state.
    ///
    /// Memory is preserved so a loaded program can be re-run.
    pub fn reset_canonical(&mut self) {
        self.registers = RegisterFile::default();
        self.run_state = RunState::Running;
    }

    /// Captures the values the trace printer renders for the current cycle.
    #[must_use]
    pub fn trace_snapshot(&self) -> TraceSnapshot {
        let pc = self.registers.pc();
        TraceSnapshot {
            pc,
            bytes: self.memory.read_window(pc),
            registers: self.registers.registers(),
        }
    }
}

/// Machine view exposed to trace printers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceSnapshot {
    /// Program counter of the instruction about to execute.
    pub pc: u8,
    /// Bytes at `PC`, `PC+1` and `PC+2`.
    pub bytes: [u8; 3],
    /// `R0..R7` in order.
    pub registers: [u8; GENERAL_REGISTER_COUNT],
}

/// Output status from one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired and the machine keeps running.
    Retired {
        /// Opcode that retired.
        opcode: Opcode,
    },
    /// `HLT` retired, or the machine was already halted.
    Halted,
    /// Fault raised, or one was already latched.
    Fault {
        /// Canonical fault code.
        cause: FaultCode,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Program executed `HLT`.
    Halted,
    /// Program raised a fault.
    Faulted(FaultCode),
    /// The host step budget ran out before a terminal state.
    BudgetExhausted,
}

/// Aggregated outcome of [`run`](crate::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of instructions attempted, the terminating one included.
    pub steps: u64,
    /// Why the run stopped.
    pub termination: Termination,
}

/// Receiver for values emitted by `PRN`.
pub trait OutputSink {
    /// Records one printed register value.
    fn emit(&mut self, value: u8);
}

impl OutputSink for Vec<u8> {
    fn emit(&mut self, value: u8) {
        self.push(value);
    }
}

/// Trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Machine view before an instruction executes.
    InstructionStart(TraceSnapshot),
    /// Instruction retired without halting.
    InstructionRetired {
        /// Program counter the instruction was fetched from.
        pc: u8,
        /// Program counter after commit.
        next_pc: u8,
    },
    /// `HLT` retired.
    Halted {
        /// Program counter of the `HLT` instruction.
        pc: u8,
    },
    /// Fault emission event.
    FaultRaised {
        /// Canonical raised fault code.
        cause: FaultCode,
        /// Program counter active when the fault was observed.
        pc: u8,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Trace sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

#[cfg(test)]
mod tests {
    use super::{AluStride, CoreConfig, CoreState, OutputSink, TraceSnapshot};
    use crate::state::{GeneralRegister, RunState, SP_RESET_VALUE};
    use crate::{FaultCode, LoadImageError, Opcode, MEMORY_BYTES};

    #[test]
    fn default_core_config_runs_unbounded_without_tracing() {
        let config = CoreConfig::default();

        assert_eq!(config.alu_stride, AluStride::Fixed);
        assert_eq!(config.step_budget, None);
        assert!(!config.tracing_enabled);
    }

    #[test]
    fn alu_stride_widths() {
        assert_eq!(AluStride::Fixed.width(Opcode::Not), 3);
        assert_eq!(AluStride::Fixed.width(Opcode::Add), 3);
        assert_eq!(AluStride::Encoded.width(Opcode::Not), 2);
        assert_eq!(AluStride::Encoded.width(Opcode::Add), 3);
    }

    #[test]
    fn with_program_loads_image_at_address_zero() {
        let state = CoreState::with_program(&[0x82, 0x00, 0x2A, 0x01]).expect("image fits");

        assert_eq!(&state.memory.as_slice()[..4], &[0x82, 0x00, 0x2A, 0x01]);
        assert_eq!(state.registers.sp(), SP_RESET_VALUE);
        assert_eq!(state.run_state, RunState::Running);
    }

    #[test]
    fn with_program_rejects_oversized_image() {
        let image = vec![0; MEMORY_BYTES + 3];
        assert_eq!(
            CoreState::with_program(&image),
            Err(LoadImageError::ProgramTooLarge {
                len: MEMORY_BYTES + 3
            })
        );
    }

    #[test]
    fn canonical_reset_restores_registers_and_preserves_memory() {
        let mut state = CoreState::with_program(&[0xDE, 0xAD]).expect("image fits");
        state.registers.set(GeneralRegister::R3, 0x33);
        state.registers.set_sp(0x10);
        state.registers.set_pc(0x80);
        state.registers.set_flags(0x07);
        state.run_state = RunState::Faulted(FaultCode::UnknownOpcode);

        state.reset_canonical();

        assert_eq!(state.registers.get(GeneralRegister::R3), 0);
        assert_eq!(state.registers.sp(), SP_RESET_VALUE);
        assert_eq!(state.registers.pc(), 0);
        assert_eq!(state.registers.flags(), 0);
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(&state.memory.as_slice()[..2], &[0xDE, 0xAD]);
    }

    #[test]
    fn trace_snapshot_reports_pc_window_and_registers() {
        let mut state = CoreState::with_program(&[0x82, 0x00, 0x08, 0x47]).expect("image fits");
        state.registers.set(GeneralRegister::R1, 0x09);

        assert_eq!(
            state.trace_snapshot(),
            TraceSnapshot {
                pc: 0,
                bytes: [0x82, 0x00, 0x08],
                registers: [0, 0x09, 0, 0, 0, 0, 0, 0xF4],
            }
        );
    }

    #[test]
    fn vec_output_sink_collects_in_order() {
        let mut out: Vec<u8> = Vec::new();
        out.emit(1);
        out.emit(72);
        assert_eq!(out, vec![1, 72]);
    }
}
