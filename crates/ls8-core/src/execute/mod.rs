//! Instruction execution pipeline for the LS-8.
//!
//! Every instruction goes through the same sequence:
//! 1. Fetch the opcode byte at `PC` and the two bytes after it
//! 2. Decode the opcode, faulting on unknown bytes
//! 3. Read source registers and memory
//! 4. Compute the result, recording pending effects in an [`ExecuteState`]
//! 5. Commit memory, `SP`, destination register, `FL` and `PC`
//!
//! Faults are raised in steps 2 to 4, so a faulting instruction produces no
//! partial side effects.

mod flags;

pub use flags::FlagsUpdate;

use crate::alu::{self, AluOp, AluResult};
use crate::state::{GeneralRegister, RunState, FLAGS_E, FLAGS_G, FLAGS_L};
use crate::{
    CoreConfig, CoreState, FaultCode, Opcode, OutputSink, RunOutcome, StepOutcome, Termination,
    TraceEvent, TraceSink,
};

/// Instruction bytes read at `PC`.
///
/// Both operand bytes are always fetched, whether or not the opcode uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchedInstruction {
    /// Address the opcode was fetched from.
    pub pc: u8,
    /// Decoded opcode.
    pub opcode: Opcode,
    /// Byte at `PC + 1`.
    pub operand_a: u8,
    /// Byte at `PC + 2`.
    pub operand_b: u8,
}

/// Reads the instruction window at `PC` and decodes its opcode.
///
/// # Errors
///
/// Returns [`FaultCode::UnknownOpcode`] when the byte at `PC` is not in the
/// opcode table.
pub fn fetch(state: &CoreState) -> Result<FetchedInstruction, FaultCode> {
    let pc = state.registers.pc();
    let [opcode_byte, operand_a, operand_b] = state.memory.read_window(pc);
    let opcode = Opcode::decode(opcode_byte).ok_or(FaultCode::UnknownOpcode)?;

    Ok(FetchedInstruction {
        pc,
        opcode,
        operand_a,
        operand_b,
    })
}

/// Side effects accumulated by a handler, applied by [`commit_execution`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Destination register for a result.
    pub dest_reg: Option<GeneralRegister>,
    /// Value to write to the destination register.
    pub dest_value: Option<u8>,
    /// New stack pointer.
    pub next_sp: Option<u8>,
    /// Address for a memory write.
    pub memory_addr: Option<u8>,
    /// Value to write at `memory_addr`.
    pub memory_write_value: Option<u8>,
    /// `FL` update to apply.
    pub flags_update: FlagsUpdate,
    /// New `PC`. `None` leaves `PC` on the current instruction.
    pub next_pc: Option<u8>,
    /// Value printed by `PRN`.
    pub output_value: Option<u8>,
    /// Whether the machine halts after this instruction.
    pub halt: bool,
}

/// Runs the handler for `instr` against a read-only view of the machine.
///
/// # Errors
///
/// Returns the fault raised by the handler. No state has been modified when
/// this returns an error.
pub fn execute_instruction(
    instr: &FetchedInstruction,
    state: &CoreState,
    config: &CoreConfig,
) -> Result<ExecuteState, FaultCode> {
    let width = if instr.opcode.is_alu() {
        config.alu_stride.width(instr.opcode)
    } else {
        instr.opcode.width()
    };
    let next_pc = instr.pc.wrapping_add(width);
    let mut exec = ExecuteState::default();

    match instr.opcode {
        Opcode::Nop => execute_nop(&mut exec, next_pc),
        Opcode::Hlt => execute_halt(&mut exec),
        Opcode::Ldi => execute_ldi(instr, &mut exec, next_pc)?,
        Opcode::Prn => execute_prn(instr, state, &mut exec, next_pc)?,
        Opcode::Push => execute_push(instr, state, &mut exec, next_pc)?,
        Opcode::Pop => execute_pop(instr, state, &mut exec, next_pc)?,
        Opcode::Call => execute_call(instr, state, &mut exec, next_pc)?,
        Opcode::Ret => execute_ret(state, &mut exec),
        Opcode::Jmp => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Always)?,
        Opcode::Jeq => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Eq)?,
        Opcode::Jne => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Ne)?,
        Opcode::Jgt => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Gt)?,
        Opcode::Jlt => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Lt)?,
        Opcode::Jle => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Le)?,
        Opcode::Jge => execute_branch(instr, state, &mut exec, next_pc, BranchOp::Ge)?,
        Opcode::Add
        | Opcode::Sub
        | Opcode::Mul
        | Opcode::Div
        | Opcode::Mod
        | Opcode::Inc
        | Opcode::Dec
        | Opcode::Cmp
        | Opcode::And
        | Opcode::Not
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Shl
        | Opcode::Shr => execute_alu(instr, state, &mut exec, next_pc)?,
    }

    Ok(exec)
}

/// Applies the side effects recorded by a successful handler.
///
/// `SP` is committed before the destination register. Handlers that target
/// `R7` fold the stack adjustment into the value they record.
pub fn commit_execution(state: &mut CoreState, exec: &ExecuteState, output: &mut dyn OutputSink) {
    if let (Some(addr), Some(value)) = (exec.memory_addr, exec.memory_write_value) {
        state.memory.write(addr, value);
    }

    if let Some(sp) = exec.next_sp {
        state.registers.set_sp(sp);
    }

    if let (Some(dest), Some(value)) = (exec.dest_reg, exec.dest_value) {
        state.registers.set(dest, value);
    }

    match exec.flags_update {
        FlagsUpdate::None => {}
        FlagsUpdate::Set(flags) => state.registers.set_flags(flags),
    }

    if let Some(pc) = exec.next_pc {
        state.registers.set_pc(pc);
    }

    if let Some(value) = exec.output_value {
        output.emit(value);
    }
}

/// Executes exactly one instruction.
///
/// A machine that is already halted or faulted reports its terminal outcome
/// again without executing anything.
pub fn step_one(
    state: &mut CoreState,
    config: &CoreConfig,
    output: &mut dyn OutputSink,
) -> StepOutcome {
    if state.run_state.is_terminal() {
        return state
            .run_state
            .latched_fault()
            .map_or(StepOutcome::Halted, |cause| StepOutcome::Fault { cause });
    }

    let executed = fetch(state).and_then(|instr| {
        execute_instruction(&instr, state, config).map(|exec| (instr.opcode, exec))
    });

    match executed {
        Ok((opcode, exec)) => {
            commit_execution(state, &exec, output);
            if exec.halt {
                state.run_state = RunState::Halted;
                StepOutcome::Halted
            } else {
                StepOutcome::Retired { opcode }
            }
        }
        Err(cause) => {
            state.run_state = RunState::Faulted(cause);
            StepOutcome::Fault { cause }
        }
    }
}

/// Resets the register file and executes until halt, fault, or the host step
/// budget runs out. Memory is left as loaded.
pub fn run(
    state: &mut CoreState,
    config: &CoreConfig,
    output: &mut dyn OutputSink,
    trace: &mut dyn TraceSink,
) -> RunOutcome {
    let mut emit = |event| {
        if config.tracing_enabled {
            trace.on_event(event);
        }
    };

    state.reset_canonical();
    let mut steps = 0_u64;

    loop {
        if config.step_budget.is_some_and(|budget| steps >= budget) {
            return RunOutcome {
                steps,
                termination: Termination::BudgetExhausted,
            };
        }

        let pc = state.registers.pc();
        emit(TraceEvent::InstructionStart(state.trace_snapshot()));

        let outcome = step_one(state, config, output);
        steps += 1;

        let termination = match outcome {
            StepOutcome::Retired { .. } => {
                emit(TraceEvent::InstructionRetired {
                    pc,
                    next_pc: state.registers.pc(),
                });
                continue;
            }
            StepOutcome::Halted => {
                emit(TraceEvent::Halted { pc });
                Termination::Halted
            }
            StepOutcome::Fault { cause } => {
                emit(TraceEvent::FaultRaised { cause, pc });
                Termination::Faulted(cause)
            }
        };

        return RunOutcome { steps, termination };
    }
}

fn register_operand(byte: u8) -> Result<GeneralRegister, FaultCode> {
    GeneralRegister::from_operand(byte).ok_or(FaultCode::InvalidRegister)
}

fn execute_nop(exec: &mut ExecuteState, next_pc: u8) {
    exec.next_pc = Some(next_pc);
}

fn execute_halt(exec: &mut ExecuteState) {
    exec.halt = true;
}

fn execute_ldi(
    instr: &FetchedInstruction,
    exec: &mut ExecuteState,
    next_pc: u8,
) -> Result<(), FaultCode> {
    let rd = register_operand(instr.operand_a)?;

    exec.dest_reg = Some(rd);
    exec.dest_value = Some(instr.operand_b);
    exec.next_pc = Some(next_pc);
    Ok(())
}

fn execute_prn(
    instr: &FetchedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    next_pc: u8,
) -> Result<(), FaultCode> {
    let ra = register_operand(instr.operand_a)?;

    exec.output_value = Some(state.registers.get(ra));
    exec.next_pc = Some(next_pc);
    Ok(())
}

fn execute_push(
    instr: &FetchedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    next_pc: u8,
) -> Result<(), FaultCode> {
    let ra = register_operand(instr.operand_a)?;

    let sp = state.registers.sp().wrapping_sub(1);
    let value = if ra == GeneralRegister::SP {
        sp
    } else {
        state.registers.get(ra)
    };
    exec.next_sp = Some(sp);
    exec.memory_addr = Some(sp);
    exec.memory_write_value = Some(value);
    exec.next_pc = Some(next_pc);
    Ok(())
}

fn execute_pop(
    instr: &FetchedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    next_pc: u8,
) -> Result<(), FaultCode> {
    let rd = register_operand(instr.operand_a)?;

    let sp = state.registers.sp();
    let value = state.memory.read(sp);
    exec.dest_reg = Some(rd);
    if rd == GeneralRegister::SP {
        // The increment applies to the value just loaded into SP.
        exec.dest_value = Some(value.wrapping_add(1));
    } else {
        exec.dest_value = Some(value);
        exec.next_sp = Some(sp.wrapping_add(1));
    }
    exec.next_pc = Some(next_pc);
    Ok(())
}

fn execute_call(
    instr: &FetchedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    next_pc: u8,
) -> Result<(), FaultCode> {
    let ra = register_operand(instr.operand_a)?;

    let sp = state.registers.sp().wrapping_sub(1);
    let target = if ra == GeneralRegister::SP {
        sp
    } else {
        state.registers.get(ra)
    };
    exec.next_sp = Some(sp);
    exec.memory_addr = Some(sp);
    exec.memory_write_value = Some(next_pc);
    exec.next_pc = Some(target);
    Ok(())
}

fn execute_ret(state: &CoreState, exec: &mut ExecuteState) {
    let sp = state.registers.sp();
    exec.next_pc = Some(state.memory.read(sp));
    exec.next_sp = Some(sp.wrapping_add(1));
}

#[derive(Clone, Copy)]
enum BranchOp {
    Always,
    Eq,
    Ne,
    Gt,
    Lt,
    Le,
    Ge,
}

fn execute_branch(
    instr: &FetchedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    next_pc: u8,
    op: BranchOp,
) -> Result<(), FaultCode> {
    let ra = register_operand(instr.operand_a)?;

    let regs = &state.registers;
    let taken = match op {
        BranchOp::Always => true,
        BranchOp::Eq => regs.flag_is_set(FLAGS_E),
        BranchOp::Ne => !regs.flag_is_set(FLAGS_E),
        BranchOp::Gt => regs.flag_is_set(FLAGS_G),
        BranchOp::Lt => regs.flag_is_set(FLAGS_L),
        BranchOp::Le => regs.flag_is_set(FLAGS_L) || regs.flag_is_set(FLAGS_E),
        BranchOp::Ge => regs.flag_is_set(FLAGS_G) || regs.flag_is_set(FLAGS_E),
    };

    exec.next_pc = Some(if taken { regs.get(ra) } else { next_pc });
    Ok(())
}

fn execute_alu(
    instr: &FetchedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    next_pc: u8,
) -> Result<(), FaultCode> {
    let op = AluOp::from_opcode(instr.opcode).ok_or(FaultCode::UnsupportedAluOperation)?;

    let rd = register_operand(instr.operand_a)?;
    let reg_a = state.registers.get(rd);
    let reg_b = if op.is_unary() {
        0
    } else {
        state.registers.get(register_operand(instr.operand_b)?)
    };

    match alu::evaluate(op, reg_a, reg_b)? {
        AluResult::Value(value) => {
            exec.dest_reg = Some(rd);
            exec.dest_value = Some(value);
        }
        AluResult::Flags(flags) => exec.flags_update = FlagsUpdate::Set(flags),
    }

    exec.next_pc = Some(next_pc);
    Ok(())
}
