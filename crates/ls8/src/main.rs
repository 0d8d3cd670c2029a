//! CLI entry point for the LS-8 emulator binary.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use ls8::loader::{load_program, LoadError};
use ls8::output::DecimalLines;
use ls8::trace::TraceWriter;
use ls8_core::{run, AluStride, CoreConfig, CoreState, FaultCode, Opcode, Termination};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: ls8 [options] <program>

Runs an LS-8 program file (one binary byte per line, `#` comments).

Options:
  -t, --trace                 Print a TRACE line to stderr before every instruction
      --max-steps <n>         Stop after <n> instructions (exit code 4)
      --alu-stride <policy>   ALU instruction width: fixed (default) or encoded
  -h, --help                  Show this help message

Exit codes:
  0   program halted
  1   program faulted
  2   program file not found
  3   program file unreadable, malformed or too large
  4   step budget exhausted
  64  invalid command line

Examples:
  ls8 programs/mult.ls8
  ls8 --trace --max-steps 1000 programs/call.ls8
";

const EXIT_HALTED: i32 = 0;
const EXIT_FAULTED: i32 = 1;
const EXIT_FILE_NOT_FOUND: i32 = 2;
const EXIT_BAD_PROGRAM: i32 = 3;
const EXIT_BUDGET_EXHAUSTED: i32 = 4;
const EXIT_USAGE: i32 = 64;

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    program: PathBuf,
    trace: bool,
    max_steps: Option<u64>,
    alu_stride: AluStride,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut program: Option<PathBuf> = None;
    let mut trace = false;
    let mut max_steps: Option<u64> = None;
    let mut alu_stride = AluStride::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--trace" || arg == "-t" {
            trace = true;
            continue;
        }

        if arg == "--max-steps" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-steps".to_string())?;
            max_steps = Some(parse_max_steps(&value.to_string_lossy())?);
            continue;
        }

        if arg == "--alu-stride" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --alu-stride".to_string())?;
            alu_stride = parse_alu_stride(&value.to_string_lossy())?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if program.is_some() {
            return Err("multiple program paths provided".to_string());
        }
        program = Some(PathBuf::from(arg));
    }

    let program = program.ok_or_else(|| "missing program path".to_string())?;
    Ok(ParseResult::Run(RunArgs {
        program,
        trace,
        max_steps,
        alu_stride,
    }))
}

fn parse_max_steps(value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value for --max-steps: {value}"))
}

fn parse_alu_stride(value: &str) -> Result<AluStride, String> {
    match value {
        "fixed" => Ok(AluStride::Fixed),
        "encoded" => Ok(AluStride::Encoded),
        other => Err(format!(
            "invalid value for --alu-stride: {other} (expected fixed or encoded)"
        )),
    }
}

const fn core_config(args: &RunArgs) -> CoreConfig {
    CoreConfig {
        alu_stride: args.alu_stride,
        step_budget: args.max_steps,
        tracing_enabled: args.trace,
    }
}

const fn load_error_exit_code(error: &LoadError) -> i32 {
    match error {
        LoadError::FileNotFound { .. } => EXIT_FILE_NOT_FOUND,
        LoadError::Io { .. }
        | LoadError::MalformedLine { .. }
        | LoadError::ProgramTooLarge { .. } => EXIT_BAD_PROGRAM,
    }
}

const fn termination_exit_code(termination: Termination) -> i32 {
    match termination {
        Termination::Halted => EXIT_HALTED,
        Termination::Faulted(_) => EXIT_FAULTED,
        Termination::BudgetExhausted => EXIT_BUDGET_EXHAUSTED,
    }
}

fn fault_message(cause: FaultCode, state: &CoreState) -> String {
    let pc = state.registers.pc();
    let byte = state.memory.read(pc);
    let header = format!("{} fault 0x{:02X}: {cause}", cause.class(), cause.as_u8());
    match (cause, Opcode::decode(byte)) {
        (FaultCode::UnknownOpcode, _) => format!("{header} 0x{byte:02X} at pc 0x{pc:02X}"),
        (_, Some(opcode)) => format!("{header} in {} at pc 0x{pc:02X}", opcode.mnemonic()),
        (_, None) => format!("{header} at pc 0x{pc:02X}"),
    }
}

fn run_program(args: &RunArgs) -> i32 {
    let image = match load_program(&args.program) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("error: {e}");
            return load_error_exit_code(&e);
        }
    };

    let mut state = match CoreState::with_program(&image) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_BAD_PROGRAM;
        }
    };

    let config = core_config(args);
    let mut output = DecimalLines::new(io::stdout().lock());
    let mut trace = TraceWriter::new(io::stderr().lock());
    let outcome = run(&mut state, &config, &mut output, &mut trace);

    if let Some(e) = output.take_error().or_else(|| trace.take_error()) {
        eprintln!("error: failed to write output: {e}");
    }

    match outcome.termination {
        Termination::Halted => {}
        Termination::Faulted(cause) => eprintln!("error: {}", fault_message(cause, &state)),
        Termination::BudgetExhausted => {
            eprintln!("error: step budget exhausted after {} steps", outcome.steps);
        }
    }

    termination_exit_code(outcome.termination)
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            EXIT_HALTED
        }
        Ok(ParseResult::Run(args)) => run_program(&args),
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            EXIT_USAGE
        }
    };

    std::process::exit(exit_code);
}
