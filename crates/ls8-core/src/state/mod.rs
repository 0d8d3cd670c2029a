//! Machine state model primitives.

/// Register file types and storage model.
pub mod registers;
/// Run-loop state machine.
pub mod run_state;

pub use registers::{
    GeneralRegister, RegisterFile, FLAGS_ACTIVE_MASK, FLAGS_E, FLAGS_G, FLAGS_L,
    GENERAL_REGISTER_COUNT, SP_RESET_VALUE,
};
pub use run_state::RunState;
