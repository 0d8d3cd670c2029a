#![no_main]

use libfuzzer_sys::fuzz_target;
use ls8_core::{
    run, CoreConfig, CoreState, Opcode, RunState, Termination, TraceEvent, MEMORY_BYTES,
};

fuzz_target!(|data: &[u8]| {
    let image = &data[..data.len().min(MEMORY_BYTES)];
    let Ok(mut state) = CoreState::with_program(image) else {
        return;
    };

    let _ = Opcode::decode(image.first().copied().unwrap_or_default());

    let config = CoreConfig {
        step_budget: Some(4096),
        tracing_enabled: true,
        ..CoreConfig::default()
    };
    let mut out: Vec<u8> = Vec::new();
    let mut events: Vec<TraceEvent> = Vec::new();
    let outcome = run(&mut state, &config, &mut out, &mut events);

    match outcome.termination {
        Termination::Halted => assert_eq!(state.run_state, RunState::Halted),
        Termination::Faulted(cause) => assert_eq!(state.run_state, RunState::Faulted(cause)),
        Termination::BudgetExhausted => assert_eq!(state.run_state, RunState::Running),
    }
});
