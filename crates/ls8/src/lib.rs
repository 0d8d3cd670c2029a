//! Host-side tooling for the LS-8 emulator.
//!
//! The core crate only sees a byte image and a pair of sinks; this crate
//! turns program files into images and renders what the core emits.

/// Program file parsing and loading.
pub mod loader;
/// `PRN` output rendering.
pub mod output;
/// Trace line formatting and the trace writer.
pub mod trace;
