//! FL update behaviors for different instruction classes.

/// Describes how `FL` should be updated after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change to `FL`.
    #[default]
    None,
    /// Replace `FL` with a compare result.
    Set(u8),
}
