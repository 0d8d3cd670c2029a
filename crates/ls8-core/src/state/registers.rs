/// Number of general-purpose registers (`R0..R7`).
pub const GENERAL_REGISTER_COUNT: usize = 8;
/// `FL` bit set when the last compare found `Ra == Rb`.
pub const FLAGS_E: u8 = 1 << 0;
/// `FL` bit set when the last compare found `Ra > Rb`.
pub const FLAGS_G: u8 = 1 << 1;
/// `FL` bit set when the last compare found `Ra < Rb`.
pub const FLAGS_L: u8 = 1 << 2;
/// Mask of the defined `FL` bits (`E/G/L`).
pub const FLAGS_ACTIVE_MASK: u8 = FLAGS_E | FLAGS_G | FLAGS_L;
/// Stack pointer value after reset. The stack grows down from here.
pub const SP_RESET_VALUE: u8 = 0xF4;

/// General-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl GeneralRegister {
    /// Register reserved as the stack pointer.
    pub const SP: Self = Self::R7;

    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes an instruction operand byte into a register.
    ///
    /// Operand bytes are full bytes, so anything above 7 is rejected rather
    /// than truncated.
    #[must_use]
    pub const fn from_operand(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }
}

/// Register file: `R0..R7` (with `R7` doubling as `SP`), `PC` and `FL`.
///
/// Every value is a `u8`, so each write is masked to 8 bits by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    gpr: [u8; GENERAL_REGISTER_COUNT],
    pc: u8,
    fl: u8,
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut gpr = [0; GENERAL_REGISTER_COUNT];
        gpr[GeneralRegister::SP.index()] = SP_RESET_VALUE;

        Self { gpr, pc: 0, fl: 0 }
    }
}

impl RegisterFile {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn get(&self, reg: GeneralRegister) -> u8 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set(&mut self, reg: GeneralRegister, value: u8) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the stack pointer (`R7`).
    #[must_use]
    pub const fn sp(&self) -> u8 {
        self.get(GeneralRegister::SP)
    }

    /// Writes the stack pointer (`R7`).
    pub const fn set_sp(&mut self, value: u8) {
        self.set(GeneralRegister::SP, value);
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u8 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u8) {
        self.pc = value;
    }

    /// Reads the `FL` register.
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.fl
    }

    /// Writes the `FL` register, dropping undefined bits.
    pub const fn set_flags(&mut self, value: u8) {
        self.fl = value & FLAGS_ACTIVE_MASK;
    }

    /// Returns `true` when a specific `FL` bit is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u8) -> bool {
        (self.fl & flag) != 0
    }

    /// Snapshot of `R0..R7` in register order.
    #[must_use]
    pub const fn registers(&self) -> [u8; GENERAL_REGISTER_COUNT] {
        self.gpr
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GeneralRegister, RegisterFile, FLAGS_ACTIVE_MASK, FLAGS_E, FLAGS_G, FLAGS_L,
        GENERAL_REGISTER_COUNT, SP_RESET_VALUE,
    };

    #[test]
    fn register_count_and_decode_match_architecture() {
        assert_eq!(GENERAL_REGISTER_COUNT, 8);

        for bits in 0_u8..=7 {
            let reg = GeneralRegister::from_operand(bits).expect("valid register operand");
            assert_eq!(reg.index(), usize::from(bits));
        }

        assert!(GeneralRegister::from_operand(8).is_none());
        assert!(GeneralRegister::from_operand(0xFF).is_none());
    }

    #[test]
    fn reset_values_match_boot_contract() {
        let regs = RegisterFile::default();

        assert_eq!(regs.pc(), 0);
        assert_eq!(regs.flags(), 0);
        assert_eq!(regs.sp(), SP_RESET_VALUE);
        assert_eq!(regs.registers(), [0, 0, 0, 0, 0, 0, 0, 0xF4]);
    }

    #[test]
    fn general_register_file_tracks_each_register_independently() {
        let mut regs = RegisterFile::default();

        for (offset, reg) in (0_u8..).zip(GeneralRegister::ALL.iter().copied()) {
            regs.set(reg, 0x10 + offset);
        }

        for (offset, reg) in (0_u8..).zip(GeneralRegister::ALL.iter().copied()) {
            assert_eq!(regs.get(reg), 0x10 + offset);
        }
    }

    #[test]
    fn sp_is_an_alias_for_r7() {
        let mut regs = RegisterFile::default();

        regs.set_sp(0x80);
        assert_eq!(regs.get(GeneralRegister::R7), 0x80);

        regs.set(GeneralRegister::R7, 0x42);
        assert_eq!(regs.sp(), 0x42);
    }

    #[test]
    fn flags_only_store_defined_bits() {
        let mut regs = RegisterFile::default();
        regs.set_flags(u8::MAX);

        assert_eq!(regs.flags(), FLAGS_ACTIVE_MASK);
        assert!(regs.flag_is_set(FLAGS_E));
        assert!(regs.flag_is_set(FLAGS_G));
        assert!(regs.flag_is_set(FLAGS_L));

        regs.set_flags(FLAGS_L);
        assert!(!regs.flag_is_set(FLAGS_E));
        assert!(!regs.flag_is_set(FLAGS_G));
        assert!(regs.flag_is_set(FLAGS_L));
    }
}
