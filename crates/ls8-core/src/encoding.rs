/// Opcode bit marking operations routed through the ALU.
pub const ALU_BIT: u8 = 0b0010_0000;
/// Shift of the two-bit operand-count field at the top of the opcode.
pub const OPERAND_COUNT_SHIFT: u8 = 6;

/// Assigned LS-8 opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Nop = 0x00,
    Hlt = 0x01,
    Ret = 0x11,
    Push = 0x45,
    Pop = 0x46,
    Prn = 0x47,
    Call = 0x50,
    Jmp = 0x54,
    Jeq = 0x55,
    Jne = 0x56,
    Jgt = 0x57,
    Jlt = 0x58,
    Jle = 0x59,
    Jge = 0x5A,
    Inc = 0x65,
    Dec = 0x66,
    Not = 0x69,
    Ldi = 0x82,
    Add = 0xA0,
    Sub = 0xA1,
    Mul = 0xA2,
    Div = 0xA3,
    Mod = 0xA4,
    Cmp = 0xA7,
    And = 0xA8,
    Or = 0xAA,
    Xor = 0xAB,
    Shl = 0xAC,
    Shr = 0xAD,
}

/// Single source-of-truth opcode table: `(byte, opcode, mnemonic)`.
///
/// Any byte not present here is an unknown opcode by definition.
pub const OPCODE_TABLE: &[(u8, Opcode, &str)] = &[
    (0x00, Opcode::Nop, "NOP"),
    (0x01, Opcode::Hlt, "HLT"),
    (0x11, Opcode::Ret, "RET"),
    (0x45, Opcode::Push, "PUSH"),
    (0x46, Opcode::Pop, "POP"),
    (0x47, Opcode::Prn, "PRN"),
    (0x50, Opcode::Call, "CALL"),
    (0x54, Opcode::Jmp, "JMP"),
    (0x55, Opcode::Jeq, "JEQ"),
    (0x56, Opcode::Jne, "JNE"),
    (0x57, Opcode::Jgt, "JGT"),
    (0x58, Opcode::Jlt, "JLT"),
    (0x59, Opcode::Jle, "JLE"),
    (0x5A, Opcode::Jge, "JGE"),
    (0x65, Opcode::Inc, "INC"),
    (0x66, Opcode::Dec, "DEC"),
    (0x69, Opcode::Not, "NOT"),
    (0x82, Opcode::Ldi, "LDI"),
    (0xA0, Opcode::Add, "ADD"),
    (0xA1, Opcode::Sub, "SUB"),
    (0xA2, Opcode::Mul, "MUL"),
    (0xA3, Opcode::Div, "DIV"),
    (0xA4, Opcode::Mod, "MOD"),
    (0xA7, Opcode::Cmp, "CMP"),
    (0xA8, Opcode::And, "AND"),
    (0xAA, Opcode::Or, "OR"),
    (0xAB, Opcode::Xor, "XOR"),
    (0xAC, Opcode::Shl, "SHL"),
    (0xAD, Opcode::Shr, "SHR"),
];

impl Opcode {
    /// Decodes an opcode byte. `None` means unknown opcode.
    #[must_use]
    pub fn decode(byte: u8) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .find_map(|(entry_byte, opcode, _)| (*entry_byte == byte).then_some(*opcode))
    }

    /// Returns the opcode byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the assembler mnemonic.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find_map(|(_, opcode, mnemonic)| (*opcode == self).then_some(*mnemonic))
            .unwrap_or("???")
    }

    /// Number of operand bytes, from the top two opcode bits.
    #[must_use]
    pub const fn operand_count(self) -> u8 {
        self.as_u8() >> OPERAND_COUNT_SHIFT
    }

    /// Instruction width in bytes (opcode plus operands).
    #[must_use]
    pub const fn width(self) -> u8 {
        1 + self.operand_count()
    }

    /// Returns `true` for opcodes routed through the ALU.
    #[must_use]
    pub const fn is_alu(self) -> bool {
        (self.as_u8() & ALU_BIT) != 0
    }
}
