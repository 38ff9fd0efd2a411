use crate::addressing::AddressingMode;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;


/// The fetched byte does not correspond to any documented NMOS 6502 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown opcode ${0:02X}")]
pub struct UnknownOpcode(pub u8);

macro_rules! define_mnemonics {
    ($($variant:ident => $name:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
        pub enum Mnemonic {
            $($variant,)*
        }

        impl Mnemonic {
            #[cfg(test)]
            pub(crate) const ALL: &[Self] = &[$(Self::$variant,)*];

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

define_mnemonics! {
    Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC",
    Bcs => "BCS", Beq => "BEQ", Bit => "BIT", Bmi => "BMI",
    Bne => "BNE", Bpl => "BPL", Brk => "BRK", Bvc => "BVC",
    Bvs => "BVS", Clc => "CLC", Cld => "CLD", Cli => "CLI",
    Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
    Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR",
    Inc => "INC", Inx => "INX", Iny => "INY", Jmp => "JMP",
    Jsr => "JSR", Lda => "LDA", Ldx => "LDX", Ldy => "LDY",
    Lsr => "LSR", Nop => "NOP", Ora => "ORA", Pha => "PHA",
    Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
    Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC",
    Sec => "SEC", Sed => "SED", Sei => "SEI", Sta => "STA",
    Stx => "STX", Sty => "STY", Tax => "TAX", Tay => "TAY",
    Tsx => "TSX", Txa => "TXA", Txs => "TXS", Tya => "TYA",
}

impl Mnemonic {
    /// Conditional branches, whose cycle count depends on whether the branch is taken.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Bpl
                | Self::Bmi
                | Self::Bvc
                | Self::Bvs
                | Self::Bcc
                | Self::Bcs
                | Self::Bne
                | Self::Beq
        )
    }

    /// Instructions that only read their operand. These finish a cycle early when an indexed
    /// address does not cross a page; stores and read-modify-write instructions always take the
    /// longer path, which is already included in their base cycle count.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            Self::Adc
                | Self::And
                | Self::Bit
                | Self::Cmp
                | Self::Cpx
                | Self::Cpy
                | Self::Eor
                | Self::Lda
                | Self::Ldx
                | Self::Ldy
                | Self::Ora
                | Self::Sbc
        )
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static decode metadata for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct InstructionSpec {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Instruction length in bytes, including the opcode
    pub size: u8,
    /// Cycle count excluding page crossing and branch penalties. For branches this is the
    /// not-taken cost.
    pub base_cycles: u8,
}

impl InstructionSpec {
    #[inline]
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        self.mnemonic.is_branch()
    }

    /// Whether crossing a page while computing the effective address costs an extra cycle.
    #[inline]
    #[must_use]
    pub const fn has_page_cross_penalty(&self) -> bool {
        self.mnemonic.is_read() && self.mode.can_cross_page()
    }
}

macro_rules! opcode_table {
    ($($opcode:literal => $mnemonic:ident, $mode:ident, $size:literal, $cycles:literal;)*) => {{
        let mut table: [Option<InstructionSpec>; 256] = [None; 256];
        $(
            table[$opcode] = Some(InstructionSpec {
                mnemonic: Mnemonic::$mnemonic,
                mode: AddressingMode::$mode,
                size: $size,
                base_cycles: $cycles,
            });
        )*
        table
    }};
}

// Documented NMOS 6502 opcodes only; every other byte is an unknown opcode
static OPCODE_TABLE: [Option<InstructionSpec>; 256] = opcode_table! {
    0x00 => Brk, Implied, 1, 7;
    0x01 => Ora, IndirectX, 2, 6;
    0x05 => Ora, ZeroPage, 2, 3;
    0x06 => Asl, ZeroPage, 2, 5;
    0x08 => Php, Implied, 1, 3;
    0x09 => Ora, Immediate, 2, 2;
    0x0A => Asl, Accumulator, 1, 2;
    0x0D => Ora, Absolute, 3, 4;
    0x0E => Asl, Absolute, 3, 6;

    0x10 => Bpl, Relative, 2, 2;
    0x11 => Ora, IndirectY, 2, 5;
    0x15 => Ora, ZeroPageX, 2, 4;
    0x16 => Asl, ZeroPageX, 2, 6;
    0x18 => Clc, Implied, 1, 2;
    0x19 => Ora, AbsoluteY, 3, 4;
    0x1D => Ora, AbsoluteX, 3, 4;
    0x1E => Asl, AbsoluteX, 3, 7;

    0x20 => Jsr, Absolute, 3, 6;
    0x21 => And, IndirectX, 2, 6;
    0x24 => Bit, ZeroPage, 2, 3;
    0x25 => And, ZeroPage, 2, 3;
    0x26 => Rol, ZeroPage, 2, 5;
    0x28 => Plp, Implied, 1, 4;
    0x29 => And, Immediate, 2, 2;
    0x2A => Rol, Accumulator, 1, 2;
    0x2C => Bit, Absolute, 3, 4;
    0x2D => And, Absolute, 3, 4;
    0x2E => Rol, Absolute, 3, 6;

    0x30 => Bmi, Relative, 2, 2;
    0x31 => And, IndirectY, 2, 5;
    0x35 => And, ZeroPageX, 2, 4;
    0x36 => Rol, ZeroPageX, 2, 6;
    0x38 => Sec, Implied, 1, 2;
    0x39 => And, AbsoluteY, 3, 4;
    0x3D => And, AbsoluteX, 3, 4;
    0x3E => Rol, AbsoluteX, 3, 7;

    0x40 => Rti, Implied, 1, 6;
    0x41 => Eor, IndirectX, 2, 6;
    0x45 => Eor, ZeroPage, 2, 3;
    0x46 => Lsr, ZeroPage, 2, 5;
    0x48 => Pha, Implied, 1, 3;
    0x49 => Eor, Immediate, 2, 2;
    0x4A => Lsr, Accumulator, 1, 2;
    0x4C => Jmp, Absolute, 3, 3;
    0x4D => Eor, Absolute, 3, 4;
    0x4E => Lsr, Absolute, 3, 6;

    0x50 => Bvc, Relative, 2, 2;
    0x51 => Eor, IndirectY, 2, 5;
    0x55 => Eor, ZeroPageX, 2, 4;
    0x56 => Lsr, ZeroPageX, 2, 6;
    0x58 => Cli, Implied, 1, 2;
    0x59 => Eor, AbsoluteY, 3, 4;
    0x5D => Eor, AbsoluteX, 3, 4;
    0x5E => Lsr, AbsoluteX, 3, 7;

    0x60 => Rts, Implied, 1, 6;
    0x61 => Adc, IndirectX, 2, 6;
    0x65 => Adc, ZeroPage, 2, 3;
    0x66 => Ror, ZeroPage, 2, 5;
    0x68 => Pla, Implied, 1, 4;
    0x69 => Adc, Immediate, 2, 2;
    0x6A => Ror, Accumulator, 1, 2;
    0x6C => Jmp, Indirect, 3, 5;
    0x6D => Adc, Absolute, 3, 4;
    0x6E => Ror, Absolute, 3, 6;

    0x70 => Bvs, Relative, 2, 2;
    0x71 => Adc, IndirectY, 2, 5;
    0x75 => Adc, ZeroPageX, 2, 4;
    0x76 => Ror, ZeroPageX, 2, 6;
    0x78 => Sei, Implied, 1, 2;
    0x79 => Adc, AbsoluteY, 3, 4;
    0x7D => Adc, AbsoluteX, 3, 4;
    0x7E => Ror, AbsoluteX, 3, 7;

    0x81 => Sta, IndirectX, 2, 6;
    0x84 => Sty, ZeroPage, 2, 3;
    0x85 => Sta, ZeroPage, 2, 3;
    0x86 => Stx, ZeroPage, 2, 3;
    0x88 => Dey, Implied, 1, 2;
    0x8A => Txa, Implied, 1, 2;
    0x8C => Sty, Absolute, 3, 4;
    0x8D => Sta, Absolute, 3, 4;
    0x8E => Stx, Absolute, 3, 4;

    0x90 => Bcc, Relative, 2, 2;
    0x91 => Sta, IndirectY, 2, 6;
    0x94 => Sty, ZeroPageX, 2, 4;
    0x95 => Sta, ZeroPageX, 2, 4;
    0x96 => Stx, ZeroPageY, 2, 4;
    0x98 => Tya, Implied, 1, 2;
    0x99 => Sta, AbsoluteY, 3, 5;
    0x9A => Txs, Implied, 1, 2;
    0x9D => Sta, AbsoluteX, 3, 5;

    0xA0 => Ldy, Immediate, 2, 2;
    0xA1 => Lda, IndirectX, 2, 6;
    0xA2 => Ldx, Immediate, 2, 2;
    0xA4 => Ldy, ZeroPage, 2, 3;
    0xA5 => Lda, ZeroPage, 2, 3;
    0xA6 => Ldx, ZeroPage, 2, 3;
    0xA8 => Tay, Implied, 1, 2;
    0xA9 => Lda, Immediate, 2, 2;
    0xAA => Tax, Implied, 1, 2;
    0xAC => Ldy, Absolute, 3, 4;
    0xAD => Lda, Absolute, 3, 4;
    0xAE => Ldx, Absolute, 3, 4;

    0xB0 => Bcs, Relative, 2, 2;
    0xB1 => Lda, IndirectY, 2, 5;
    0xB4 => Ldy, ZeroPageX, 2, 4;
    0xB5 => Lda, ZeroPageX, 2, 4;
    0xB6 => Ldx, ZeroPageY, 2, 4;
    0xB8 => Clv, Implied, 1, 2;
    0xB9 => Lda, AbsoluteY, 3, 4;
    0xBA => Tsx, Implied, 1, 2;
    0xBC => Ldy, AbsoluteX, 3, 4;
    0xBD => Lda, AbsoluteX, 3, 4;
    0xBE => Ldx, AbsoluteY, 3, 4;

    0xC0 => Cpy, Immediate, 2, 2;
    0xC1 => Cmp, IndirectX, 2, 6;
    0xC4 => Cpy, ZeroPage, 2, 3;
    0xC5 => Cmp, ZeroPage, 2, 3;
    0xC6 => Dec, ZeroPage, 2, 5;
    0xC8 => Iny, Implied, 1, 2;
    0xC9 => Cmp, Immediate, 2, 2;
    0xCA => Dex, Implied, 1, 2;
    0xCC => Cpy, Absolute, 3, 4;
    0xCD => Cmp, Absolute, 3, 4;
    0xCE => Dec, Absolute, 3, 6;

    0xD0 => Bne, Relative, 2, 2;
    0xD1 => Cmp, IndirectY, 2, 5;
    0xD5 => Cmp, ZeroPageX, 2, 4;
    0xD6 => Dec, ZeroPageX, 2, 6;
    0xD8 => Cld, Implied, 1, 2;
    0xD9 => Cmp, AbsoluteY, 3, 4;
    0xDD => Cmp, AbsoluteX, 3, 4;
    0xDE => Dec, AbsoluteX, 3, 7;

    0xE0 => Cpx, Immediate, 2, 2;
    0xE1 => Sbc, IndirectX, 2, 6;
    0xE4 => Cpx, ZeroPage, 2, 3;
    0xE5 => Sbc, ZeroPage, 2, 3;
    0xE6 => Inc, ZeroPage, 2, 5;
    0xE8 => Inx, Implied, 1, 2;
    0xE9 => Sbc, Immediate, 2, 2;
    0xEA => Nop, Implied, 1, 2;
    0xEC => Cpx, Absolute, 3, 4;
    0xED => Sbc, Absolute, 3, 4;
    0xEE => Inc, Absolute, 3, 6;

    0xF0 => Beq, Relative, 2, 2;
    0xF1 => Sbc, IndirectY, 2, 5;
    0xF5 => Sbc, ZeroPageX, 2, 4;
    0xF6 => Inc, ZeroPageX, 2, 6;
    0xF8 => Sed, Implied, 1, 2;
    0xF9 => Sbc, AbsoluteY, 3, 4;
    0xFD => Sbc, AbsoluteX, 3, 4;
    0xFE => Inc, AbsoluteX, 3, 7;
};

/// Look up the decode metadata for an opcode.
///
/// # Errors
///
/// Returns [`UnknownOpcode`] for any opcode that is not a documented NMOS 6502 instruction.
#[inline]
pub fn lookup(opcode: u8) -> Result<&'static InstructionSpec, UnknownOpcode> {
    OPCODE_TABLE[opcode as usize].as_ref().ok_or(UnknownOpcode(opcode))
}

/// Iterate over every documented opcode in ascending order.
pub fn documented_opcodes() -> impl Iterator<Item = (u8, &'static InstructionSpec)> {
    (0..=u8::MAX).filter_map(|opcode| lookup(opcode).ok().map(|spec| (opcode, spec)))
}
