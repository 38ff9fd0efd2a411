use crate::bus::{self, BusInterface};

/// The 13 addressing modes of the NMOS 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub enum AddressingMode {
    Accumulator,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Immediate,
    Implied,
    Indirect,
    /// Indexed indirect, `($nn,X)`
    IndirectX,
    /// Indirect indexed, `($nn),Y`
    IndirectY,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
}

impl AddressingMode {
    /// Number of operand bytes that follow the opcode byte.
    #[inline]
    #[must_use]
    pub const fn operand_bytes(self) -> u8 {
        match self {
            Self::Accumulator | Self::Implied => 0,
            Self::Immediate
            | Self::IndirectX
            | Self::IndirectY
            | Self::Relative
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// Whether an effective address computed in this mode can cross a page relative to its base
    /// address and thereby cost read instructions an extra cycle.
    #[inline]
    #[must_use]
    pub const fn can_cross_page(self) -> bool {
        matches!(self, Self::AbsoluteX | Self::AbsoluteY | Self::IndirectY)
    }
}

/// Snapshot of the X and Y index registers, supplied by the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct IndexRegisters {
    pub x: u8,
    pub y: u8,
}

impl IndexRegisters {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct ResolvedOperand {
    /// Effective address of the operand. `None` for Implied and Accumulator modes.
    ///
    /// For Immediate mode this is the address of the literal byte; for Relative mode it is the
    /// branch target.
    pub address: Option<u16>,
    /// Raw operand as it appears in the instruction stream (little-endian for 2-byte operands)
    pub operand: u16,
    pub operand_bytes: u8,
    pub page_crossed: bool,
}

impl ResolvedOperand {
    const NONE: Self = Self { address: None, operand: 0, operand_bytes: 0, page_crossed: false };

    fn one_byte(operand: u8, address: u16, page_crossed: bool) -> Self {
        Self { address: Some(address), operand: operand.into(), operand_bytes: 1, page_crossed }
    }

    fn two_byte(operand: u16, address: u16, page_crossed: bool) -> Self {
        Self { address: Some(address), operand, operand_bytes: 2, page_crossed }
    }
}

#[inline]
fn crosses_page(base: u16, address: u16) -> bool {
    base & 0xFF00 != address & 0xFF00
}

/// Compute the effective address for an instruction at `pc` using the given addressing mode.
///
/// Operand bytes are read starting at `pc + 1`. All address arithmetic wraps at 16 bits, and
/// zero page indexing and zero page pointer fetches wrap at 8 bits.
#[must_use]
pub fn resolve<B: BusInterface + ?Sized>(
    mode: AddressingMode,
    pc: u16,
    index: IndexRegisters,
    bus: &mut B,
) -> ResolvedOperand {
    let operand_address = pc.wrapping_add(1);

    match mode {
        AddressingMode::Accumulator | AddressingMode::Implied => ResolvedOperand::NONE,
        AddressingMode::Immediate => {
            let value = bus.read(operand_address);
            ResolvedOperand::one_byte(value, operand_address, false)
        }
        AddressingMode::ZeroPage => {
            let zero_page = bus.read(operand_address);
            ResolvedOperand::one_byte(zero_page, zero_page.into(), false)
        }
        AddressingMode::ZeroPageX => {
            let zero_page = bus.read(operand_address);
            ResolvedOperand::one_byte(zero_page, zero_page.wrapping_add(index.x).into(), false)
        }
        AddressingMode::ZeroPageY => {
            let zero_page = bus.read(operand_address);
            ResolvedOperand::one_byte(zero_page, zero_page.wrapping_add(index.y).into(), false)
        }
        AddressingMode::Absolute => {
            let address = bus::read_word(bus, operand_address);
            ResolvedOperand::two_byte(address, address, false)
        }
        AddressingMode::AbsoluteX => {
            let base = bus::read_word(bus, operand_address);
            let address = base.wrapping_add(index.x.into());
            ResolvedOperand::two_byte(base, address, crosses_page(base, address))
        }
        AddressingMode::AbsoluteY => {
            let base = bus::read_word(bus, operand_address);
            let address = base.wrapping_add(index.y.into());
            ResolvedOperand::two_byte(base, address, crosses_page(base, address))
        }
        AddressingMode::Indirect => {
            // NMOS bug: the pointer never carries into its high byte, so JMP ($xxFF) reads the
            // target's high byte from $xx00
            let pointer = bus::read_word(bus, operand_address);
            let address = bus::read_word_page_wrapped(bus, pointer);
            ResolvedOperand::two_byte(pointer, address, false)
        }
        AddressingMode::IndirectX => {
            let zero_page = bus.read(operand_address);
            let pointer = zero_page.wrapping_add(index.x);
            let address = bus::read_word_page_wrapped(bus, pointer.into());
            ResolvedOperand::one_byte(zero_page, address, false)
        }
        AddressingMode::IndirectY => {
            let zero_page = bus.read(operand_address);
            let base = bus::read_word_page_wrapped(bus, zero_page.into());
            let address = base.wrapping_add(index.y.into());
            ResolvedOperand::one_byte(zero_page, address, crosses_page(base, address))
        }
        AddressingMode::Relative => {
            let offset = bus.read(operand_address);
            let next_pc = pc.wrapping_add(2);
            let target = next_pc.wrapping_add_signed((offset as i8).into());
            ResolvedOperand::one_byte(offset, target, crosses_page(next_pc, target))
        }
    }
}
