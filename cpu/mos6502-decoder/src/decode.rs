use crate::addressing::{self, IndexRegisters, ResolvedOperand};
use crate::bus::BusInterface;
use crate::disassemble;
use crate::opcodes::{self, InstructionSpec, UnknownOpcode};

/// A fully resolved instruction, produced fresh on every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct DecodedInstruction {
    /// Address of the opcode byte
    pub pc: u16,
    pub opcode: u8,
    pub spec: InstructionSpec,
    pub operand: ResolvedOperand,
    /// Base cycles plus any branch-taken and page crossing penalties
    pub total_cycles: u8,
}

impl DecodedInstruction {
    /// Effective operand address, or `None` for Implied and Accumulator instructions.
    #[inline]
    #[must_use]
    pub fn address(&self) -> Option<u16> {
        self.operand.address
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> u8 {
        self.spec.size
    }

    /// Address of the instruction that sequentially follows this one.
    #[inline]
    #[must_use]
    pub fn next_pc(&self) -> u16 {
        self.pc.wrapping_add(self.spec.size.into())
    }
}

fn extra_cycles(spec: &InstructionSpec, operand: &ResolvedOperand, branch_taken: bool) -> u8 {
    if spec.is_branch() {
        // Taken branches cost 1 extra cycle, 2 if the target is in a different page than the
        // next instruction
        if branch_taken { 1 + u8::from(operand.page_crossed) } else { 0 }
    } else {
        u8::from(operand.page_crossed && spec.has_page_cross_penalty())
    }
}

/// Decode the instruction at `pc`.
///
/// `index` supplies the current X and Y registers for indexed addressing. `branch_taken` is the
/// outcome of the branch condition evaluated against the current status flags; it is ignored for
/// anything other than a conditional branch.
///
/// # Errors
///
/// Returns [`UnknownOpcode`] if the byte at `pc` is not a documented opcode. No operand bytes are
/// read in that case.
pub fn decode<B: BusInterface + ?Sized>(
    bus: &mut B,
    pc: u16,
    index: IndexRegisters,
    branch_taken: bool,
) -> Result<DecodedInstruction, UnknownOpcode> {
    let opcode = bus.read(pc);
    let spec = *opcodes::lookup(opcode)?;
    let operand = addressing::resolve(spec.mode, pc, index, bus);
    let total_cycles = spec.base_cycles + extra_cycles(&spec, &operand, branch_taken);

    let instruction = DecodedInstruction { pc, opcode, spec, operand, total_cycles };

    if log::log_enabled!(log::Level::Trace) {
        let instr_name = disassemble::instruction_str(opcode);
        log::trace!(
            "Decoded opcode from PC={pc:04X}: {opcode:02X} ({instr_name}) '{instruction}'; \
             X={:02X}, Y={:02X}, taken={}, cycles={total_cycles}",
            index.x,
            index.y,
            u8::from(branch_taken)
        );
    }

    Ok(instruction)
}
