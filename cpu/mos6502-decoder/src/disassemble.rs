use crate::addressing::AddressingMode;
use crate::decode::DecodedInstruction;
use crate::opcodes;
use std::fmt::{self, Display, Formatter};

/// Mnemonic for an opcode, or "???" for unknown opcodes.
#[must_use]
pub fn instruction_str(opcode: u8) -> &'static str {
    opcodes::lookup(opcode).map_or("???", |spec| spec.mnemonic.name())
}

impl Display for DecodedInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mnemonic = self.spec.mnemonic;
        let operand = self.operand.operand;

        match self.spec.mode {
            AddressingMode::Implied => write!(f, "{mnemonic}"),
            AddressingMode::Accumulator => write!(f, "{mnemonic} A"),
            AddressingMode::Immediate => write!(f, "{mnemonic} #${operand:02X}"),
            AddressingMode::ZeroPage => write!(f, "{mnemonic} ${operand:02X}"),
            AddressingMode::ZeroPageX => write!(f, "{mnemonic} ${operand:02X},X"),
            AddressingMode::ZeroPageY => write!(f, "{mnemonic} ${operand:02X},Y"),
            AddressingMode::Absolute => write!(f, "{mnemonic} ${operand:04X}"),
            AddressingMode::AbsoluteX => write!(f, "{mnemonic} ${operand:04X},X"),
            AddressingMode::AbsoluteY => write!(f, "{mnemonic} ${operand:04X},Y"),
            AddressingMode::Indirect => write!(f, "{mnemonic} (${operand:04X})"),
            AddressingMode::IndirectX => write!(f, "{mnemonic} (${operand:02X},X)"),
            AddressingMode::IndirectY => write!(f, "{mnemonic} (${operand:02X}),Y"),
            AddressingMode::Relative => {
                // Branches are shown with their absolute target
                let target = self.next_pc().wrapping_add_signed((operand as u8 as i8).into());
                write!(f, "{mnemonic} ${target:04X}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::IndexRegisters;
    use crate::decode;
    use test_log::test;

    fn disassemble(program: &[u8]) -> String {
        let mut memory = Box::new([0; 0x10000]);
        memory[0x8000..0x8000 + program.len()].copy_from_slice(program);

        decode::decode(&mut *memory, 0x8000, IndexRegisters::new(0x10, 0x20), false)
            .map(|instruction| instruction.to_string())
            .unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn operand_syntax() {
        assert_eq!(disassemble(&[0x18]), "CLC");
        assert_eq!(disassemble(&[0x0A]), "ASL A");
        assert_eq!(disassemble(&[0xA9, 0x10]), "LDA #$10");
        assert_eq!(disassemble(&[0xA5, 0x80]), "LDA $80");
        assert_eq!(disassemble(&[0xB5, 0x80]), "LDA $80,X");
        assert_eq!(disassemble(&[0xB6, 0x80]), "LDX $80,Y");
        assert_eq!(disassemble(&[0xAD, 0x34, 0x12]), "LDA $1234");
        assert_eq!(disassemble(&[0xBD, 0x34, 0x12]), "LDA $1234,X");
        assert_eq!(disassemble(&[0xB9, 0x34, 0x12]), "LDA $1234,Y");
        assert_eq!(disassemble(&[0x6C, 0xFC, 0xFF]), "JMP ($FFFC)");
        assert_eq!(disassemble(&[0xA1, 0x40]), "LDA ($40,X)");
        assert_eq!(disassemble(&[0xB1, 0x40]), "LDA ($40),Y");
    }

    #[test]
    fn branches_show_target() {
        assert_eq!(disassemble(&[0xF0, 0x05]), "BEQ $8007");
        assert_eq!(disassemble(&[0xD0, 0xFE]), "BNE $8000");
        assert_eq!(disassemble(&[0x10, 0x80]), "BPL $7F82");
    }

    #[test]
    fn instruction_names() {
        assert_eq!(instruction_str(0xA9), "LDA");
        assert_eq!(instruction_str(0x00), "BRK");
        assert_eq!(instruction_str(0x02), "???");
    }

    #[test]
    fn instruction_names_match_decoded_mnemonics() {
        for (opcode, spec) in opcodes::documented_opcodes() {
            let rendered = disassemble(&[opcode, 0x00, 0x00]);
            assert_eq!(instruction_str(opcode), spec.mnemonic.name());
            assert!(
                rendered.starts_with(instruction_str(opcode)),
                "opcode {opcode:02X}: {rendered}"
            );
        }
    }
}
