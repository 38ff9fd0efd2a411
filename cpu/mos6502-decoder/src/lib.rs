//! Instruction decoding for the NMOS 6502: opcode metadata, effective address resolution, and
//! per-instruction cycle counts including page crossing and branch penalties.
//!
//! Decoding is a pure function of the bus contents, the program counter, the index registers, and
//! the branch condition. The register file and status flags are owned by the caller.

pub mod addressing;
pub mod bus;
mod decode;
pub mod disassemble;
pub mod opcodes;

pub use addressing::{AddressingMode, IndexRegisters, ResolvedOperand, resolve};
pub use bus::BusInterface;
pub use decode::{DecodedInstruction, decode};
pub use opcodes::{InstructionSpec, Mnemonic, UnknownOpcode, lookup};
