use clap::Parser;
use env_logger::Env;
use mos6502_decoder::{DecodedInstruction, IndexRegisters, Mnemonic, UnknownOpcode};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::mem;
use std::path::PathBuf;

struct Memory {
    ram: Box<[u8; 0x10000]>,
    addresses_written: Vec<u16>,
}

impl Memory {
    fn new() -> Self {
        Self { ram: Box::new([0; 0x10000]), addresses_written: Vec::new() }
    }

    fn load(&mut self, ram: &[(u16, u8)]) {
        for address in mem::take(&mut self.addresses_written) {
            self.ram[address as usize] = 0;
        }

        for &(address, value) in ram {
            self.ram[address as usize] = value;
            self.addresses_written.push(address);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SystemState {
    pc: u16,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
}

#[derive(Debug, Clone, Deserialize)]
struct Cycle(u16, u8, String);

impl Cycle {
    fn describe(&self) -> String {
        format!("{} {:04X}={:02X}", self.2, self.0, self.1)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TestDescription {
    name: String,
    initial: SystemState,
    #[serde(rename = "final")]
    final_: SystemState,
    cycles: Vec<Cycle>,
}

#[derive(Debug, Parser)]
struct Args {
    /// Directory containing JSON tests
    #[arg(long, short = 'd')]
    dir_path: PathBuf,
    /// Only run tests for this opcode (hex, e.g. "A9")
    #[arg(long, short = 'o', value_parser = parse_opcode)]
    opcode: Option<u8>,
}

fn parse_opcode(s: &str) -> Result<u8, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches('$');
    u8::from_str_radix(digits, 16).map_err(|err| format!("invalid opcode '{s}': {err}"))
}

const CARRY_BIT: u8 = 0;
const ZERO_BIT: u8 = 1;
const OVERFLOW_BIT: u8 = 6;
const NEGATIVE_BIT: u8 = 7;

// Branch conditions are evaluated here from the raw P register, the decoder only takes the result
fn branch_taken(mnemonic: Mnemonic, p: u8) -> bool {
    let flag = |bit: u8| p & (1 << bit) != 0;

    match mnemonic {
        Mnemonic::Bpl => !flag(NEGATIVE_BIT),
        Mnemonic::Bmi => flag(NEGATIVE_BIT),
        Mnemonic::Bvc => !flag(OVERFLOW_BIT),
        Mnemonic::Bvs => flag(OVERFLOW_BIT),
        Mnemonic::Bcc => !flag(CARRY_BIT),
        Mnemonic::Bcs => flag(CARRY_BIT),
        Mnemonic::Bne => !flag(ZERO_BIT),
        Mnemonic::Beq => flag(ZERO_BIT),
        _ => false,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut memory = Memory::new();

    let opcodes = match args.opcode {
        Some(opcode) => opcode..=opcode,
        None => 0x00..=0xFF,
    };

    let mut total_tests = 0;
    let mut total_failures = 0;

    for opcode in opcodes {
        let file_path = args.dir_path.join(format!("{opcode:02x}.json"));
        if !file_path.exists() {
            log::warn!("No tests for opcode {opcode:02X} at '{}', skipping", file_path.display());
            continue;
        }

        let tests: Vec<TestDescription> =
            serde_json::from_reader(BufReader::new(File::open(&file_path)?))?;

        let mut failures = 0;
        let test_count = tests.len();
        for test in tests {
            if run_test(&mut memory, opcode, &test) {
                failures += 1;
                log::debug!("Above failures in '{}'", test.name);
            }
        }

        if failures != 0 {
            log::error!("Failed {failures} out of {test_count} tests for opcode {opcode:02X}");
        }

        total_tests += test_count;
        total_failures += failures;
    }

    log::info!("Ran {total_tests} tests, {total_failures} failures");

    Ok(())
}

// Returns true if the test failed
fn run_test(memory: &mut Memory, opcode: u8, test: &TestDescription) -> bool {
    memory.load(&test.initial.ram);

    let expected_spec = mos6502_decoder::lookup(opcode).ok();
    let taken = expected_spec.is_some_and(|spec| branch_taken(spec.mnemonic, test.initial.p));
    let index = IndexRegisters::new(test.initial.x, test.initial.y);

    let result = mos6502_decoder::decode(&mut *memory.ram, test.initial.pc, index, taken);
    match (expected_spec, result) {
        (Some(_), Ok(instruction)) => check_instruction(&instruction, taken, test),
        (None, Err(UnknownOpcode(actual))) => {
            if actual != opcode {
                log::debug!(
                    "Unknown opcode mismatch: expected={opcode:02X}, actual={actual:02X}"
                );
            }
            actual != opcode
        }
        (Some(_), Err(err)) => {
            log::debug!("Failed to decode documented opcode: {err}");
            true
        }
        (None, Ok(instruction)) => {
            log::debug!("Decoded undocumented opcode as '{instruction}'");
            true
        }
    }
}

fn expected_pc(instruction: &DecodedInstruction, taken: bool) -> Option<u16> {
    match instruction.spec.mnemonic {
        // Control flow through the stack or interrupt vector is not determined by decoding
        Mnemonic::Brk | Mnemonic::Rts | Mnemonic::Rti => None,
        Mnemonic::Jmp | Mnemonic::Jsr => instruction.address(),
        mnemonic if mnemonic.is_branch() && taken => instruction.address(),
        _ => Some(instruction.next_pc()),
    }
}

fn check_instruction(
    instruction: &DecodedInstruction,
    taken: bool,
    test: &TestDescription,
) -> bool {
    let mut errors = false;

    if usize::from(instruction.total_cycles) != test.cycles.len() {
        log::debug!(
            "Cycle count does not match for '{instruction}': expected={}, actual={}",
            test.cycles.len(),
            instruction.total_cycles
        );
        let expected: Vec<_> = test.cycles.iter().map(Cycle::describe).collect();
        log::debug!("  Expected: {}", expected.join(", "));
        errors = true;
    }

    if let Some(pc) = expected_pc(instruction, taken).filter(|&pc| pc != test.final_.pc) {
        log::debug!("PC after '{instruction}': expected={:04X} actual={pc:04X}", test.final_.pc);
        errors = true;
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_conditions() {
        assert!(branch_taken(Mnemonic::Beq, 0b0000_0010));
        assert!(!branch_taken(Mnemonic::Beq, 0b1111_1101));
        assert!(branch_taken(Mnemonic::Bne, 0b1111_1101));
        assert!(branch_taken(Mnemonic::Bmi, 0b1000_0000));
        assert!(branch_taken(Mnemonic::Bpl, 0b0111_1111));
        assert!(branch_taken(Mnemonic::Bvs, 0b0100_0000));
        assert!(branch_taken(Mnemonic::Bvc, 0b1011_1111));
        assert!(branch_taken(Mnemonic::Bcs, 0b0000_0001));
        assert!(branch_taken(Mnemonic::Bcc, 0b1111_1110));
        assert!(!branch_taken(Mnemonic::Lda, 0xFF));
    }

    #[test]
    fn opcode_argument() {
        assert_eq!(parse_opcode("a9"), Ok(0xA9));
        assert_eq!(parse_opcode("0xF0"), Ok(0xF0));
        assert_eq!(parse_opcode("$6C"), Ok(0x6C));
        assert!(parse_opcode("100").is_err());
    }

    #[test]
    fn test_description_json() {
        let json = r#"{
            "name": "f0 05 00",
            "initial": { "pc": 4096, "s": 253, "a": 0, "x": 0, "y": 0, "p": 2,
                         "ram": [[4096, 240], [4097, 5]] },
            "final": { "pc": 4103, "s": 253, "a": 0, "x": 0, "y": 0, "p": 2,
                       "ram": [[4096, 240], [4097, 5]] },
            "cycles": [[4096, 240, "read"], [4097, 5, "read"], [4098, 0, "read"]]
        }"#;
        let test: TestDescription = serde_json::from_str(json).unwrap();

        let mut memory = Memory::new();
        memory.load(&test.initial.ram);

        let taken = branch_taken(Mnemonic::Beq, test.initial.p);
        let instruction = mos6502_decoder::decode(
            &mut *memory.ram,
            test.initial.pc,
            IndexRegisters::default(),
            taken,
        )
        .unwrap();

        assert!(taken);
        assert!(!check_instruction(&instruction, taken, &test));
    }

    fn single_test(
        pc: u16,
        ram: &[(u16, u8)],
        final_pc: u16,
        cycle_count: usize,
    ) -> TestDescription {
        let state = |pc| SystemState { pc, x: 0, y: 0, p: 0, ram: ram.to_vec() };
        TestDescription {
            name: "generated".into(),
            initial: state(pc),
            final_: state(final_pc),
            cycles: (0..cycle_count).map(|i| Cycle(pc, i as u8, "read".into())).collect(),
        }
    }

    fn decode_program(program: &[u8]) -> DecodedInstruction {
        let mut memory = Memory::new();
        let ram: Vec<(u16, u8)> = (0x0600..).zip(program.iter().copied()).collect();
        memory.load(&ram);
        mos6502_decoder::decode(&mut *memory.ram, 0x0600, IndexRegisters::default(), false)
            .unwrap()
    }

    #[test]
    fn undocumented_opcode_must_be_rejected() {
        let mut memory = Memory::new();
        let test = single_test(0x0200, &[(0x0200, 0x02)], 0x0200, 0);

        assert!(!run_test(&mut memory, 0x02, &test));
        // Decoder reports a different opcode than the file being run
        assert!(run_test(&mut memory, 0x03, &test));
        // Documented opcode that fails to decode
        assert!(run_test(&mut memory, 0xEA, &test));
    }

    #[test]
    fn documented_opcode_checks_cycles_and_pc() {
        let mut memory = Memory::new();

        // NOP
        let test = single_test(0x0200, &[(0x0200, 0xEA)], 0x0201, 2);
        assert!(!run_test(&mut memory, 0xEA, &test));

        let wrong_cycles = single_test(0x0200, &[(0x0200, 0xEA)], 0x0201, 3);
        assert!(run_test(&mut memory, 0xEA, &wrong_cycles));

        let wrong_pc = single_test(0x0200, &[(0x0200, 0xEA)], 0x0202, 2);
        assert!(run_test(&mut memory, 0xEA, &wrong_pc));
    }

    #[test]
    fn expected_pc_by_instruction() {
        // JMP $1234
        assert_eq!(expected_pc(&decode_program(&[0x4C, 0x34, 0x12]), false), Some(0x1234));
        // JSR $C000
        assert_eq!(expected_pc(&decode_program(&[0x20, 0x00, 0xC0]), false), Some(0xC000));
        // RTS, RTI, BRK
        assert_eq!(expected_pc(&decode_program(&[0x60]), false), None);
        assert_eq!(expected_pc(&decode_program(&[0x40]), false), None);
        assert_eq!(expected_pc(&decode_program(&[0x00]), false), None);
        // BEQ +$10, taken and not taken
        assert_eq!(expected_pc(&decode_program(&[0xF0, 0x10]), true), Some(0x0612));
        assert_eq!(expected_pc(&decode_program(&[0xF0, 0x10]), false), Some(0x0602));
        // LDA $1234
        assert_eq!(expected_pc(&decode_program(&[0xAD, 0x34, 0x12]), false), Some(0x0603));
    }
}
