use pretty_assertions::assert_eq;
use quack3200::isa::{Address, Register};
use quack3200::{
    Assembly, BufferedPort, ErrorKind, Execution, Outcome, QuackError, RunOptions, SymbolValue,
    assemble, assemble_file, execute,
};
use std::fs;
use std::io::Write;
use std::path::Path;

fn load(name: &str) -> Assembly {
    let path = format!("tests/programs/{}.qk", name);
    let source = fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read {}", path));
    assemble(&source).unwrap_or_else(|e| panic!("Failed to assemble {}: {}", name, e))
}

fn run(assembly: &Assembly, inputs: &[&str]) -> (Execution, Vec<i64>) {
    let mut port = BufferedPort::new(inputs.iter().copied());
    let options = RunOptions {
        max_steps: Some(100_000),
    };
    let execution = execute(assembly, &mut port, &options)
        .unwrap()
        .expect("program has assembly errors");
    (execution, port.outputs().to_vec())
}

fn reg(n: u8) -> Register {
    Register::new(n).unwrap()
}

fn addr(n: u32) -> Address {
    Address::new(n).unwrap()
}

#[test]
fn test_sum_program() {
    let assembly = load("sum");
    assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());
    assert_eq!(
        assembly.symbols.lookup("X"),
        Some(SymbolValue::Location(addr(100)))
    );
    assert_eq!(
        assembly.symbols.lookup("Y"),
        Some(SymbolValue::Location(addr(103)))
    );

    let words: Vec<i64> = (100..104)
        .map(|a| assembly.translation.memory.read(addr(a)))
        .collect();
    assert_eq!(words, vec![5_000_103, 8_900_103, 13_900_000, 3]);

    let (execution, outputs) = run(&assembly, &[]);
    assert_eq!(execution.outcome, Outcome::Halted);
    assert_eq!(execution.emulator.register(reg(0)), 3);
    assert_eq!(outputs, vec![3]);
}

#[test]
fn test_factorial_program() {
    let assembly = load("factorial");
    assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());

    let (execution, outputs) = run(&assembly, &["5"]);
    assert_eq!(execution.outcome, Outcome::Halted);
    assert_eq!(outputs, vec![120]);

    let (_, outputs) = run(&assembly, &["0"]);
    assert_eq!(outputs, vec![1]);
}

#[test]
fn test_factorial_rejects_bad_input() {
    let assembly = load("factorial");
    let (execution, outputs) = run(&assembly, &["five"]);
    assert_eq!(execution.outcome, Outcome::RuntimeError);
    assert_eq!(execution.errors.codes(), vec![28]);
    assert!(outputs.is_empty());
}

#[test]
fn test_countdown_program() {
    let assembly = load("countdown");
    assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());

    let (execution, outputs) = run(&assembly, &[]);
    assert_eq!(execution.outcome, Outcome::Halted);
    assert_eq!(outputs, vec![3, 2, 1]);
    assert_eq!(execution.emulator.register(reg(3)), 0);
}

#[test]
fn test_translation_errors() {
    let assembly = load("errors");
    let kinds: Vec<ErrorKind> = assembly.errors.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::InvalidRegister,
            ErrorKind::UndefinedSymbol,
            ErrorKind::MachineAfterHalt,
            ErrorKind::DuplicateHalt,
        ]
    );

    // Every line is still translated; the bad register falls back to 9.
    let contents: Vec<String> = assembly
        .translation
        .lines
        .iter()
        .map(|line| line.content.to_string())
        .collect();
    assert_eq!(
        contents,
        vec!["", "", "05900105", "061", "01000105", "13900000", "13900000", "00000005", ""]
    );

    let mut port = BufferedPort::default();
    assert!(
        execute(&assembly, &mut port, &RunOptions::default())
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_duplicate_halt_reported_once() {
    let assembly = assemble("  ORG 100\n  HALT\n  HALT\n  END").unwrap();
    let duplicates = assembly
        .errors
        .iter()
        .filter(|r| r.kind == ErrorKind::DuplicateHalt)
        .count();
    assert_eq!(duplicates, 1);
    assert_eq!(assembly.errors.iter().last().unwrap().statement, "  HALT");
}

#[test]
fn test_runtime_overflow() {
    let assembly = load("overflow");
    assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());

    let (execution, outputs) = run(&assembly, &[]);
    assert_eq!(execution.outcome, Outcome::RuntimeError);
    assert_eq!(execution.errors.codes(), vec![25]);
    assert_eq!(execution.errors.iter().next().unwrap().statement, "REG# 0");
    assert_eq!(execution.emulator.register(reg(0)), 99_999_998);
    assert!(outputs.is_empty());
}

#[test]
fn test_division_by_zero() {
    let assembly = assemble(
        "  ORG 100\n  LOAD 1,TEN\n  DIV 1,NONE\n  WRITE TEN\n  HALT\nTEN DC 10\nNONE DS 1\n  END",
    )
    .unwrap();
    let (execution, outputs) = run(&assembly, &[]);
    assert_eq!(execution.outcome, Outcome::RuntimeError);
    assert_eq!(execution.errors.codes(), vec![29]);
    assert!(outputs.is_empty());
}

#[test]
fn test_storage_past_end_of_memory() {
    let assembly = assemble("  HALT\nBUF DS 99999\n  END").unwrap();
    assert_eq!(assembly.errors.codes(), vec![11, 5]);
    assert!(assembly.translation.below_entry_point);
}

#[test]
fn test_origin_must_move_forward() {
    let assembly = assemble("  ORG 200\n  ORG 150\n  HALT\n  END").unwrap();
    assert_eq!(assembly.errors.codes(), vec![23]);
    let locations: Vec<_> = assembly
        .translation
        .lines
        .iter()
        .filter_map(|l| l.shown_location())
        .map(Address::value)
        .collect();
    assert_eq!(locations, vec![0, 200, 200]);
}

#[test]
fn test_multiply_defined_label() {
    let assembly =
        assemble("  ORG 100\n  LOAD 1,V\n  HALT\nV DC 1\nV DC 2\n  END").unwrap();
    assert_eq!(
        assembly.symbols.lookup("V"),
        Some(SymbolValue::MultiplyDefined)
    );
    assert_eq!(assembly.errors.codes(), vec![9, 6]);
    assert_eq!(assembly.errors.iter().next().unwrap().statement, "V");
    assert_eq!(assembly.translation.lines[1].content.to_string(), "051?????");
}

#[test]
fn test_statements_after_end() {
    let assembly =
        assemble("  ORG 100\n  HALT\n  END\n; trailing note\n  WRITE X\n  END").unwrap();
    assert_eq!(assembly.errors.codes(), vec![18, 16]);
}

#[test]
fn test_missing_end_and_halt() {
    let assembly = assemble("  ORG 100\n; nothing else").unwrap();
    assert_eq!(assembly.errors.codes(), vec![17, 14]);
    assert!(
        assembly
            .errors
            .iter()
            .all(|r| r.statement == quack3200::assembler::NO_STATEMENT)
    );
}

#[test]
fn test_negative_zero_constant() {
    let assembly = assemble("  ORG 100\n  HALT\nZ DC -0\n  END").unwrap();
    assert_eq!(assembly.errors.codes(), vec![30]);
}

#[test]
fn test_assemble_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let source = fs::read_to_string("tests/programs/countdown.qk").unwrap();
    file.write_all(source.replace('\n', "\r\n").as_bytes())
        .unwrap();

    let from_file = assemble_file(file.path()).unwrap();
    let from_text = load("countdown");
    assert!(from_file.is_ok());
    assert_eq!(from_file.translation.lines, from_text.translation.lines);
    assert_eq!(from_file.translation.memory, from_text.translation.memory);
}

#[test]
fn test_assemble_file_with_latin1_comment() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"  ORG 100\n  HALT ; caf\xe9\n  END\n")
        .unwrap();

    let assembly = assemble_file(file.path()).unwrap();
    assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());
    assert_eq!(assembly.translation.lines.len(), 3);
}

#[test]
fn test_assemble_missing_file() {
    let err = assemble_file(Path::new("tests/programs/absent.qk")).unwrap_err();
    assert!(matches!(err, QuackError::Io { .. }));
    assert!(err.to_string().contains("absent.qk"));
}

#[test]
fn test_step_limit_stops_endless_loop() {
    let assembly = assemble("  ORG 100\nSPIN B SPIN\n  HALT\n  END").unwrap();
    assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());

    let mut port = BufferedPort::default();
    let options = RunOptions {
        max_steps: Some(1_000),
    };
    let execution = execute(&assembly, &mut port, &options).unwrap().unwrap();
    assert_eq!(execution.outcome, Outcome::StepLimit);
    assert_eq!(execution.emulator.steps(), 1_000);
}
