use proptest::prelude::*;
use quack3200::codegen::MachineWord;
use quack3200::isa::{Address, Opcode, Register};
use quack3200::{BufferedPort, RunOptions, SymbolValue, assemble, execute};

// Property-based fuzzing tests to ensure robustness against malformed input

fn arb_mnemonic() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "ADD", "sub", "Mult", "DIV", "LOAD", "STORE", "READ", "WRITE", "B", "BM", "BZ", "BP",
        "HALT", "ORG", "DS", "DC", "END", "end",
    ])
    .prop_map(str::to_string)
}

/// Generate arbitrary assembly-like lines
fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        // Machine-language shapes
        (arb_mnemonic(), 0u8..10, "[A-Z][A-Z0-9]{0,3}")
            .prop_map(|(m, r, s)| format!("  {} {},{}", m, r, s)),
        (arb_mnemonic(), "[A-Z][A-Z0-9]{0,3}").prop_map(|(m, s)| format!("  {} {}", m, s)),
        // Labeled directives with numeric operands
        ("[A-Z]{1,3}", arb_mnemonic(), any::<i32>())
            .prop_map(|(l, m, v)| format!("{} {} {}", l, m, v)),
        // Comments
        ";[^\n]*",
        // Empty lines and whitespace
        "[ \t]*",
        // Garbage (printable ASCII)
        "[\\x20-\\x7E]+",
    ]
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..60).prop_map(|lines| lines.join("\n"))
}

/// Lines that may define a label, with `@` standing in for it
fn arb_labeled_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u8..10).prop_map(|r| format!("@ LOAD {},L0", r)),
        Just(String::from("@ HALT 9")),
        (1u32..40_000).prop_map(|n| format!("@ DS {}", n)),
        any::<i16>().prop_map(|v| format!("@ DC {}", v)),
        Just(String::from("; comment")),
        (100u32..99_999).prop_map(|n| format!("  ORG {}", n)),
    ]
}

/// Every line gets its own label, `L<index>`
fn arb_labeled_program() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_labeled_line(), 1..40).prop_map(|lines| {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| line.replacen('@', &format!("L{}", i), 1))
            .collect()
    })
}

proptest! {
    /// Fuzzing test: assembly never panics and never fails on in-memory input
    #[test]
    fn test_no_panic_on_arbitrary_input(input in arb_program()) {
        let assembly = assemble(&input);
        prop_assert!(assembly.is_ok());
    }

    /// Fuzzing test: whatever assembles cleanly runs without panicking
    #[test]
    fn test_no_panic_on_execution(
        input in arb_program(),
        inputs in prop::collection::vec("-?[0-9a-z]{0,10}", 0..5),
    ) {
        let assembly = assemble(&input).unwrap();
        let mut port = BufferedPort::new(inputs);
        let options = RunOptions { max_steps: Some(2_000) };
        // Running out of scripted input is an error, not a panic
        let _ = execute(&assembly, &mut port, &options);
    }

    /// Fuzzing test: decoding an encoded word recovers every field
    #[test]
    fn test_encode_decode_fields(
        opcode in prop::sample::select(Opcode::ALL.to_vec()),
        register in 0u8..10,
        address in 0u32..=99_999,
    ) {
        let word = MachineWord::new(
            opcode,
            Register::new(register).unwrap(),
            Address::new(address).unwrap(),
        );
        let encoded = word.encode();
        prop_assert_eq!(encoded / 1_000_000, opcode.id());
        prop_assert_eq!(MachineWord::decode(encoded), Some(word));
        prop_assert_eq!(word.to_string().len(), 8);
    }

    /// Fuzzing test: DC stores its literal value, sign included
    #[test]
    fn test_constant_stored_verbatim(value in -99_999_999i64..=99_999_999) {
        let source = format!("  ORG 100\n  HALT\nK DC {}\n  END", value);
        let assembly = assemble(&source).unwrap();
        prop_assert!(assembly.is_ok(), "{:?}", assembly.errors.codes());
        prop_assert_eq!(assembly.translation.memory.read(Address::new(101).unwrap()), value);
    }

    /// Fuzzing test: both passes assign the same location to every label
    #[test]
    fn test_pass_locations_agree(lines in arb_labeled_program()) {
        let assembly = assemble(&lines.join("\n")).unwrap();
        for line in &assembly.translation.lines {
            let Some(location) = line.shown_location() else { continue };
            let Some(label) = line.statement.split_whitespace().next() else { continue };
            if let Some(SymbolValue::Location(defined)) = assembly.symbols.lookup(label) {
                prop_assert_eq!(defined, location, "label {}", label);
            }
        }
    }
}
