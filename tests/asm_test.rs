mod common;

use common::TestConsole;
use stack_machine::asm;
use stack_machine::mach::{AsmError, JumpTable, Label, Op, Opcode, Val};

fn assemble(source: &str) -> Result<asm::Assembly, AsmError> {
    let mut console = TestConsole::new(&[]);
    asm::assemble(source, &mut console)
}

fn ops(assembly: &asm::Assembly) -> Vec<Op> {
    (0..assembly.code.len())
        .map(|i| assembly.code.get(i).unwrap().clone())
        .collect()
}

#[test]
fn test_literal_classification() {
    let assembly = assemble("BEGIN true -5 0x1F 2.5 'a' 0 EXIT").unwrap();
    assert_eq!(assembly.entry, 0);
    let ops = ops(&assembly);
    assert!(matches!(ops[0], Op::Literal(Val::Bool(true))));
    assert!(matches!(ops[1], Op::Literal(Val::Int(-5))));
    assert!(matches!(ops[2], Op::Literal(Val::Int(31))));
    assert!(matches!(ops[3], Op::Literal(Val::Float(f)) if f == 2.5));
    assert!(matches!(ops[4], Op::Literal(Val::Char('a'))));
    assert!(matches!(ops[5], Op::Literal(Val::Int(0))));
    assert!(matches!(ops[6], Op::Code(Opcode::Exit)));
}

#[test]
fn test_decimal_wins_over_hex() {
    let assembly = assemble("BEGIN 42 cafe 0 EXIT").unwrap();
    let ops = ops(&assembly);
    assert!(matches!(ops[0], Op::Literal(Val::Int(42))));
    assert!(matches!(ops[1], Op::Literal(Val::Int(0xcafe))));
}

#[test]
fn test_case_insensitive_tokens() {
    let assembly = assemble("begin TRUE False iadd Exit").unwrap();
    let ops = ops(&assembly);
    assert!(matches!(ops[0], Op::Literal(Val::Bool(true))));
    assert!(matches!(ops[1], Op::Literal(Val::Bool(false))));
    assert!(matches!(ops[2], Op::Code(Opcode::IAdd)));
    assert!(matches!(ops[3], Op::Code(Opcode::Exit)));
}

#[test]
fn test_string_shorthand() {
    let assembly = assemble("BEGIN\n\"\"Hi there\n0 EXIT").unwrap();
    let ops = ops(&assembly);
    assert!(matches!(ops[0], Op::Literal(Val::Char('H'))));
    assert!(matches!(ops[1], Op::Literal(Val::Char('i'))));
    assert!(matches!(ops[2], Op::Code(Opcode::Space)));
    assert!(matches!(ops[7], Op::Literal(Val::Char('e'))));
    assert!(matches!(ops[8], Op::Literal(Val::Int(8))));
}

#[test]
fn test_string_shorthand_tab_and_trailing_space() {
    let assembly = assemble("BEGIN\n\"\"a\tb \n0 EXIT").unwrap();
    let ops = ops(&assembly);
    assert!(matches!(ops[1], Op::Code(Opcode::Tab)));
    assert!(matches!(ops[3], Op::Code(Opcode::Space)));
    assert!(matches!(ops[4], Op::Literal(Val::Int(4))));
}

#[test]
fn test_empty_string_shorthand_emits_nothing() {
    let assembly = assemble("BEGIN\n\"\"\n0 EXIT").unwrap();
    assert_eq!(assembly.code.len(), 2);
}

#[test]
fn test_comments_consume_their_line() {
    let assembly = assemble("; JUNK that would not assemble\nBEGIN 0 EXIT ; more JUNK\n").unwrap();
    assert_eq!(assembly.code.len(), 2);
}

#[test]
fn test_forward_reference_resolved_in_pass_two() {
    let assembly = assemble("BEGIN Finish JUMP @Finish").unwrap();
    let ops = ops(&assembly);
    match &ops[0] {
        Op::Literal(Val::Label(label)) => {
            assert_eq!(label.name(), "Finish");
            assert_eq!(label.pointer(), 2);
        }
        other => panic!("expected resolved label, got {:?}", other),
    }
    for op in &ops {
        assert!(!matches!(op, Op::Placeholder(_)));
    }
}

#[test]
fn test_backward_reference_resolved_in_pass_one() {
    let assembly = assemble("@Top BEGIN Top JUMP").unwrap();
    let ops = ops(&assembly);
    assert!(matches!(&ops[0], Op::Literal(Val::Label(l)) if l.pointer() == 0));
}

#[test]
fn test_unknown_symbol() {
    let err = assemble("BEGIN Bogus JUMP").unwrap_err();
    assert_eq!(err.to_string(), "Unknown symbol: BOGUS");
}

#[test]
fn test_duplicate_label() {
    let err = assemble("@Spot BEGIN 0 EXIT @Spot").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Label 'Spot' cannot be declared more than once."
    );
}

#[test]
fn test_reserved_label_names() {
    let err = assemble("@begin BEGIN 0 EXIT").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Label name 'begin' disallowed by the assembler."
    );
    let err = assemble("@IADD BEGIN 0 EXIT").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Label name 'IADD' disallowed by the assembler."
    );
}

#[test]
fn test_begin_must_be_unique() {
    let err = assemble("BEGIN 0 EXIT BEGIN").unwrap_err();
    assert!(matches!(err, AsmError::DuplicateBegin));
}

#[test]
fn test_begin_missing_or_out_of_bounds() {
    assert!(matches!(assemble("0 EXIT"), Err(AsmError::BadBegin)));
    assert!(matches!(assemble("0 EXIT BEGIN"), Err(AsmError::BadBegin)));
    assert!(matches!(assemble(""), Err(AsmError::BadBegin)));
}

#[test]
fn test_label_declaration_shape() {
    // A malformed declaration is just an unknown token.
    let err = assemble("BEGIN @9lives 0 EXIT").unwrap_err();
    assert_eq!(err.to_string(), "Unknown symbol: @9LIVES");
    assert!(assemble("BEGIN 0 EXIT @_ok9").is_ok());
}

#[test]
fn test_quote_char_literal() {
    let assembly = assemble("BEGIN ''' 0 EXIT").unwrap();
    assert!(matches!(
        assembly.code.get(0).unwrap(),
        Op::Literal(Val::Char('\''))
    ));
}

#[test]
fn test_jump_table_operations() {
    let mut table = JumpTable::new();
    assert!(!table.exists("spot"));
    table.add("Spot", Label::new("Spot", 3)).unwrap();
    assert!(table.exists("SPOT"));
    assert_eq!(table.get("sPoT").unwrap().pointer(), 3);
    assert!(table.add("SPOT", Label::new("SPOT", 9)).is_err());
    table.remove("Spot").unwrap();
    assert!(!table.exists("Spot"));
    assert!(table.remove("Spot").is_err());
    assert_eq!(
        table.get("spot").unwrap_err().to_string(),
        "Unknown symbol: SPOT"
    );
}

#[test]
fn test_hex_shadows_the_one_all_hex_mnemonic() {
    // FADD is the only mnemonic spelled entirely in hex digits, so the
    // greedy literal pass claims it before instruction lookup ever runs.
    let assembly = assemble("BEGIN FADD 0 EXIT").unwrap();
    assert!(matches!(
        assembly.code.get(0).unwrap(),
        Op::Literal(Val::Int(0xFADD))
    ));
}
