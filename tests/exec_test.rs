mod common;

use common::{run_program, run_with};
use stack_machine::mach::Val;

#[test]
fn test_execute_pushes_the_nested_exit_code() {
    let source = "BEGIN
\"\"BEGIN 42 EXIT
EXECUTE
EXIT";
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 42);
    assert_eq!(outcome.err, "");
}

#[test]
fn test_nested_program_needs_its_own_begin() {
    // The popped range assembles as a whole program; without BEGIN it is
    // reported on the error stream and the outer program carries on.
    let source = "BEGIN
\"\"0 EXIT
EXECUTE
7 EXIT";
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 7);
    assert_eq!(outcome.err, "VMA FATAL: BEGIN is undefined or out of bounds.\n");
}

#[test]
fn test_nested_runtime_error_is_reported_not_propagated() {
    let source = "BEGIN
\"\"BEGIN 1 0 IDIV 0 EXIT
EXECUTE
DEPTH EXIT";
    let outcome = run_program(source, &[]);
    // Nothing was pushed by the failed nest, so DEPTH sees an empty stack.
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.err, "VM FATAL: IDIV: Cannot divide by zero.\n");
}

#[test]
fn test_nested_program_shares_the_data_stack() {
    let source = "BEGIN
19
\"\"BEGIN 23 IADD 0 EXIT
EXECUTE
POP
EXIT";
    // The nest added 23 to the 19 the outer program left behind; its exit
    // code 0 is popped, leaving the sum for the outer EXIT.
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 42);
}

#[test]
fn test_nested_call_stack_is_separate() {
    let source = "BEGIN
\"\"BEGIN RETURN
EXECUTE
0 EXIT";
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        outcome.err,
        "VM FATAL: RETURN: You cannot RETURN without first making a CALL.\n"
    );
}

#[test]
fn test_outer_state_is_restored_after_execute() {
    // The outer program keeps jumping by label after a nest ran inside its
    // own fresh code segment.
    let source = "BEGIN
\"\"BEGIN 5 EXIT
EXECUTE
Onward JUMP
1 EXIT
@Onward
EXIT";
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 5);
}

#[test]
fn test_execute_depth_is_capped() {
    // A self-replicating program: each level duplicates the source range
    // still on the (shared) stack and EXECUTEs the copy, recursing until
    // the depth cap trips at the seventeenth nested call.
    let source = "BEGIN
\"\"BEGIN DUP 1 IADD DUPN EXECUTE 0 EXIT
DUP 1 IADD DUPN
EXECUTE
0 EXIT";
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        outcome.err.matches("Maximum EXECUTE depth exceeded.").count(),
        1
    );
    assert_eq!(
        outcome.err,
        "VM FATAL: EXECUTE: Maximum EXECUTE depth exceeded.\n"
    );
}

#[test]
fn test_execute_depth_recovers_after_the_cap() {
    // After a depth failure the counter must be balanced again; a fresh
    // single-level EXECUTE still works.
    let source = "BEGIN
\"\"BEGIN DUP 1 IADD DUPN EXECUTE 0 EXIT
DUP 1 IADD DUPN
EXECUTE
\"\"BEGIN 9 EXIT
EXECUTE
EXIT";
    let outcome = run_program(source, &[]);
    assert_eq!(outcome.exit_code(), 9);
}

#[test]
fn test_execute_needs_a_char_range() {
    let outcome = run_program("BEGIN 0 EXECUTE 0 EXIT", &[]);
    assert_eq!(
        outcome.fatal(),
        "VM FATAL: EXECUTE: Range size indicator must be greater than zero."
    );
}

#[test]
fn test_two_levels_of_nesting() {
    // Outer runs a nest which itself assembles and runs a further nest
    // built from character pushes.
    let inner = "BEGIN 3 EXIT";
    let pushes: Vec<String> = inner
        .chars()
        .map(|c| match c {
            ' ' => "SPACE".to_string(),
            c => format!("'{}'", c),
        })
        .collect();
    let middle = format!("BEGIN {} {} EXECUTE EXIT", pushes.join(" "), inner.len());
    let source = format!("BEGIN\n\"\"{}\nEXECUTE\nEXIT", middle);
    let outcome = run_program(&source, &[]);
    assert_eq!(outcome.exit_code(), 3);
}

#[test]
fn test_exit_code_and_halt_reset_after_nest() {
    let result = run_with(
        "BEGIN\n\"\"BEGIN 42 EXIT\nEXECUTE\n0 EXIT",
        &[],
        |m| m.stack().vec().clone(),
    )
    .unwrap();
    assert_eq!(result, vec![Val::Int(42)]);
}
