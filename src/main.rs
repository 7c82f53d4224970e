fn main() {
    std::process::exit(stack_machine::term::main());
}
