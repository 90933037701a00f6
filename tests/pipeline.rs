//! End-to-end scenarios across both compiler stages: Jack source through
//! VM code down to HACK assembly.

use jack::asm::AsmEmitter;
use jack::lexer::Lexer;
use jack::vm::{commands_to_text, parse_program};

fn compile(source: &str) -> String {
    let commands = jack::compile_source_silent(source).expect("compile");
    commands_to_text(&commands)
}

/// Lower VM text for one file, comments stripped.
fn lower(vm_source: &str, stem: &str) -> Vec<String> {
    let mut emitter = AsmEmitter::new();
    emitter.set_file(stem);
    for command in parse_program(vm_source).expect("vm parse") {
        emitter.translate(&command);
    }
    emitter
        .finish()
        .lines()
        .filter(|line| !line.starts_with("//"))
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn empty_class_compiles_to_three_commands() {
    let vm = compile("class Main { function void main() { return; } }");
    assert_eq!(vm, "function Main.main 0\npush constant 0\nreturn\n");
}

#[test]
fn field_access_through_constructor() {
    let vm = compile(
        "class C { field int x; constructor C new(int v) { let x = v; return this; } }",
    );
    assert_eq!(
        vm,
        "function C.new 0\n\
         push constant 1\n\
         call Memory.alloc 1\n\
         pop pointer 0\n\
         push argument 0\n\
         pop this 0\n\
         push pointer 0\n\
         return\n"
    );
}

#[test]
fn method_argument_count_includes_receiver() {
    // two declared parameters land at argument 1 and 2; argument 0 is this
    let vm = compile(
        "class P { method int sum(int a, int b) { return a + b; } }",
    );
    assert!(vm.contains("push argument 1\npush argument 2\nadd"));
}

#[test]
fn whole_program_reaches_assembly() {
    let vm = compile(
        "class Main { function void main() { do Output.printInt(1 + (2 * 3)); return; } }",
    );
    let asm = lower(&vm, "Main");

    // the computation arrives in evaluation order
    let one = asm.iter().position(|l| l == "@1").expect("@1");
    let two = asm.iter().position(|l| l == "@2").expect("@2");
    let three = asm.iter().position(|l| l == "@3").expect("@3");
    assert!(one < two && two < three);
    // the multiply call saves a frame and jumps
    assert!(asm.contains(&"@Math.multiply".to_string()));
    assert!(asm.contains(&"(Main.main$ret.0)".to_string()));
    assert!(asm.contains(&"@Output.printInt".to_string()));
}

#[test]
fn while_loop_branches_in_assembly() {
    let vm = compile(
        "class Main { function void main() { var int x; while (x < 10) { let x = x + 1; } return; } }",
    );
    let asm = lower(&vm, "Main");

    assert!(asm.contains(&"(Main.main$WHILE_main_0)".to_string()));
    assert!(asm.contains(&"(Main.main$WHILE_END_main_0)".to_string()));
    // the comparison pushes a boolean that if-goto consumes
    let jlt = asm.iter().position(|l| l == "D;JLT").expect("lt compare");
    let jne = asm.iter().position(|l| l == "D;JNE").expect("if-goto");
    assert!(jlt < jne);
}

#[test]
fn token_stream_is_independent_of_comment_placement() {
    let plain = "class Main { function void main() { return; } }";
    let commented = "/** API doc */ class Main {\n  // declare main\n  function void main() {\n    /* body */ return; // done\n  }\n}";

    let (plain_tokens, plain_errs) = Lexer::new(plain).tokenize();
    let (commented_tokens, commented_errs) = Lexer::new(commented).tokenize();
    assert!(plain_errs.is_empty() && commented_errs.is_empty());

    let plain_nodes: Vec<_> = plain_tokens.into_iter().map(|t| t.node).collect();
    let commented_nodes: Vec<_> = commented_tokens.into_iter().map(|t| t.node).collect();
    assert_eq!(plain_nodes, commented_nodes);
}

#[test]
fn compiled_output_parses_back_as_vm() {
    let vm = compile(
        "class Main { \
         field int a; \
         constructor Main new() { let a = 0; return this; } \
         method void step() { \
           var Array buf; var int i; \
           let buf = Array.new(8); \
           while (i < 8) { let buf[i] = i * 2; let i = i + 1; } \
           if (a = 0) { do Output.printString(\"ok\"); } else { do Sys.halt(); } \
           return; \
         } }",
    );
    // the emitted text round-trips through the VM parser unchanged
    let commands = parse_program(&vm).expect("emitted VM must be well-formed");
    assert_eq!(commands_to_text(&commands), vm);
}

#[test]
fn multi_file_program_keeps_statics_apart() {
    let main_vm = compile(
        "class Main { static int count; function void main() { let count = 1; return; } }",
    );
    let game_vm = compile(
        "class Game { static int count; function void run() { let count = 2; return; } }",
    );

    let mut emitter = AsmEmitter::new();
    emitter.emit_bootstrap();
    emitter.set_file("Main");
    for command in parse_program(&main_vm).unwrap() {
        emitter.translate(&command);
    }
    emitter.set_file("Game");
    for command in parse_program(&game_vm).unwrap() {
        emitter.translate(&command);
    }
    let asm = emitter.finish();

    assert!(asm.contains("@Main.0"));
    assert!(asm.contains("@Game.0"));
    assert!(asm.starts_with("// bootstrap\n@256\n"));
}

#[test]
fn return_label_counter_spans_the_whole_program() {
    let vm_a = "function A.f 0\ncall B.g 0\nreturn\n";
    let vm_b = "function B.g 0\ncall A.f 0\nreturn\n";

    let mut emitter = AsmEmitter::new();
    emitter.set_file("A");
    for command in parse_program(vm_a).unwrap() {
        emitter.translate(&command);
    }
    emitter.set_file("B");
    for command in parse_program(vm_b).unwrap() {
        emitter.translate(&command);
    }
    let asm = emitter.finish();

    assert!(asm.contains("(A.f$ret.0)"));
    assert!(asm.contains("(B.g$ret.1)"));
}
