pub mod asm;
pub mod ast;
pub mod codegen;
pub mod diagnostic;
pub mod driver;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod symtab;
pub mod vm;

use codegen::Emitter;
use diagnostic::{render_diagnostics, Diagnostic};
use lexer::Lexer;
use parser::Parser;
use vm::VmCommand;

/// Lex and parse one Jack source file, reporting errors to stderr.
pub fn parse_source(source: &str, filename: &str) -> Result<ast::Class, Vec<Diagnostic>> {
    match parse_source_silent(source) {
        Ok(class) => Ok(class),
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

pub fn parse_source_silent(source: &str) -> Result<ast::Class, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Parser::new(tokens).parse_class()
}

/// Run the whole Jack stage: source text in, VM commands out. Errors are
/// reported to stderr.
pub fn compile_source(source: &str, filename: &str) -> Result<Vec<VmCommand>, Vec<Diagnostic>> {
    match compile_source_silent(source) {
        Ok(commands) => Ok(commands),
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

pub fn compile_source_silent(source: &str) -> Result<Vec<VmCommand>, Vec<Diagnostic>> {
    let class = parse_source_silent(source)?;
    Emitter::new().emit_class(&class)
}
