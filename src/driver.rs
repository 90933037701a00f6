use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::asm::AsmEmitter;
use crate::codegen::Emitter;
use crate::diagnostic::render_diagnostics;
use crate::lexeme;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::vm::{self, VmWriter};

/// Compile a `.jack` file or a directory of them to sibling `.vm` files.
/// Returns the process exit code: 0 on success, 1 on any failure.
pub fn compile_path(input: &Path, dump_tokens: bool) -> i32 {
    if input.is_dir() {
        let files = match files_with_extension(input, "jack") {
            Ok(files) => files,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", input.display(), e);
                return 1;
            }
        };
        if files.is_empty() {
            eprintln!("error: no .jack files in '{}'", input.display());
            return 1;
        }
        // a failed file does not stop the rest of the directory
        let mut failed = false;
        for file in &files {
            if !compile_file(file, dump_tokens) {
                failed = true;
            }
        }
        i32::from(failed)
    } else if has_extension(input, "jack") {
        i32::from(!compile_file(input, dump_tokens))
    } else {
        eprintln!(
            "error: expected a .jack file or a directory, got '{}'",
            input.display()
        );
        1
    }
}

/// Translate a `.vm` file to a sibling `.asm`, or a directory `D/` of
/// `.vm` files to a single `D/D.asm` with the bootstrap prologue.
pub fn translate_path(input: &Path) -> i32 {
    if input.is_dir() {
        let files = match files_with_extension(input, "vm") {
            Ok(files) => files,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", input.display(), e);
                return 1;
            }
        };
        if files.is_empty() {
            eprintln!("error: no .vm files in '{}'", input.display());
            return 1;
        }
        let dir_name = match input.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => {
                eprintln!("error: cannot name output for '{}'", input.display());
                return 1;
            }
        };
        let output = input.join(format!("{}.asm", dir_name));

        let mut emitter = AsmEmitter::new();
        emitter.emit_bootstrap();
        for file in &files {
            // everything lands in one output, so any bad input fails the run
            if !translate_into(&mut emitter, file) {
                return 1;
            }
        }
        write_output(&output, emitter.finish().as_bytes())
    } else if has_extension(input, "vm") {
        let mut emitter = AsmEmitter::new();
        if !translate_into(&mut emitter, input) {
            return 1;
        }
        let output = input.with_extension("asm");
        write_output(&output, emitter.finish().as_bytes())
    } else {
        eprintln!(
            "error: expected a .vm file or a directory, got '{}'",
            input.display()
        );
        1
    }
}

fn compile_file(path: &Path, dump_tokens: bool) -> bool {
    let filename = path.display().to_string();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", filename, e);
            return false;
        }
    };

    let (tokens, lex_errors) = Lexer::new(&source).tokenize();
    if !lex_errors.is_empty() {
        render_diagnostics(&lex_errors, &filename, &source);
        return false;
    }

    if dump_tokens {
        let xml = lexeme::tokens_to_xml(&tokens);
        let xml_path = path.with_extension("xml");
        if let Err(e) = atomic_write(&xml_path, xml.as_bytes()) {
            eprintln!("error: cannot write '{}': {}", xml_path.display(), e);
            return false;
        }
    }

    let class = match Parser::new(tokens).parse_class() {
        Ok(class) => class,
        Err(errors) => {
            render_diagnostics(&errors, &filename, &source);
            return false;
        }
    };

    let commands = match Emitter::new().emit_class(&class) {
        Ok(commands) => commands,
        Err(errors) => {
            render_diagnostics(&errors, &filename, &source);
            return false;
        }
    };

    let output = path.with_extension("vm");
    let rendered = match render_vm(&commands) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };
    if let Err(e) = atomic_write(&output, &rendered) {
        eprintln!("error: cannot write '{}': {}", output.display(), e);
        return false;
    }
    eprintln!("Compiled -> {}", output.display());
    true
}

fn translate_into(emitter: &mut AsmEmitter, path: &Path) -> bool {
    let filename = path.display().to_string();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", filename, e);
            return false;
        }
    };

    let stem = match path.file_stem() {
        Some(stem) => stem.to_string_lossy().to_string(),
        None => {
            eprintln!("error: cannot derive a file stem from '{}'", filename);
            return false;
        }
    };
    emitter.set_file(&stem);

    match vm::parse_program(&source) {
        Ok(commands) => {
            for command in &commands {
                emitter.translate(command);
            }
            true
        }
        Err(errors) => {
            render_diagnostics(&errors, &filename, &source);
            false
        }
    }
}

fn render_vm(commands: &[vm::VmCommand]) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = VmWriter::new(&mut buffer);
    for command in commands {
        writer.write_command(command)?;
    }
    writer.finish()?;
    Ok(buffer)
}

fn write_output(path: &Path, contents: &[u8]) -> i32 {
    if let Err(e) = atomic_write(path, contents) {
        eprintln!("error: cannot write '{}': {}", path.display(), e);
        return 1;
    }
    eprintln!("Translated -> {}", path.display());
    0
}

/// Write through a temporary in the target directory and rename into
/// place, so a failure never leaves a truncated output file.
fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// All files in `dir` with the given extension, sorted by name for
/// deterministic multi-file output.
fn files_with_extension(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
