use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Translate VM code to HACK assembly.
///
/// A file input `X.vm` translates to a sibling `X.asm` without the
/// bootstrap prologue; a directory input `D/` merges every `.vm` file it
/// contains into `D/D.asm`, prefixed with `SP = 256; call Sys.init 0`.
#[derive(Parser)]
#[command(name = "vm-translator", version, about = "Translate VM code to HACK assembly")]
struct Cli {
    /// Input .vm file or directory of .vm files
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    process::exit(jack::driver::translate_path(&cli.input));
}
