use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Compile Jack source to VM code.
///
/// A file input `X.jack` compiles to a sibling `X.vm`; a directory input
/// compiles every `.jack` file it contains.
#[derive(Parser)]
#[command(name = "jack-compiler", version, about = "Compile Jack source to VM code")]
struct Cli {
    /// Input .jack file or directory of .jack files
    input: PathBuf,
    /// Also write each file's token stream to a sibling X.xml
    #[arg(long)]
    tokens: bool,
}

fn main() {
    let cli = Cli::parse();
    process::exit(jack::driver::compile_path(&cli.input, cli.tokens));
}
