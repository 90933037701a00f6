use std::fmt;
use std::io::{self, Write};

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// The eight VM memory segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
            Segment::Static => "static",
        }
    }

    pub fn from_name(name: &str) -> Option<Segment> {
        match name {
            "constant" => Some(Segment::Constant),
            "local" => Some(Segment::Local),
            "argument" => Some(Segment::Argument),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "pointer" => Some(Segment::Pointer),
            "temp" => Some(Segment::Temp),
            "static" => Some(Segment::Static),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stack arithmetic and logic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Not => "not",
        }
    }

    pub fn from_name(name: &str) -> Option<ArithOp> {
        match name {
            "add" => Some(ArithOp::Add),
            "sub" => Some(ArithOp::Sub),
            "neg" => Some(ArithOp::Neg),
            "eq" => Some(ArithOp::Eq),
            "gt" => Some(ArithOp::Gt),
            "lt" => Some(ArithOp::Lt),
            "and" => Some(ArithOp::And),
            "or" => Some(ArithOp::Or),
            "not" => Some(ArithOp::Not),
            _ => None,
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One VM command, the unit of the intermediate representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmCommand {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(ArithOp),
    Label(String),
    Goto(String),
    IfGoto(String),
    Call(String, u16),
    Function(String, u16),
    Return,
}

impl fmt::Display for VmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmCommand::Push(seg, index) => write!(f, "push {} {}", seg, index),
            VmCommand::Pop(seg, index) => write!(f, "pop {} {}", seg, index),
            VmCommand::Arithmetic(op) => write!(f, "{}", op),
            VmCommand::Label(name) => write!(f, "label {}", name),
            VmCommand::Goto(name) => write!(f, "goto {}", name),
            VmCommand::IfGoto(name) => write!(f, "if-goto {}", name),
            VmCommand::Call(name, n_args) => write!(f, "call {} {}", name, n_args),
            VmCommand::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            VmCommand::Return => write!(f, "return"),
        }
    }
}

/// Writes VM commands one per line to an output sink; flushes on `finish`.
pub struct VmWriter<W: Write> {
    sink: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_command(&mut self, command: &VmCommand) -> io::Result<()> {
        writeln!(self.sink, "{}", command)
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// Render a command list as VM text.
pub fn commands_to_text(commands: &[VmCommand]) -> String {
    let mut out = String::new();
    for command in commands {
        out.push_str(&command.to_string());
        out.push('\n');
    }
    out
}

/// Parse a whole `.vm` source: one command per line, `//` comments and
/// blank lines ignored.
pub fn parse_program(source: &str) -> Result<Vec<VmCommand>, Vec<Diagnostic>> {
    let mut commands = Vec::new();
    let mut diagnostics = Vec::new();
    let mut offset = 0u32;

    // split('\n') rather than lines() keeps the offset arithmetic exact
    // on CRLF input; trim() below discards the '\r'
    for line in source.split('\n') {
        let line_len = line.len() as u32;
        let code = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };
        let trimmed = code.trim();
        if !trimmed.is_empty() {
            let span = Span::new(offset, offset + line_len);
            match parse_line(trimmed, span) {
                Ok(command) => commands.push(command),
                Err(diag) => diagnostics.push(diag),
            }
        }
        offset += line_len + 1;
    }

    if diagnostics.is_empty() {
        Ok(commands)
    } else {
        Err(diagnostics)
    }
}

fn parse_line(line: &str, span: Span) -> Result<VmCommand, Diagnostic> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let op = fields[0];

    if let Some(arith) = ArithOp::from_name(op) {
        expect_arity(&fields, 1, span)?;
        return Ok(VmCommand::Arithmetic(arith));
    }

    match op {
        "push" | "pop" => {
            expect_arity(&fields, 3, span)?;
            let segment = Segment::from_name(fields[1]).ok_or_else(|| {
                Diagnostic::error(format!("unknown segment '{}'", fields[1]), span).with_help(
                    "segments are constant, local, argument, this, that, pointer, temp, static"
                        .to_string(),
                )
            })?;
            let index = parse_index(fields[2], span)?;
            validate_segment_index(op, segment, index, span)?;
            if op == "push" {
                Ok(VmCommand::Push(segment, index))
            } else {
                Ok(VmCommand::Pop(segment, index))
            }
        }
        "label" => {
            expect_arity(&fields, 2, span)?;
            Ok(VmCommand::Label(fields[1].to_string()))
        }
        "goto" => {
            expect_arity(&fields, 2, span)?;
            Ok(VmCommand::Goto(fields[1].to_string()))
        }
        "if-goto" => {
            expect_arity(&fields, 2, span)?;
            Ok(VmCommand::IfGoto(fields[1].to_string()))
        }
        "call" => {
            expect_arity(&fields, 3, span)?;
            let n_args = parse_index(fields[2], span)?;
            Ok(VmCommand::Call(fields[1].to_string(), n_args))
        }
        "function" => {
            expect_arity(&fields, 3, span)?;
            let n_locals = parse_index(fields[2], span)?;
            Ok(VmCommand::Function(fields[1].to_string(), n_locals))
        }
        "return" => {
            expect_arity(&fields, 1, span)?;
            Ok(VmCommand::Return)
        }
        other => Err(
            Diagnostic::error(format!("unknown VM command '{}'", other), span).with_help(
                "commands are push, pop, add, sub, neg, eq, gt, lt, and, or, not, \
                 label, goto, if-goto, function, call, return"
                    .to_string(),
            ),
        ),
    }
}

fn expect_arity(fields: &[&str], arity: usize, span: Span) -> Result<(), Diagnostic> {
    if fields.len() == arity {
        Ok(())
    } else {
        Err(Diagnostic::error(
            format!(
                "'{}' takes {} argument{}, found {}",
                fields[0],
                arity - 1,
                if arity == 2 { "" } else { "s" },
                fields.len() - 1
            ),
            span,
        ))
    }
}

fn parse_index(text: &str, span: Span) -> Result<u16, Diagnostic> {
    text.parse::<u16>().map_err(|_| {
        Diagnostic::error(format!("'{}' is not a non-negative decimal", text), span)
    })
}

fn validate_segment_index(
    op: &str,
    segment: Segment,
    index: u16,
    span: Span,
) -> Result<(), Diagnostic> {
    if op == "pop" && segment == Segment::Constant {
        return Err(Diagnostic::error(
            "cannot pop to the constant segment".to_string(),
            span,
        ));
    }
    if segment == Segment::Pointer && index > 1 {
        return Err(Diagnostic::error(
            format!("pointer index {} is out of range (0 or 1)", index),
            span,
        ));
    }
    if segment == Segment::Temp && index > 7 {
        return Err(Diagnostic::error(
            format!("temp index {} is out of range (0 to 7)", index),
            span,
        ));
    }
    Ok(())
}
