use crate::vm::{ArithOp, Segment, VmCommand};

/// HACK assembly emitter — lowers VM commands onto the register machine,
/// maintaining the stack pointer discipline and the function-call frame
/// layout. One emitter instance translates a whole program, so its label
/// counters stay unique across every input file.
pub struct AsmEmitter {
    output: Vec<String>,
    /// Stem of the `.vm` file being translated; names the static segment.
    file_stem: String,
    /// Function whose body is being translated; qualifies branch labels
    /// and return-address labels.
    current_function: String,
    /// Comparison sub-label counter, program-wide.
    cmp_counter: u32,
    /// Return-address counter, program-wide.
    call_counter: u32,
}

impl Default for AsmEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl AsmEmitter {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            file_stem: String::new(),
            current_function: "Bootstrap".to_string(),
            cmp_counter: 0,
            call_counter: 0,
        }
    }

    /// Switch to the next input file; static references now resolve to
    /// `<stem>.<index>` symbols.
    pub fn set_file(&mut self, stem: &str) {
        self.file_stem = stem.to_string();
    }

    /// Directory-mode prologue: `SP = 256`, then `call Sys.init 0`.
    pub fn emit_bootstrap(&mut self) {
        self.raw("// bootstrap");
        self.a("256");
        self.c("D=A");
        self.a("SP");
        self.c("M=D");
        self.translate(&VmCommand::Call("Sys.init".to_string(), 0));
    }

    pub fn translate(&mut self, command: &VmCommand) {
        self.raw(&format!("// {}", command));
        match command {
            VmCommand::Push(segment, index) => self.emit_push(*segment, *index),
            VmCommand::Pop(segment, index) => self.emit_pop(*segment, *index),
            VmCommand::Arithmetic(op) => self.emit_arithmetic(*op),
            VmCommand::Label(name) => {
                let label = self.qualified(name);
                self.label_def(&label);
            }
            VmCommand::Goto(name) => {
                let label = self.qualified(name);
                self.a(&label);
                self.c("0;JMP");
            }
            VmCommand::IfGoto(name) => {
                let label = self.qualified(name);
                self.pop_to_d();
                self.a(&label);
                self.c("D;JNE");
            }
            VmCommand::Function(name, n_locals) => self.emit_function(name, *n_locals),
            VmCommand::Call(name, n_args) => self.emit_call(name, *n_args),
            VmCommand::Return => self.emit_return(),
        }
    }

    pub fn finish(self) -> String {
        let mut text = self.output.join("\n");
        text.push('\n');
        text
    }

    // ── Push / pop ────────────────────────────────────────────────

    fn emit_push(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                self.a(&index.to_string());
                self.c("D=A");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                self.a(base_symbol(segment));
                self.c("D=M");
                self.a(&index.to_string());
                self.c("A=D+A");
                self.c("D=M");
            }
            Segment::Temp => {
                self.a(&temp_symbol(index));
                self.c("D=M");
            }
            Segment::Pointer => {
                self.a(pointer_symbol(index));
                self.c("D=M");
            }
            Segment::Static => {
                self.a(&self.static_symbol(index));
                self.c("D=M");
            }
        }
        self.push_d();
    }

    fn emit_pop(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                unreachable!("pop constant is rejected by the VM parser")
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                // target address goes through R13; the stack value may not
                // be loaded before the address is computed
                self.a(base_symbol(segment));
                self.c("D=M");
                self.a(&index.to_string());
                self.c("D=D+A");
                self.a("R13");
                self.c("M=D");
                self.pop_to_d();
                self.a("R13");
                self.c("A=M");
                self.c("M=D");
            }
            Segment::Temp => {
                self.pop_to_d();
                self.a(&temp_symbol(index));
                self.c("M=D");
            }
            Segment::Pointer => {
                self.pop_to_d();
                self.a(pointer_symbol(index));
                self.c("M=D");
            }
            Segment::Static => {
                self.pop_to_d();
                self.a(&self.static_symbol(index));
                self.c("M=D");
            }
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────

    fn emit_arithmetic(&mut self, op: ArithOp) {
        match op {
            ArithOp::Add => self.emit_binary("M=D+M"),
            ArithOp::Sub => self.emit_binary("M=M-D"),
            ArithOp::And => self.emit_binary("M=D&M"),
            ArithOp::Or => self.emit_binary("M=D|M"),
            ArithOp::Neg => self.emit_unary("M=-M"),
            ArithOp::Not => self.emit_unary("M=!M"),
            ArithOp::Eq => self.emit_comparison("JEQ"),
            ArithOp::Gt => self.emit_comparison("JGT"),
            ArithOp::Lt => self.emit_comparison("JLT"),
        }
    }

    /// Two operands in, one out: y into D, then combine into x in place.
    fn emit_binary(&mut self, combine: &str) {
        self.pop_to_d();
        self.a("SP");
        self.c("A=M-1");
        self.c(combine);
    }

    /// Transform the topmost cell in place.
    fn emit_unary(&mut self, transform: &str) {
        self.a("SP");
        self.c("A=M-1");
        self.c(transform);
    }

    /// eq/gt/lt: compare x against y and replace x with −1 (true) or 0.
    /// Every occurrence gets its own sub-labels.
    fn emit_comparison(&mut self, jump: &str) {
        let n = self.cmp_counter;
        self.cmp_counter += 1;
        let true_label = format!("CMP_TRUE_{}", n);
        let end_label = format!("CMP_END_{}", n);

        self.pop_to_d();
        self.a("SP");
        self.c("A=M-1");
        self.c("D=M-D");
        self.a(&true_label);
        self.c(&format!("D;{}", jump));
        self.a("SP");
        self.c("A=M-1");
        self.c("M=0");
        self.a(&end_label);
        self.c("0;JMP");
        self.label_def(&true_label);
        self.a("SP");
        self.c("A=M-1");
        self.c("M=-1");
        self.label_def(&end_label);
    }

    // ── Functions ─────────────────────────────────────────────────

    fn emit_function(&mut self, name: &str, n_locals: u16) {
        self.label_def(name);
        self.current_function = name.to_string();
        // local slots start out zeroed
        for _ in 0..n_locals {
            self.a("SP");
            self.c("A=M");
            self.c("M=0");
            self.a("SP");
            self.c("M=M+1");
        }
    }

    fn emit_call(&mut self, name: &str, n_args: u16) {
        let return_label = format!("{}$ret.{}", self.current_function, self.call_counter);
        self.call_counter += 1;

        // push the return address, then the caller's frame pointers
        self.a(&return_label);
        self.c("D=A");
        self.push_d();
        for symbol in ["LCL", "ARG", "THIS", "THAT"] {
            self.a(symbol);
            self.c("D=M");
            self.push_d();
        }
        // ARG = SP - 5 - n_args
        self.a("SP");
        self.c("D=M");
        self.a(&(5 + n_args).to_string());
        self.c("D=D-A");
        self.a("ARG");
        self.c("M=D");
        // LCL = SP
        self.a("SP");
        self.c("D=M");
        self.a("LCL");
        self.c("M=D");
        self.a(name);
        self.c("0;JMP");
        self.label_def(&return_label);
    }

    fn emit_return(&mut self) {
        // frame = LCL (R13); return address = *(frame - 5) (R14).
        // The return address must be saved before *ARG is overwritten:
        // for a zero-argument call it lives in the slot ARG points at.
        self.a("LCL");
        self.c("D=M");
        self.a("R13");
        self.c("M=D");
        self.a("5");
        self.c("A=D-A");
        self.c("D=M");
        self.a("R14");
        self.c("M=D");
        // *ARG = pop(): the return value lands where the caller's stack top
        // will be
        self.pop_to_d();
        self.a("ARG");
        self.c("A=M");
        self.c("M=D");
        // SP = ARG + 1
        self.a("ARG");
        self.c("D=M+1");
        self.a("SP");
        self.c("M=D");
        // restore THAT, THIS, ARG, LCL from frame-1 .. frame-4; R13 walks
        // down one slot per restore
        for symbol in ["THAT", "THIS", "ARG", "LCL"] {
            self.a("R13");
            self.c("AM=M-1");
            self.c("D=M");
            self.a(symbol);
            self.c("M=D");
        }
        self.a("R14");
        self.c("A=M");
        self.c("0;JMP");
    }

    // ── Low-level output helpers ──────────────────────────────────

    fn qualified(&self, label: &str) -> String {
        format!("{}${}", self.current_function, label)
    }

    fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.file_stem, index)
    }

    /// `*SP = D; SP++`
    fn push_d(&mut self) {
        self.a("SP");
        self.c("A=M");
        self.c("M=D");
        self.a("SP");
        self.c("M=M+1");
    }

    /// `SP--; D = *SP`
    fn pop_to_d(&mut self) {
        self.a("SP");
        self.c("AM=M-1");
        self.c("D=M");
    }

    fn a(&mut self, symbol: &str) {
        self.output.push(format!("@{}", symbol));
    }

    fn c(&mut self, instruction: &str) {
        self.output.push(instruction.to_string());
    }

    fn label_def(&mut self, label: &str) {
        self.output.push(format!("({})", label));
    }

    fn raw(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

fn base_symbol(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!("segment {} has no base pointer", segment),
    }
}

/// The temp segment occupies RAM 5–12.
fn temp_symbol(index: u16) -> String {
    format!("R{}", 5 + index)
}

/// The pointer segment aliases THIS and THAT.
fn pointer_symbol(index: u16) -> &'static str {
    if index == 0 {
        "THIS"
    } else {
        "THAT"
    }
}
