use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::Spanned;
use crate::symtab::{Kind, Symbol, SymbolTable};
use crate::vm::{ArithOp, Segment, VmCommand};

/// VM emitter — walks a parsed class and produces VM commands, resolving
/// identifiers through the two-scope symbol table as it goes.
pub struct Emitter {
    class_name: String,
    class_scope: SymbolTable,
    routine_scope: SymbolTable,
    /// Unqualified name of the subroutine being compiled, used to
    /// manufacture branch labels.
    current_fn: String,
    /// Branch label counter; reset at every subroutine.
    label_counter: u32,
    output: Vec<VmCommand>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            class_name: String::new(),
            class_scope: SymbolTable::new(),
            routine_scope: SymbolTable::new(),
            current_fn: String::new(),
            label_counter: 0,
            output: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn emit_class(mut self, class: &Class) -> Result<Vec<VmCommand>, Vec<Diagnostic>> {
        self.class_name = class.name.node.clone();

        for dec in &class.var_decs {
            let kind = match dec.kind {
                ClassVarKind::Static => Kind::Static,
                ClassVarKind::Field => Kind::Field,
            };
            for name in &dec.names {
                self.define(true, name, dec.ty.node.name(), kind);
            }
        }

        for subroutine in &class.subroutines {
            self.emit_subroutine(subroutine);
        }

        if self.diagnostics.is_empty() {
            Ok(self.output)
        } else {
            Err(self.diagnostics)
        }
    }

    fn emit_subroutine(&mut self, sub: &Subroutine) {
        self.routine_scope.clear();
        self.label_counter = 0;
        self.current_fn = sub.name.node.clone();

        // The implicit receiver occupies argument 0 of every method, so
        // declared parameters number from 1.
        if sub.kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            let this_name = Spanned::new("this".to_string(), sub.name.span);
            self.define(false, &this_name, &class_name, Kind::Argument);
        }
        for param in &sub.params {
            self.define(false, &param.name, param.ty.node.name(), Kind::Argument);
        }
        for dec in &sub.var_decs {
            for name in &dec.names {
                self.define(false, name, dec.ty.node.name(), Kind::Local);
            }
        }

        let qualified = format!("{}.{}", self.class_name, sub.name.node);
        let n_locals = self.routine_scope.var_count(Kind::Local);
        self.emit(VmCommand::Function(qualified, n_locals));

        match sub.kind {
            SubroutineKind::Constructor => {
                let n_fields = self.class_scope.var_count(Kind::Field);
                self.emit(VmCommand::Push(Segment::Constant, n_fields));
                self.emit(VmCommand::Call("Memory.alloc".to_string(), 1));
                self.emit(VmCommand::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Method => {
                self.emit(VmCommand::Push(Segment::Argument, 0));
                self.emit(VmCommand::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Function => {}
        }

        self.emit_statements(&sub.statements);
    }

    fn emit_statements(&mut self, statements: &[Spanned<Statement>]) {
        for statement in statements {
            self.emit_statement(statement);
        }
    }

    fn emit_statement(&mut self, statement: &Spanned<Statement>) {
        match &statement.node {
            Statement::Let { name, index, value } => self.emit_let(name, index, value),
            Statement::If {
                cond,
                then_body,
                else_body,
            } => self.emit_if(cond, then_body, else_body),
            Statement::While { cond, body } => self.emit_while(cond, body),
            Statement::Do(call) => {
                self.emit_call(call);
                self.emit(VmCommand::Pop(Segment::Temp, 0));
            }
            Statement::Return(value) => {
                match value {
                    Some(expr) => self.emit_expr(expr),
                    None => self.emit(VmCommand::Push(Segment::Constant, 0)),
                }
                self.emit(VmCommand::Return);
            }
        }
    }

    fn emit_let(
        &mut self,
        name: &Spanned<String>,
        index: &Option<Spanned<Expr>>,
        value: &Spanned<Expr>,
    ) {
        let Some(target) = self.resolve(name) else {
            return;
        };

        match index {
            None => {
                self.emit_expr(value);
                self.emit(VmCommand::Pop(target.kind.segment(), target.index));
            }
            Some(index_expr) => {
                // Base plus offset first; the value may itself go through
                // `that`, so it is parked in temp 0 while pointer 1 is set.
                self.emit(VmCommand::Push(target.kind.segment(), target.index));
                self.emit_expr(index_expr);
                self.emit(VmCommand::Arithmetic(ArithOp::Add));
                self.emit_expr(value);
                self.emit(VmCommand::Pop(Segment::Temp, 0));
                self.emit(VmCommand::Pop(Segment::Pointer, 1));
                self.emit(VmCommand::Push(Segment::Temp, 0));
                self.emit(VmCommand::Pop(Segment::That, 0));
            }
        }
    }

    fn emit_if(
        &mut self,
        cond: &Spanned<Expr>,
        then_body: &[Spanned<Statement>],
        else_body: &Option<Vec<Spanned<Statement>>>,
    ) {
        let n = self.fresh_label();
        let else_label = format!("IF_FALSE_{}_{}", self.current_fn, n);
        let end_label = format!("IF_END_{}_{}", self.current_fn, n);

        self.emit_expr(cond);
        self.emit(VmCommand::Arithmetic(ArithOp::Not));
        self.emit(VmCommand::IfGoto(else_label.clone()));
        self.emit_statements(then_body);
        self.emit(VmCommand::Goto(end_label.clone()));
        self.emit(VmCommand::Label(else_label));
        if let Some(body) = else_body {
            self.emit_statements(body);
        }
        self.emit(VmCommand::Label(end_label));
    }

    fn emit_while(&mut self, cond: &Spanned<Expr>, body: &[Spanned<Statement>]) {
        let n = self.fresh_label();
        let loop_label = format!("WHILE_{}_{}", self.current_fn, n);
        let end_label = format!("WHILE_END_{}_{}", self.current_fn, n);

        self.emit(VmCommand::Label(loop_label.clone()));
        self.emit_expr(cond);
        self.emit(VmCommand::Arithmetic(ArithOp::Not));
        self.emit(VmCommand::IfGoto(end_label.clone()));
        self.emit_statements(body);
        self.emit(VmCommand::Goto(loop_label));
        self.emit(VmCommand::Label(end_label));
    }

    fn emit_expr(&mut self, expr: &Spanned<Expr>) {
        match &expr.node {
            Expr::IntConst(n) => self.emit(VmCommand::Push(Segment::Constant, *n)),
            Expr::StrConst(s) => self.emit_string(s),
            Expr::True => {
                self.emit(VmCommand::Push(Segment::Constant, 0));
                self.emit(VmCommand::Arithmetic(ArithOp::Not));
            }
            Expr::False | Expr::Null => self.emit(VmCommand::Push(Segment::Constant, 0)),
            Expr::This => self.emit(VmCommand::Push(Segment::Pointer, 0)),
            Expr::Var(name) => {
                let spanned = Spanned::new(name.clone(), expr.span);
                if let Some(sym) = self.resolve(&spanned) {
                    self.emit(VmCommand::Push(sym.kind.segment(), sym.index));
                }
            }
            Expr::Index { name, index } => {
                if let Some(sym) = self.resolve(name) {
                    self.emit(VmCommand::Push(sym.kind.segment(), sym.index));
                    self.emit_expr(index);
                    self.emit(VmCommand::Arithmetic(ArithOp::Add));
                    self.emit(VmCommand::Pop(Segment::Pointer, 1));
                    self.emit(VmCommand::Push(Segment::That, 0));
                }
            }
            Expr::Call(call) => {
                let spanned = Spanned::new(call.clone(), expr.span);
                self.emit_call(&spanned);
            }
            Expr::Unary { op, operand } => {
                self.emit_expr(operand);
                match op {
                    UnaryOp::Neg => self.emit(VmCommand::Arithmetic(ArithOp::Neg)),
                    UnaryOp::Not => self.emit(VmCommand::Arithmetic(ArithOp::Not)),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                self.emit_expr(lhs);
                self.emit_expr(rhs);
                match op {
                    BinOp::Add => self.emit(VmCommand::Arithmetic(ArithOp::Add)),
                    BinOp::Sub => self.emit(VmCommand::Arithmetic(ArithOp::Sub)),
                    BinOp::And => self.emit(VmCommand::Arithmetic(ArithOp::And)),
                    BinOp::Or => self.emit(VmCommand::Arithmetic(ArithOp::Or)),
                    BinOp::Lt => self.emit(VmCommand::Arithmetic(ArithOp::Lt)),
                    BinOp::Gt => self.emit(VmCommand::Arithmetic(ArithOp::Gt)),
                    BinOp::Eq => self.emit(VmCommand::Arithmetic(ArithOp::Eq)),
                    BinOp::Mul => self.emit(VmCommand::Call("Math.multiply".to_string(), 2)),
                    BinOp::Div => self.emit(VmCommand::Call("Math.divide".to_string(), 2)),
                }
            }
        }
    }

    /// String constants are built at runtime, one appendChar per character.
    fn emit_string(&mut self, s: &str) {
        self.emit(VmCommand::Push(Segment::Constant, s.len() as u16));
        self.emit(VmCommand::Call("String.new".to_string(), 1));
        for ch in s.chars() {
            self.emit(VmCommand::Push(Segment::Constant, ch as u16));
            self.emit(VmCommand::Call("String.appendChar".to_string(), 2));
        }
    }

    fn emit_call(&mut self, call: &Spanned<SubroutineCall>) {
        let n_args = call.node.args.len() as u16;
        match &call.node.receiver {
            // Bare call: a method on the current object.
            None => {
                self.emit(VmCommand::Push(Segment::Pointer, 0));
                self.emit_args(&call.node.args);
                let qualified = format!("{}.{}", self.class_name, call.node.name.node);
                self.emit(VmCommand::Call(qualified, 1 + n_args));
            }
            Some(receiver) => match self.lookup(&receiver.node).cloned() {
                // Receiver is a variable: a method on that object.
                Some(sym) => {
                    self.emit(VmCommand::Push(sym.kind.segment(), sym.index));
                    self.emit_args(&call.node.args);
                    let qualified = format!("{}.{}", sym.ty, call.node.name.node);
                    self.emit(VmCommand::Call(qualified, 1 + n_args));
                }
                // Receiver is a class name: a static call.
                None => {
                    self.emit_args(&call.node.args);
                    let qualified = format!("{}.{}", receiver.node, call.node.name.node);
                    self.emit(VmCommand::Call(qualified, n_args));
                }
            },
        }
    }

    fn emit_args(&mut self, args: &[Spanned<Expr>]) {
        for arg in args {
            self.emit_expr(arg);
        }
    }

    // --- Symbol handling ---

    fn define(&mut self, class_scope: bool, name: &Spanned<String>, ty: &str, kind: Kind) {
        let scope = if class_scope {
            &mut self.class_scope
        } else {
            &mut self.routine_scope
        };
        if let Err(previous) = scope.define(&name.node, ty, kind) {
            self.diagnostics.push(
                Diagnostic::error(
                    format!("duplicate declaration of '{}'", name.node),
                    name.span,
                )
                .with_note(format!(
                    "'{}' is already declared as a {} variable",
                    name.node,
                    previous.kind.as_str()
                )),
            );
        }
    }

    /// Subroutine scope shadows class scope.
    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.routine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    fn resolve(&mut self, name: &Spanned<String>) -> Option<Symbol> {
        match self.lookup(&name.node).cloned() {
            Some(sym) => Some(sym),
            None => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("undefined variable '{}'", name.node),
                        name.span,
                    )
                    .with_help(
                        "variables must be declared with var, field, static, \
                         or as a parameter before use"
                            .to_string(),
                    ),
                );
                None
            }
        }
    }

    fn fresh_label(&mut self) -> u32 {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    fn emit(&mut self, command: VmCommand) {
        self.output.push(command);
    }
}
