use crate::span::Spanned;

/// A parsed `.jack` file: exactly one class.
#[derive(Clone, Debug)]
pub struct Class {
    pub name: Spanned<String>,
    pub var_decs: Vec<ClassVarDec>,
    pub subroutines: Vec<Subroutine>,
}

/// `static`/`field` declaration: one kind, one type, one or more names.
#[derive(Clone, Debug)]
pub struct ClassVarDec {
    pub kind: ClassVarKind,
    pub ty: Spanned<Type>,
    pub names: Vec<Spanned<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

/// Syntactic types (as written in source).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Boolean,
    ClassName(String),
}

impl Type {
    /// The type name as recorded in the symbol table.
    pub fn name(&self) -> &str {
        match self {
            Type::Int => "int",
            Type::Char => "char",
            Type::Boolean => "boolean",
            Type::ClassName(name) => name,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

#[derive(Clone, Debug)]
pub struct Subroutine {
    pub kind: SubroutineKind,
    /// `None` for `void`.
    pub return_ty: Option<Spanned<Type>>,
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub var_decs: Vec<VarDec>,
    pub statements: Vec<Spanned<Statement>>,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub ty: Spanned<Type>,
    pub name: Spanned<String>,
}

/// `var` declaration inside a subroutine body.
#[derive(Clone, Debug)]
pub struct VarDec {
    pub ty: Spanned<Type>,
    pub names: Vec<Spanned<String>>,
}

#[derive(Clone, Debug)]
pub enum Statement {
    Let {
        name: Spanned<String>,
        /// Present for `let name[index] = value;`.
        index: Option<Spanned<Expr>>,
        value: Spanned<Expr>,
    },
    If {
        cond: Spanned<Expr>,
        then_body: Vec<Spanned<Statement>>,
        else_body: Option<Vec<Spanned<Statement>>>,
    },
    While {
        cond: Spanned<Expr>,
        body: Vec<Spanned<Statement>>,
    },
    Do(Spanned<SubroutineCall>),
    Return(Option<Spanned<Expr>>),
}

/// Expressions. Binary chains are folded left-to-right by the parser;
/// Jack has no operator precedence, so `a + b * c` is `(a + b) * c`.
#[derive(Clone, Debug)]
pub enum Expr {
    IntConst(u16),
    StrConst(String),
    True,
    False,
    Null,
    This,
    Var(String),
    Index {
        name: Spanned<String>,
        index: Box<Spanned<Expr>>,
    },
    Call(SubroutineCall),
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
}

/// `f(args)` or `receiver.f(args)`; the receiver is resolved against the
/// symbol table only at code-generation time.
#[derive(Clone, Debug)]
pub struct SubroutineCall {
    pub receiver: Option<Spanned<String>>,
    pub name: Spanned<String>,
    pub args: Vec<Spanned<Expr>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    And, // &
    Or,  // |
    Lt,  // <
    Gt,  // >
    Eq,  // =
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Eq => "=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Not, // ~
}
