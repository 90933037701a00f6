use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::lexeme::Token;
use crate::span::{Span, Spanned};

const MAX_NESTING_DEPTH: u32 = 256;

/// Recursive-descent parser for the Jack grammar. Token mismatches are
/// fatal: parsing stops at the first diagnostic and the caller gets every
/// accumulated error instead of an AST.
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Token>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    pub fn parse_class(mut self) -> Result<Class, Vec<Diagnostic>> {
        let class = self.class();
        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        Ok(class)
    }

    fn class(&mut self) -> Class {
        if !self.at(&Token::Class) {
            self.error_with_help(
                "expected 'class' at the start of file",
                "every .jack file defines exactly one class: `class Name { ... }`",
            );
        }
        self.expect(&Token::Class);
        let name = self.expect_name("class");
        self.expect(&Token::LBrace);

        let mut var_decs = Vec::new();
        while (self.at(&Token::Static) || self.at(&Token::Field)) && self.ok() {
            var_decs.push(self.class_var_dec());
        }

        let mut subroutines = Vec::new();
        while (self.at(&Token::Constructor) || self.at(&Token::Function) || self.at(&Token::Method))
            && self.ok()
        {
            subroutines.push(self.subroutine());
        }

        self.expect(&Token::RBrace);
        if self.ok() && !self.at(&Token::Eof) {
            self.error_at_current("expected end of file after the class body");
        }

        Class {
            name,
            var_decs,
            subroutines,
        }
    }

    fn class_var_dec(&mut self) -> ClassVarDec {
        let kind = if self.eat(&Token::Static) {
            ClassVarKind::Static
        } else {
            self.expect(&Token::Field);
            ClassVarKind::Field
        };
        let ty = self.parse_type();
        let mut names = vec![self.expect_name("variable")];
        while self.eat(&Token::Comma) {
            names.push(self.expect_name("variable"));
            if !self.ok() {
                break;
            }
        }
        self.expect(&Token::Semicolon);
        ClassVarDec { kind, ty, names }
    }

    fn subroutine(&mut self) -> Subroutine {
        let kind = match self.peek() {
            Token::Constructor => SubroutineKind::Constructor,
            Token::Method => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };
        self.advance();

        let return_ty = if self.eat(&Token::Void) {
            None
        } else {
            Some(self.parse_type())
        };
        let name = self.expect_name("subroutine");

        self.expect(&Token::LParen);
        let params = self.parameter_list();
        self.expect(&Token::RParen);

        self.expect(&Token::LBrace);
        let mut var_decs = Vec::new();
        while self.at(&Token::Var) && self.ok() {
            var_decs.push(self.var_dec());
        }
        let statements = self.statements();
        self.expect(&Token::RBrace);

        Subroutine {
            kind,
            return_ty,
            name,
            params,
            var_decs,
            statements,
        }
    }

    fn parameter_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.at(&Token::RParen) {
            return params;
        }
        loop {
            let ty = self.parse_type();
            let name = self.expect_name("parameter");
            params.push(Param { ty, name });
            if !self.eat(&Token::Comma) || !self.ok() {
                break;
            }
        }
        params
    }

    fn var_dec(&mut self) -> VarDec {
        self.expect(&Token::Var);
        let ty = self.parse_type();
        let mut names = vec![self.expect_name("variable")];
        while self.eat(&Token::Comma) {
            names.push(self.expect_name("variable"));
            if !self.ok() {
                break;
            }
        }
        self.expect(&Token::Semicolon);
        VarDec { ty, names }
    }

    fn parse_type(&mut self) -> Spanned<Type> {
        let span = self.current_span();
        match self.peek().clone() {
            Token::Int => {
                self.advance();
                Spanned::new(Type::Int, span)
            }
            Token::Char => {
                self.advance();
                Spanned::new(Type::Char, span)
            }
            Token::Boolean => {
                self.advance();
                Spanned::new(Type::Boolean, span)
            }
            Token::Ident(name) => {
                self.advance();
                Spanned::new(Type::ClassName(name), span)
            }
            other => {
                self.error_with_help(
                    &format!("expected type, found {}", other.description()),
                    "types are int, char, boolean, or a class name",
                );
                Spanned::new(Type::Int, span)
            }
        }
    }

    // --- Statements ---

    fn statements(&mut self) -> Vec<Spanned<Statement>> {
        if !self.enter_nesting() {
            return Vec::new();
        }
        let mut stmts = Vec::new();
        while self.ok() {
            let start = self.current_span();
            let stmt = match self.peek() {
                Token::Let => self.let_statement(),
                Token::If => self.if_statement(),
                Token::While => self.while_statement(),
                Token::Do => self.do_statement(),
                Token::Return => self.return_statement(),
                _ => break,
            };
            let span = start.merge(self.prev_span());
            stmts.push(Spanned::new(stmt, span));
        }
        self.exit_nesting();
        stmts
    }

    fn let_statement(&mut self) -> Statement {
        self.expect(&Token::Let);
        let name = self.expect_name("variable");
        let index = if self.eat(&Token::LBracket) {
            let expr = self.expression();
            self.expect(&Token::RBracket);
            Some(expr)
        } else {
            None
        };
        self.expect(&Token::Eq);
        let value = self.expression();
        self.expect(&Token::Semicolon);
        Statement::Let { name, index, value }
    }

    fn if_statement(&mut self) -> Statement {
        self.expect(&Token::If);
        self.expect(&Token::LParen);
        let cond = self.expression();
        self.expect(&Token::RParen);
        self.expect(&Token::LBrace);
        let then_body = self.statements();
        self.expect(&Token::RBrace);
        let else_body = if self.eat(&Token::Else) {
            self.expect(&Token::LBrace);
            let body = self.statements();
            self.expect(&Token::RBrace);
            Some(body)
        } else {
            None
        };
        Statement::If {
            cond,
            then_body,
            else_body,
        }
    }

    fn while_statement(&mut self) -> Statement {
        self.expect(&Token::While);
        self.expect(&Token::LParen);
        let cond = self.expression();
        self.expect(&Token::RParen);
        self.expect(&Token::LBrace);
        let body = self.statements();
        self.expect(&Token::RBrace);
        Statement::While { cond, body }
    }

    fn do_statement(&mut self) -> Statement {
        self.expect(&Token::Do);
        let start = self.current_span();
        let first = self.expect_name("subroutine");
        let call = if self.eat(&Token::Dot) {
            let name = self.expect_name("subroutine");
            let args = self.argument_list();
            SubroutineCall {
                receiver: Some(first),
                name,
                args,
            }
        } else {
            let args = self.argument_list();
            SubroutineCall {
                receiver: None,
                name: first,
                args,
            }
        };
        let span = start.merge(self.prev_span());
        self.expect(&Token::Semicolon);
        Statement::Do(Spanned::new(call, span))
    }

    fn return_statement(&mut self) -> Statement {
        self.expect(&Token::Return);
        let value = if self.at(&Token::Semicolon) {
            None
        } else {
            Some(self.expression())
        };
        self.expect(&Token::Semicolon);
        Statement::Return(value)
    }

    // --- Expressions ---

    /// `term (op term)*`, folded left to right. Jack has no operator
    /// precedence: `a + b * c` parses as `(a + b) * c`.
    fn expression(&mut self) -> Spanned<Expr> {
        let mut lhs = self.term();
        while self.ok() {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Amp => BinOp::And,
                Token::Pipe => BinOp::Or,
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                Token::Eq => BinOp::Eq,
                _ => break,
            };
            self.advance();
            let rhs = self.term();
            let span = lhs.span.merge(rhs.span);
            lhs = Spanned::new(
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        lhs
    }

    fn term(&mut self) -> Spanned<Expr> {
        if !self.enter_nesting() {
            return Spanned::new(Expr::IntConst(0), self.current_span());
        }
        let term = self.term_inner();
        self.exit_nesting();
        term
    }

    fn term_inner(&mut self) -> Spanned<Expr> {
        let start = self.current_span();
        match self.peek().clone() {
            Token::IntConst(n) => {
                self.advance();
                Spanned::new(Expr::IntConst(n), start)
            }
            Token::StrConst(s) => {
                self.advance();
                Spanned::new(Expr::StrConst(s), start)
            }
            Token::True => {
                self.advance();
                Spanned::new(Expr::True, start)
            }
            Token::False => {
                self.advance();
                Spanned::new(Expr::False, start)
            }
            Token::Null => {
                self.advance();
                Spanned::new(Expr::Null, start)
            }
            Token::This => {
                self.advance();
                Spanned::new(Expr::This, start)
            }
            Token::LParen => {
                self.advance();
                let inner = self.expression();
                self.expect(&Token::RParen);
                inner
            }
            Token::Minus => {
                self.advance();
                let operand = self.term();
                let span = start.merge(operand.span);
                Spanned::new(
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            Token::Tilde => {
                self.advance();
                let operand = self.term();
                let span = start.merge(operand.span);
                Spanned::new(
                    Expr::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            Token::Ident(name) => {
                self.advance();
                let name = Spanned::new(name, start);
                if self.eat(&Token::LBracket) {
                    let index = self.expression();
                    self.expect(&Token::RBracket);
                    let span = start.merge(self.prev_span());
                    Spanned::new(
                        Expr::Index {
                            name,
                            index: Box::new(index),
                        },
                        span,
                    )
                } else if self.at(&Token::LParen) {
                    let args = self.argument_list();
                    let span = start.merge(self.prev_span());
                    Spanned::new(
                        Expr::Call(SubroutineCall {
                            receiver: None,
                            name,
                            args,
                        }),
                        span,
                    )
                } else if self.eat(&Token::Dot) {
                    let method = self.expect_name("subroutine");
                    let args = self.argument_list();
                    let span = start.merge(self.prev_span());
                    Spanned::new(
                        Expr::Call(SubroutineCall {
                            receiver: Some(name),
                            name: method,
                            args,
                        }),
                        span,
                    )
                } else {
                    Spanned::new(Expr::Var(name.node), start)
                }
            }
            other => {
                self.error_with_help(
                    &format!("expected expression, found {}", other.description()),
                    "terms are constants, variables, subroutine calls, \
                     or parenthesized expressions",
                );
                Spanned::new(Expr::IntConst(0), start)
            }
        }
    }

    fn argument_list(&mut self) -> Vec<Spanned<Expr>> {
        self.expect(&Token::LParen);
        let mut args = Vec::new();
        if !self.at(&Token::RParen) && self.ok() {
            args.push(self.expression());
            while self.eat(&Token::Comma) {
                args.push(self.expression());
                if !self.ok() {
                    break;
                }
            }
        }
        self.expect(&Token::RParen);
        args
    }

    // --- Utility methods ---

    fn ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "nesting depth exceeded (maximum 256 levels)",
                "split deeply nested code into separate subroutines",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Span {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            span
        } else {
            if self.ok() {
                self.error_at_current(&format!(
                    "expected {}, found {}",
                    token.description(),
                    self.peek().description()
                ));
            }
            self.current_span()
        }
    }

    /// Accept an identifier naming a class, subroutine or variable.
    /// A leading digit is a name error, not a syntax error.
    fn expect_name(&mut self, role: &str) -> Spanned<String> {
        let span = self.current_span();
        match self.peek().clone() {
            Token::Ident(name) => {
                self.advance();
                Spanned::new(name, span)
            }
            Token::IntConst(_) => {
                self.error_with_help(
                    &format!("{} name cannot start with a digit", role),
                    "names begin with a letter or underscore",
                );
                self.advance();
                // consume the identifier tail of forms like `2x`
                if matches!(self.peek(), Token::Ident(_)) {
                    self.advance();
                }
                Spanned::new("_error_".to_string(), span)
            }
            other => {
                if self.ok() {
                    self.error_at_current(&format!(
                        "expected {} name, found {}",
                        role,
                        other.description()
                    ));
                }
                Spanned::new("_error_".to_string(), span)
            }
        }
    }

    fn error_at_current(&mut self, msg: &str) {
        self.diagnostics
            .push(Diagnostic::error(msg.to_string(), self.current_span()));
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        self.diagnostics.push(
            Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Class {
        let (tokens, lex_diags) = Lexer::new(source).tokenize();
        assert!(lex_diags.is_empty(), "lex errors: {:?}", lex_diags);
        Parser::new(tokens).parse_class().unwrap()
    }

    fn parse_err(source: &str) -> Vec<Diagnostic> {
        let (tokens, lex_diags) = Lexer::new(source).tokenize();
        if !lex_diags.is_empty() {
            return lex_diags;
        }
        match Parser::new(tokens).parse_class() {
            Ok(_) => vec![],
            Err(diags) => diags,
        }
    }

    #[test]
    fn test_empty_class() {
        let class = parse("class Main { }");
        assert_eq!(class.name.node, "Main");
        assert!(class.var_decs.is_empty());
        assert!(class.subroutines.is_empty());
    }

    #[test]
    fn test_class_var_decs() {
        let class = parse("class Point { field int x, y; static boolean debug; }");
        assert_eq!(class.var_decs.len(), 2);
        assert_eq!(class.var_decs[0].kind, ClassVarKind::Field);
        assert_eq!(class.var_decs[0].ty.node, Type::Int);
        assert_eq!(class.var_decs[0].names.len(), 2);
        assert_eq!(class.var_decs[0].names[1].node, "y");
        assert_eq!(class.var_decs[1].kind, ClassVarKind::Static);
        assert_eq!(class.var_decs[1].ty.node, Type::Boolean);
    }

    #[test]
    fn test_subroutine_kinds() {
        let class = parse(
            "class Point {\n\
             constructor Point new(int ax, int ay) { return this; }\n\
             method int getX() { return 1; }\n\
             function void print() { return; }\n\
             }",
        );
        assert_eq!(class.subroutines.len(), 3);
        assert_eq!(class.subroutines[0].kind, SubroutineKind::Constructor);
        assert_eq!(
            class.subroutines[0].return_ty.as_ref().unwrap().node,
            Type::ClassName("Point".into())
        );
        assert_eq!(class.subroutines[0].params.len(), 2);
        assert_eq!(class.subroutines[1].kind, SubroutineKind::Method);
        assert_eq!(class.subroutines[2].kind, SubroutineKind::Function);
        assert!(class.subroutines[2].return_ty.is_none());
    }

    #[test]
    fn test_var_decs() {
        let class = parse(
            "class Main { function void main() { var int i, j; var Array a; return; } }",
        );
        let sub = &class.subroutines[0];
        assert_eq!(sub.var_decs.len(), 2);
        assert_eq!(sub.var_decs[0].names.len(), 2);
        assert_eq!(
            sub.var_decs[1].ty.node,
            Type::ClassName("Array".into())
        );
    }

    #[test]
    fn test_let_statement() {
        let class = parse("class Main { function void main() { let x = 1; return; } }");
        let stmts = &class.subroutines[0].statements;
        match &stmts[0].node {
            Statement::Let { name, index, value } => {
                assert_eq!(name.node, "x");
                assert!(index.is_none());
                assert!(matches!(value.node, Expr::IntConst(1)));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_let_array_statement() {
        let class = parse("class Main { function void main() { let a[i] = a[j]; return; } }");
        match &class.subroutines[0].statements[0].node {
            Statement::Let { index, value, .. } => {
                assert!(index.is_some());
                assert!(matches!(value.node, Expr::Index { .. }));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else() {
        let class = parse(
            "class Main { function void main() { if (x) { let y = 1; } else { let y = 2; } return; } }",
        );
        match &class.subroutines[0].statements[0].node {
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                assert_eq!(then_body.len(), 1);
                assert_eq!(else_body.as_ref().unwrap().len(), 1);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_while() {
        let class =
            parse("class Main { function void main() { while (x < 10) { let x = x + 1; } return; } }");
        match &class.subroutines[0].statements[0].node {
            Statement::While { cond, body } => {
                assert!(matches!(cond.node, Expr::Binary { op: BinOp::Lt, .. }));
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_do_statement_forms() {
        let class = parse(
            "class Main { function void main() { do draw(); do Output.printInt(1, 2); return; } }",
        );
        let stmts = &class.subroutines[0].statements;
        match &stmts[0].node {
            Statement::Do(call) => {
                assert!(call.node.receiver.is_none());
                assert_eq!(call.node.name.node, "draw");
                assert!(call.node.args.is_empty());
            }
            other => panic!("expected do, got {:?}", other),
        }
        match &stmts[1].node {
            Statement::Do(call) => {
                assert_eq!(call.node.receiver.as_ref().unwrap().node, "Output");
                assert_eq!(call.node.name.node, "printInt");
                assert_eq!(call.node.args.len(), 2);
            }
            other => panic!("expected do, got {:?}", other),
        }
    }

    #[test]
    fn test_return_forms() {
        let class = parse(
            "class Main { function void a() { return; } function int b() { return 1; } }",
        );
        assert!(matches!(
            class.subroutines[0].statements[0].node,
            Statement::Return(None)
        ));
        assert!(matches!(
            class.subroutines[1].statements[0].node,
            Statement::Return(Some(_))
        ));
    }

    #[test]
    fn test_no_operator_precedence() {
        // 2 + 3 * 4 parses as (2 + 3) * 4
        let class = parse("class Main { function int f() { return 2 + 3 * 4; } }");
        let expr = match &class.subroutines[0].statements[0].node {
            Statement::Return(Some(expr)) => expr,
            other => panic!("expected return, got {:?}", other),
        };
        match &expr.node {
            Expr::Binary { op, lhs, rhs } => {
                assert_eq!(*op, BinOp::Mul);
                assert!(matches!(
                    lhs.node,
                    Expr::Binary {
                        op: BinOp::Add,
                        ..
                    }
                ));
                assert!(matches!(rhs.node, Expr::IntConst(4)));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_binds_to_term() {
        // -x + 1 parses as (-x) + 1
        let class = parse("class Main { function int f() { return -x + 1; } }");
        let expr = match &class.subroutines[0].statements[0].node {
            Statement::Return(Some(expr)) => expr,
            other => panic!("expected return, got {:?}", other),
        };
        match &expr.node {
            Expr::Binary { op, lhs, .. } => {
                assert_eq!(*op, BinOp::Add);
                assert!(matches!(
                    lhs.node,
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_grouping() {
        // 2 + (3 * 4) keeps the multiplication on the right
        let class = parse("class Main { function int f() { return 2 + (3 * 4); } }");
        let expr = match &class.subroutines[0].statements[0].node {
            Statement::Return(Some(expr)) => expr,
            other => panic!("expected return, got {:?}", other),
        };
        match &expr.node {
            Expr::Binary { op, rhs, .. } => {
                assert_eq!(*op, BinOp::Add);
                assert!(matches!(
                    rhs.node,
                    Expr::Binary {
                        op: BinOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_constants_and_string() {
        let class = parse(
            "class Main { function void f() { let a = true; let b = null; let c = this; let d = \"hi\"; return; } }",
        );
        let stmts = &class.subroutines[0].statements;
        let values: Vec<&Expr> = stmts
            .iter()
            .filter_map(|s| match &s.node {
                Statement::Let { value, .. } => Some(&value.node),
                _ => None,
            })
            .collect();
        assert!(matches!(values[0], Expr::True));
        assert!(matches!(values[1], Expr::Null));
        assert!(matches!(values[2], Expr::This));
        assert!(matches!(values[3], Expr::StrConst(s) if s == "hi"));
    }

    #[test]
    fn test_call_in_expression() {
        let class = parse(
            "class Main { function int f() { return Math.max(a, b) + g(); } }",
        );
        let expr = match &class.subroutines[0].statements[0].node {
            Statement::Return(Some(expr)) => expr,
            other => panic!("expected return, got {:?}", other),
        };
        match &expr.node {
            Expr::Binary { lhs, rhs, .. } => {
                match &lhs.node {
                    Expr::Call(call) => {
                        assert_eq!(call.receiver.as_ref().unwrap().node, "Math");
                        assert_eq!(call.args.len(), 2);
                    }
                    other => panic!("expected call, got {:?}", other),
                }
                assert!(matches!(&rhs.node, Expr::Call(c) if c.receiver.is_none()));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    // --- Error path tests ---

    #[test]
    fn test_error_missing_class() {
        let diags = parse_err("function void main() {}");
        assert!(!diags.is_empty());
        assert!(
            diags[0].message.contains("expected 'class'"),
            "got: {}",
            diags[0].message
        );
        assert!(diags[0].help.is_some());
    }

    #[test]
    fn test_error_missing_semicolon() {
        let diags = parse_err("class Main { function void main() { return } }");
        assert!(!diags.is_empty());
        assert!(
            diags[0].message.contains("expected expression")
                || diags[0].message.contains("expected ';'"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_digit_class_name() {
        let diags = parse_err("class 2Main { }");
        assert!(!diags.is_empty());
        assert!(
            diags[0].message.contains("class name cannot start with a digit"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_digit_variable_name() {
        let diags = parse_err("class Main { field int 2x; }");
        assert!(!diags.is_empty());
        assert!(
            diags[0]
                .message
                .contains("variable name cannot start with a digit"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_digit_subroutine_name() {
        let diags = parse_err("class Main { function void 9go() { return; } }");
        assert!(!diags.is_empty());
        assert!(
            diags[0]
                .message
                .contains("subroutine name cannot start with a digit"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_expected_expression() {
        let diags = parse_err("class Main { function void main() { let x = ; return; } }");
        assert!(!diags.is_empty());
        assert!(
            diags[0].message.contains("expected expression"),
            "got: {}",
            diags[0].message
        );
        assert!(diags[0].help.is_some());
    }

    #[test]
    fn test_error_missing_closing_brace() {
        let diags = parse_err("class Main { function void main() { return;");
        assert!(!diags.is_empty());
        assert!(
            diags[0].message.contains("expected '}'"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_trailing_tokens() {
        let diags = parse_err("class Main { } class Other { }");
        assert!(!diags.is_empty());
        assert!(
            diags[0].message.contains("expected end of file"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_shows_expected_and_found() {
        let diags = parse_err("class Main { function void main [ } }");
        assert!(!diags.is_empty());
        let msg = &diags[0].message;
        assert!(
            msg.contains("expected") && msg.contains("found"),
            "got: {}",
            msg
        );
    }
}
