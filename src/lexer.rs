use crate::diagnostic::Diagnostic;
use crate::lexeme::Token;
use crate::span::{Span, Spanned};

/// Largest integer constant representable on the 15-bit HACK word.
pub const MAX_INT_CONST: u32 = 32767;

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Token>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Token> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Token::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if ch == b'"' {
                return self.scan_string();
            }

            if let Some(tok) = self.scan_symbol(start) {
                return tok;
            }
            // scan_symbol returned None → error was recorded, try again
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            // Line comment: // to end of line
            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            // Block comment: /* ... */ or /** ... */, possibly spanning lines
            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'*'
            {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos + 1 >= self.source.len() {
                        self.pos = self.source.len();
                        self.diagnostics.push(
                            Diagnostic::error(
                                "unterminated block comment".to_string(),
                                Span::new(start as u32, self.pos as u32),
                            )
                            .with_help(
                                "every `/*` comment must be closed with `*/`".to_string(),
                            ),
                        );
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.source[self.pos + 1] == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Token> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let token = Token::from_keyword(text).unwrap_or_else(|| Token::Ident(text.to_string()));
        self.make_token(token, start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Token> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        match text.parse::<u32>() {
            Ok(n) if n <= MAX_INT_CONST => self.make_token(Token::IntConst(n as u16), start, self.pos),
            _ => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("integer constant '{}' is out of range", text),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help(format!("integer constants range from 0 to {}", MAX_INT_CONST)),
                );
                self.make_token(Token::IntConst(0), start, self.pos)
            }
        }
    }

    fn scan_string(&mut self) -> Spanned<Token> {
        let start = self.pos;
        self.pos += 1; // skip opening '"'
        let content_start = self.pos;
        loop {
            if self.pos >= self.source.len() || self.source[self.pos] == b'\n' {
                self.diagnostics.push(
                    Diagnostic::error(
                        "unterminated string constant".to_string(),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help(
                        "string constants must be closed with '\"' on the same line".to_string(),
                    ),
                );
                let content = std::str::from_utf8(&self.source[content_start..self.pos])
                    .unwrap()
                    .to_string();
                return self.make_token(Token::StrConst(content), start, self.pos);
            }
            if self.source[self.pos] == b'"' {
                break;
            }
            self.pos += 1;
        }
        let content = std::str::from_utf8(&self.source[content_start..self.pos])
            .unwrap()
            .to_string();
        self.pos += 1; // skip closing '"'
        self.make_token(Token::StrConst(content), start, self.pos)
    }

    fn scan_symbol(&mut self, start: usize) -> Option<Spanned<Token>> {
        let ch = self.source[self.pos];
        self.pos += 1;

        let token = match ch {
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'.' => Token::Dot,
            b',' => Token::Comma,
            b';' => Token::Semicolon,
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'&' => Token::Amp,
            b'|' => Token::Pipe,
            b'<' => Token::Lt,
            b'>' => Token::Gt,
            b'=' => Token::Eq,
            b'~' => Token::Tilde,
            _ => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("unexpected character '{}' (U+{:04X})", ch as char, ch),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help(
                        "this character is not part of the Jack language".to_string(),
                    ),
                );
                return None;
            }
        };

        Some(self.make_token(token, start, self.pos))
    }

    fn make_token(&self, token: Token, start: usize, end: usize) -> Spanned<Token> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
