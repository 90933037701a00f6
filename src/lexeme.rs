use crate::span::Spanned;

/// All tokens of the Jack language.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    // Keywords
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,

    // Symbols
    LBrace,    // {
    RBrace,    // }
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    Dot,       // .
    Comma,     // ,
    Semicolon, // ;
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Amp,       // &
    Pipe,      // |
    Lt,        // <
    Gt,        // >
    Eq,        // =
    Tilde,     // ~

    // Literals
    IntConst(u16),
    StrConst(String),
    Ident(String),

    // End of file
    Eof,
}

/// Lexical category of a token, as exposed by the diagnostic XML dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Keyword,
    Symbol,
    Identifier,
    IntegerLiteral,
    StringLiteral,
}

impl Category {
    /// XML tag name used in the token dump.
    pub fn xml_tag(self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::Symbol => "symbol",
            Category::Identifier => "identifier",
            Category::IntegerLiteral => "integerConstant",
            Category::StringLiteral => "stringConstant",
        }
    }
}

impl Token {
    /// Try to match an identifier string to a keyword token.
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s {
            "class" => Some(Token::Class),
            "constructor" => Some(Token::Constructor),
            "function" => Some(Token::Function),
            "method" => Some(Token::Method),
            "field" => Some(Token::Field),
            "static" => Some(Token::Static),
            "var" => Some(Token::Var),
            "int" => Some(Token::Int),
            "char" => Some(Token::Char),
            "boolean" => Some(Token::Boolean),
            "void" => Some(Token::Void),
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            "this" => Some(Token::This),
            "let" => Some(Token::Let),
            "do" => Some(Token::Do),
            "if" => Some(Token::If),
            "else" => Some(Token::Else),
            "while" => Some(Token::While),
            "return" => Some(Token::Return),
            _ => None,
        }
    }

    /// Lexical category, or `None` for the end-of-file marker.
    pub fn category(&self) -> Option<Category> {
        match self {
            Token::Class
            | Token::Constructor
            | Token::Function
            | Token::Method
            | Token::Field
            | Token::Static
            | Token::Var
            | Token::Int
            | Token::Char
            | Token::Boolean
            | Token::Void
            | Token::True
            | Token::False
            | Token::Null
            | Token::This
            | Token::Let
            | Token::Do
            | Token::If
            | Token::Else
            | Token::While
            | Token::Return => Some(Category::Keyword),
            Token::LBrace
            | Token::RBrace
            | Token::LParen
            | Token::RParen
            | Token::LBracket
            | Token::RBracket
            | Token::Dot
            | Token::Comma
            | Token::Semicolon
            | Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::Amp
            | Token::Pipe
            | Token::Lt
            | Token::Gt
            | Token::Eq
            | Token::Tilde => Some(Category::Symbol),
            Token::IntConst(_) => Some(Category::IntegerLiteral),
            Token::StrConst(_) => Some(Category::StringLiteral),
            Token::Ident(_) => Some(Category::Identifier),
            Token::Eof => None,
        }
    }

    /// Source text of the token. String literals come back without quotes.
    pub fn text(&self) -> String {
        match self {
            Token::Class => "class".to_string(),
            Token::Constructor => "constructor".to_string(),
            Token::Function => "function".to_string(),
            Token::Method => "method".to_string(),
            Token::Field => "field".to_string(),
            Token::Static => "static".to_string(),
            Token::Var => "var".to_string(),
            Token::Int => "int".to_string(),
            Token::Char => "char".to_string(),
            Token::Boolean => "boolean".to_string(),
            Token::Void => "void".to_string(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::This => "this".to_string(),
            Token::Let => "let".to_string(),
            Token::Do => "do".to_string(),
            Token::If => "if".to_string(),
            Token::Else => "else".to_string(),
            Token::While => "while".to_string(),
            Token::Return => "return".to_string(),
            Token::LBrace => "{".to_string(),
            Token::RBrace => "}".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),
            Token::Dot => ".".to_string(),
            Token::Comma => ",".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Amp => "&".to_string(),
            Token::Pipe => "|".to_string(),
            Token::Lt => "<".to_string(),
            Token::Gt => ">".to_string(),
            Token::Eq => "=".to_string(),
            Token::Tilde => "~".to_string(),
            Token::IntConst(n) => n.to_string(),
            Token::StrConst(s) => s.clone(),
            Token::Ident(name) => name.clone(),
            Token::Eof => String::new(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Token::IntConst(_) => "integer constant".to_string(),
            Token::StrConst(_) => "string constant".to_string(),
            Token::Ident(_) => "identifier".to_string(),
            Token::Eof => "end of file".to_string(),
            other => format!("'{}'", other.text()),
        }
    }
}

/// Escape the four characters that HTML-friendly XML output requires.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the token stream as the diagnostic `<tokens>` XML dump.
pub fn tokens_to_xml(tokens: &[Spanned<Token>]) -> String {
    let mut out = String::from("<tokens>\n");
    for tok in tokens {
        let Some(category) = tok.node.category() else {
            continue;
        };
        let tag = category.xml_tag();
        out.push_str(&format!(
            "<{}> {} </{}>\n",
            tag,
            xml_escape(&tok.node.text()),
            tag
        ));
    }
    out.push_str("</tokens>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Token::from_keyword("class"), Some(Token::Class));
        assert_eq!(Token::from_keyword("while"), Some(Token::While));
        assert_eq!(Token::from_keyword("Main"), None);
        assert_eq!(Token::from_keyword("classes"), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(Token::Let.category(), Some(Category::Keyword));
        assert_eq!(Token::Semicolon.category(), Some(Category::Symbol));
        assert_eq!(
            Token::Ident("x".into()).category(),
            Some(Category::Identifier)
        );
        assert_eq!(
            Token::IntConst(7).category(),
            Some(Category::IntegerLiteral)
        );
        assert_eq!(
            Token::StrConst("hi".into()).category(),
            Some(Category::StringLiteral)
        );
        assert_eq!(Token::Eof.category(), None);
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(xml_escape("<"), "&lt;");
        assert_eq!(xml_escape(">"), "&gt;");
        assert_eq!(xml_escape("&"), "&amp;");
        assert_eq!(xml_escape("\""), "&quot;");
        assert_eq!(xml_escape("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn test_token_dump_format() {
        let tokens = vec![
            Spanned::new(Token::Let, Span::dummy()),
            Spanned::new(Token::Ident("x".into()), Span::dummy()),
            Spanned::new(Token::Lt, Span::dummy()),
            Spanned::new(Token::IntConst(5), Span::dummy()),
            Spanned::new(Token::Eof, Span::dummy()),
        ];
        let xml = tokens_to_xml(&tokens);
        insta::assert_snapshot!(xml, @r###"
        <tokens>
        <keyword> let </keyword>
        <identifier> x </identifier>
        <symbol> &lt; </symbol>
        <integerConstant> 5 </integerConstant>
        </tokens>
        "###);
    }

    #[test]
    fn test_description_quotes_fixed_tokens() {
        assert_eq!(Token::LBrace.description(), "'{'");
        assert_eq!(Token::Eof.description(), "end of file");
        assert_eq!(Token::Ident("foo".into()).description(), "identifier");
    }
}
