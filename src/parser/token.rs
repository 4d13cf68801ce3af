use std::fmt::Display;

use miette::SourceSpan;

/// Where a token starts. `line` and `column` are 1-based and count
/// characters; `offset`/`len` are bytes into the source, for labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub len: usize,
}

impl Position {
    pub fn span(&self) -> SourceSpan {
        (self.offset, self.len).into()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    End,
    Identifier,
    Number,
    Dot,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Operator,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::End => "end of file",
            TokenKind::Identifier => "a name",
            TokenKind::Number => "a number",
            TokenKind::Dot => "'.'",
            TokenKind::OpenBrace => "'{'",
            TokenKind::CloseBrace => "'}'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Operator => "an operator",
        }
    }

    /// Tokens that can start a point expression.
    pub fn starts_point(&self) -> bool {
        matches!(self, TokenKind::OpenBrace | TokenKind::Identifier | TokenKind::OpenParen)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub at: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, at: Position) -> Self {
        Self { kind, text: text.into(), at }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "end of file"),
            _ => write!(f, "{}", self.text),
        }
    }
}
