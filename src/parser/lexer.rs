//! Hand-written lexer for the painting language.
//!
//! Characters accumulate in a buffer until a delimiter (whitespace, `#`,
//! brackets, `*` or `/`) or the end of the line is reached; the buffer is then
//! classified as a number or an identifier. `.` is the one context-sensitive
//! character:
//!
//! ```text
//! a.ne        identifier, dot, identifier
//! 3.5 -.5     part of a number
//! {1 2}.x     dot right after a closing bracket
//! ```
//!
//! A lone `+`/`-` is an operator only right after `(`, anywhere else signs
//! belong to a number.

use log::debug;

use super::token::{Position, Token, TokenKind};
use crate::error::{LexError, PaintError};

pub fn tokenize(src: &str, file: &str) -> Result<Vec<Token>, PaintError> {
    Lexer::new(file).run(src)
}

pub struct Lexer<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    buffer: String,
    buffer_at: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a str) -> Self {
        Self {
            file,
            tokens: Vec::new(),
            buffer: String::new(),
            buffer_at: Position::default(),
        }
    }

    pub fn run(mut self, src: &str) -> Result<Vec<Token>, PaintError> {
        let mut offset = 0;
        let mut last_line = 0;

        for (index, raw) in src.split_inclusive('\n').enumerate() {
            last_line = index + 1;
            let text = raw.trim_end_matches('\n').trim_end_matches('\r');

            self.scan_line(text, last_line, offset)?;
            offset += raw.len();
        }

        let end = Position { line: last_line + 1, column: 0, offset: src.len(), len: 0 };
        self.tokens.push(Token::new(TokenKind::End, "", end));

        debug!("{}: {} tokens", self.file, self.tokens.len());

        Ok(self.tokens)
    }

    fn scan_line(&mut self, text: &str, line: usize, line_offset: usize) -> Result<(), PaintError> {
        for (column, (byte, c)) in text.char_indices().enumerate() {
            let at = Position {
                line,
                column: column + 1,
                offset: line_offset + byte,
                len: c.len_utf8(),
            };

            match c {
                '#' => break,
                c if c.is_whitespace() => self.flush()?,
                '{' => self.single(TokenKind::OpenBrace, c, at)?,
                '}' => self.single(TokenKind::CloseBrace, c, at)?,
                '(' => self.single(TokenKind::OpenParen, c, at)?,
                ')' => self.single(TokenKind::CloseParen, c, at)?,
                '*' | '/' => self.single(TokenKind::Operator, c, at)?,
                '.' => self.dot(at)?,
                c => self.accumulate(c, at),
            }
        }

        // tokens never span lines
        self.flush()
    }

    fn accumulate(&mut self, c: char, at: Position) {
        if self.buffer.is_empty() {
            self.buffer_at = Position { len: 0, ..at };
        }

        self.buffer.push(c);
        self.buffer_at.len += c.len_utf8();
    }

    fn single(&mut self, kind: TokenKind, c: char, at: Position) -> Result<(), PaintError> {
        self.flush()?;
        self.tokens.push(Token::new(kind, c, at));
        Ok(())
    }

    fn dot(&mut self, at: Position) -> Result<(), PaintError> {
        if self.buffer.is_empty() {
            let after_bracket = self
                .tokens
                .last()
                .is_some_and(|t| matches!(t.kind, TokenKind::CloseBrace | TokenKind::CloseParen));

            if after_bracket {
                self.tokens.push(Token::new(TokenKind::Dot, ".", at));
            } else {
                self.accumulate('.', at);
            }

            return Ok(());
        }

        if is_identifier(&self.buffer) {
            self.flush()?;
            self.tokens.push(Token::new(TokenKind::Dot, ".", at));
        } else {
            self.accumulate('.', at);
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), PaintError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let text = std::mem::take(&mut self.buffer);
        let kind = self
            .classify(&text)
            .map_err(|kind| PaintError::lex(self.file, self.buffer_at, kind))?;

        self.tokens.push(Token::new(kind, text, self.buffer_at));
        Ok(())
    }

    fn classify(&self, text: &str) -> Result<TokenKind, LexError> {
        let digits = text.chars().filter(char::is_ascii_digit).count();
        let dots = text.chars().filter(|c| *c == '.').count();
        let signs = text.chars().filter(|c| matches!(c, '+' | '-')).count();

        if digits + dots + signs == text.chars().count() {
            if digits == 0 {
                let after_paren = self.tokens.last().is_some_and(|t| t.is(TokenKind::OpenParen));

                return match (text, signs) {
                    ("+" | "-", _) if after_paren => Ok(TokenKind::Operator),
                    (_, 0) => Err(LexError::InvalidElement(text.to_owned())),
                    _ => Err(LexError::MisplacedOperator(text.to_owned())),
                };
            }

            let leading_sign = text.starts_with(['+', '-']);
            if signs > 1 || (signs == 1 && !leading_sign) {
                return Err(LexError::MisplacedOperator(text.to_owned()));
            }

            if dots > 1 {
                return Err(LexError::InvalidElement(text.to_owned()));
            }

            return Ok(TokenKind::Number);
        }

        if is_identifier(text) {
            Ok(TokenKind::Identifier)
        } else {
            Err(LexError::InvalidElement(text.to_owned()))
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();

    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use const_format::formatcp;
    use proptest::prelude::*;
    use TokenKind::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        tokenize(src, "test.paint")
            .unwrap_or_else(|err| panic!("failed to tokenize \"{src}\": {err}"))
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn lex_error(src: &str) -> LexError {
        let err = tokenize(src, "test.paint").expect_err("tokenized invalid input");
        err.lex_kind().cloned().expect("not a lex error")
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_owned())
    }

    mod classification {
        use super::*;

        #[test]
        fn statements() {
            let test_cases = vec![
                (
                    "size 10 10",
                    vec![tok(Identifier, "size"), tok(Number, "10"), tok(Number, "10"), tok(End, "")],
                ),
                (
                    "circ a {5 5} 3",
                    vec![
                        tok(Identifier, "circ"),
                        tok(Identifier, "a"),
                        tok(OpenBrace, "{"),
                        tok(Number, "5"),
                        tok(Number, "5"),
                        tok(CloseBrace, "}"),
                        tok(Number, "3"),
                        tok(End, ""),
                    ],
                ),
                (
                    "fill a{1 0 .5}",
                    vec![
                        tok(Identifier, "fill"),
                        tok(Identifier, "a"),
                        tok(OpenBrace, "{"),
                        tok(Number, "1"),
                        tok(Number, "0"),
                        tok(Number, ".5"),
                        tok(CloseBrace, "}"),
                        tok(End, ""),
                    ],
                ),
            ];

            for (src, expected) in test_cases {
                assert_eq!(kinds(src), expected, "{src}");
            }
        }

        #[test]
        fn comments_and_blank_lines_are_skipped() {
            let src = "# header\n\nsize 1 2 # trailing\n   # indented\n";
            assert_eq!(
                kinds(src),
                vec![tok(Identifier, "size"), tok(Number, "1"), tok(Number, "2"), tok(End, "")]
            );
        }

        #[test]
        fn signed_and_fractional_numbers() {
            assert_eq!(
                kinds("-3 +4.5 -.5 7. 0.25"),
                vec![
                    tok(Number, "-3"),
                    tok(Number, "+4.5"),
                    tok(Number, "-.5"),
                    tok(Number, "7."),
                    tok(Number, "0.25"),
                    tok(End, ""),
                ]
            );
        }

        #[test]
        fn identifiers_with_underscores_and_digits() {
            assert_eq!(
                kinds("big_circle2 v0"),
                vec![tok(Identifier, "big_circle2"), tok(Identifier, "v0"), tok(End, "")]
            );
        }
    }

    mod dots {
        use super::*;

        #[test]
        fn member_access() {
            assert_eq!(
                kinds("a.ne.x"),
                vec![
                    tok(Identifier, "a"),
                    tok(Dot, "."),
                    tok(Identifier, "ne"),
                    tok(Dot, "."),
                    tok(Identifier, "x"),
                    tok(End, ""),
                ]
            );
        }

        #[test]
        fn coordinate_of_literal_point() {
            assert_eq!(
                kinds("{1 2}.y"),
                vec![
                    tok(OpenBrace, "{"),
                    tok(Number, "1"),
                    tok(Number, "2"),
                    tok(CloseBrace, "}"),
                    tok(Dot, "."),
                    tok(Identifier, "y"),
                    tok(End, ""),
                ]
            );
        }

        #[test]
        fn coordinate_of_point_expression() {
            assert_eq!(
                kinds("(* a.c 2).x"),
                vec![
                    tok(OpenParen, "("),
                    tok(Operator, "*"),
                    tok(Identifier, "a"),
                    tok(Dot, "."),
                    tok(Identifier, "c"),
                    tok(Number, "2"),
                    tok(CloseParen, ")"),
                    tok(Dot, "."),
                    tok(Identifier, "x"),
                    tok(End, ""),
                ]
            );
        }

        #[test]
        fn too_many_dots() {
            assert_eq!(lex_error("1.2.3"), LexError::InvalidElement("1.2.3".into()));
        }

        #[test]
        fn stray_dot() {
            assert_eq!(lex_error("size . 3"), LexError::InvalidElement(".".into()));
        }
    }

    mod operators {
        use super::*;

        #[test]
        fn signs_after_paren_are_operators() {
            assert_eq!(
                kinds("(+ {1 2} {3 4}) (-{0 0} a.c)"),
                vec![
                    tok(OpenParen, "("),
                    tok(Operator, "+"),
                    tok(OpenBrace, "{"),
                    tok(Number, "1"),
                    tok(Number, "2"),
                    tok(CloseBrace, "}"),
                    tok(OpenBrace, "{"),
                    tok(Number, "3"),
                    tok(Number, "4"),
                    tok(CloseBrace, "}"),
                    tok(CloseParen, ")"),
                    tok(OpenParen, "("),
                    tok(Operator, "-"),
                    tok(OpenBrace, "{"),
                    tok(Number, "0"),
                    tok(Number, "0"),
                    tok(CloseBrace, "}"),
                    tok(Identifier, "a"),
                    tok(Dot, "."),
                    tok(Identifier, "c"),
                    tok(CloseParen, ")"),
                    tok(End, ""),
                ]
            );
        }

        #[test]
        fn star_and_slash_always_split() {
            assert_eq!(
                kinds("2*3/4"),
                vec![
                    tok(Number, "2"),
                    tok(Operator, "*"),
                    tok(Number, "3"),
                    tok(Operator, "/"),
                    tok(Number, "4"),
                    tok(End, ""),
                ]
            );
        }

        #[test]
        fn lone_sign_outside_parens() {
            assert_eq!(lex_error("size - 3"), LexError::MisplacedOperator("-".into()));
        }

        #[test]
        fn sign_in_the_middle() {
            assert_eq!(lex_error("circ a {1-2 3} 4"), LexError::MisplacedOperator("1-2".into()));
            assert_eq!(lex_error("3+"), LexError::MisplacedOperator("3+".into()));
            assert_eq!(lex_error("--3"), LexError::MisplacedOperator("--3".into()));
        }

        #[test]
        fn invalid_elements() {
            assert_eq!(lex_error("1a"), LexError::InvalidElement("1a".into()));
            assert_eq!(lex_error("a-b"), LexError::InvalidElement("a-b".into()));
            assert_eq!(lex_error("_a"), LexError::InvalidElement("_a".into()));
            assert_eq!(lex_error("size $"), LexError::InvalidElement("$".into()));
        }
    }

    mod positions {
        use super::*;

        #[test]
        fn tokens_report_their_start() {
            let tokens = tokenize("size 10 10\ncirc  abc {5 5} 3", "p.paint").unwrap();
            let at = |i: usize| (tokens[i].at.line, tokens[i].at.column);

            assert_eq!(at(0), (1, 1));
            assert_eq!(at(1), (1, 6));
            assert_eq!(at(2), (1, 9));
            assert_eq!(at(3), (2, 1));
            assert_eq!(at(4), (2, 7));
            assert_eq!(at(5), (2, 11));
            assert_eq!(at(9), (2, 17));
        }

        #[test]
        fn spans_point_into_the_source() {
            let src = "size 1 1\ncirc name {0 0} 1";
            let tokens = tokenize(src, "p.paint").unwrap();
            let name = &tokens[4];

            assert_eq!(&src[name.at.offset..name.at.offset + name.at.len], "name");
        }

        #[test]
        fn single_end_token_after_last_line() {
            let tokens = tokenize("size 1 1\nfill a b\n", "p.paint").unwrap();
            let end = tokens.last().unwrap();

            assert_eq!(tokens.iter().filter(|t| t.is(End)).count(), 1);
            assert_eq!((end.at.line, end.at.column), (3, 0));

            let empty = tokenize("", "p.paint").unwrap();
            assert_eq!(empty.len(), 1);
            assert_eq!(empty[0].at.line, 1);
        }

        #[test]
        fn error_position() {
            let err = tokenize("size 1 1\n  circ 2x", "bad.paint").unwrap_err();

            assert_eq!(err.position(), Some((2, 8)));
            assert_eq!(err.to_string(), "bad.paint:2:8: error: invalid element ('2x').");
        }

        #[test]
        fn windows_line_endings() {
            let tokens = tokenize("size 1 1\r\ncirc a {0 0} 1\r\n", "p.paint").unwrap();

            assert_eq!(tokens[3].text, "circ");
            assert_eq!(tokens.last().unwrap().at.line, 3);
        }
    }

    const IDENTIFIER_REGEX: &str = formatcp!("[a-zA-Z][a-zA-Z0-9_]{{0,12}}");

    proptest! {
        #[test]
        fn any_uint_is_a_number(n: u32) {
            let text = n.to_string();
            prop_assert_eq!(kinds(&text), vec![tok(Number, &text), tok(End, "")]);
        }

        #[test]
        fn signed_decimals_are_numbers(int: u16, frac: u16, negative: bool) {
            let text = format!("{}{int}.{frac}", if negative { "-" } else { "+" });
            prop_assert_eq!(kinds(&text), vec![tok(Number, &text), tok(End, "")]);
        }

        #[test]
        fn identifiers(s in IDENTIFIER_REGEX) {
            prop_assert_eq!(kinds(&s), vec![tok(Identifier, &s), tok(End, "")]);
        }

        #[test]
        fn member_access_always_splits(shape in IDENTIFIER_REGEX, point in IDENTIFIER_REGEX) {
            let src = format!("{shape}.{point}");
            prop_assert_eq!(
                kinds(&src),
                vec![tok(Identifier, &shape), tok(Dot, "."), tok(Identifier, &point), tok(End, "")]
            );
        }

        #[test]
        fn digit_prefix_is_never_an_identifier(n: u8, s in "[a-zA-Z_]+") {
            let src = format!("{n}{s}");
            let err = tokenize(&src, "p.paint");
            prop_assert!(err.is_err());
        }
    }
}
