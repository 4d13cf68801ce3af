//! Recursive-descent parser building a [`Scene`] straight from the token
//! stream. Name resolution and range checks happen as each declaration is
//! read, and the first error aborts the parse.

pub mod lexer;
pub mod token;

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use palette::Srgb;

use crate::{
    error::{PaintError, ParseError},
    geometry::{Point, Rgb, ShapeId, ShapeKind},
    scene::{Scene, symbol_table::closest},
};
use token::{Position, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Circle,
    Ellipse,
    Rectangle,
    Triangle,
    Shift,
    Rotate,
    Union,
    Difference,
    Color,
    Fill,
}

pub const SIZE_KEYWORD: &str = "size";

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = HashMap::from([
        ("circ", Keyword::Circle),
        ("elli", Keyword::Ellipse),
        ("rect", Keyword::Rectangle),
        ("tri", Keyword::Triangle),
        ("shift", Keyword::Shift),
        ("rot", Keyword::Rotate),
        ("union", Keyword::Union),
        ("diff", Keyword::Difference),
        ("color", Keyword::Color),
        ("fill", Keyword::Fill),
    ]);
}

pub fn parse(src: &str, file: &str) -> Result<Scene, PaintError> {
    let tokens = lexer::tokenize(src, file)?;
    Parser::new(file, tokens).run()
}

type ParseResult<T> = Result<T, PaintError>;

pub struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
    scene: Scene,
}

impl<'a> Parser<'a> {
    pub fn new(file: &'a str, mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::End)) {
            let at = tokens.last().map(|t| t.at).unwrap_or_default();
            tokens.push(Token::new(TokenKind::End, "", Position { line: at.line + 1, column: 0, ..at }));
        }

        Self {
            file,
            tokens,
            cursor: 0,
            scene: Scene::default(),
        }
    }

    pub fn run(mut self) -> ParseResult<Scene> {
        self.size()?;

        while !self.peek().is(TokenKind::End) {
            self.instruction()?;
        }

        debug!("{}: {}", self.file, self.scene.stats().to_string().replace('\n', ", "));

        Ok(self.scene)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// Consumes the current token. `End` is never consumed.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        if !token.is(TokenKind::End) {
            self.cursor += 1;
        }
        token
    }

    fn error(&self, at: Position, kind: ParseError) -> PaintError {
        PaintError::parse(self.file, at, kind)
    }

    fn unexpected(&self, expected: &str) -> PaintError {
        let token = self.peek();
        self.error(
            token.at,
            ParseError::Expected {
                expected: expected.to_owned(),
                found: token.to_string(),
            },
        )
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        self.expect_described(kind, kind.describe())
    }

    fn expect_described(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.peek().is(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn size(&mut self) -> ParseResult<()> {
        let token = self.peek();
        if !(token.is(TokenKind::Identifier) && token.text == SIZE_KEYWORD) {
            return Err(self.error(token.at, ParseError::MissingSize(token.to_string())));
        }
        let at = token.at;
        self.advance();

        let width = self.dimension("width")?;
        let height = self.dimension("height")?;

        // three bytes per pixel, within what a single allocation may hold
        let bytes = width.checked_mul(height).and_then(|pixels| pixels.checked_mul(3));
        if !bytes.is_some_and(|bytes| bytes <= isize::MAX as usize) {
            return Err(self.error(
                at,
                ParseError::OutOfRange {
                    what: "canvas",
                    requirement: "small enough to allocate",
                    value: width as f64 * height as f64,
                },
            ));
        }

        self.scene = Scene::new(width, height);

        debug!("{}: canvas {width}x{height}", self.file);
        Ok(())
    }

    fn dimension(&mut self, what: &'static str) -> ParseResult<usize> {
        let at = self.peek().at;
        let value = self.number()?;

        if value < 0.0 || value.fract() != 0.0 {
            return Err(self.error(
                at,
                ParseError::OutOfRange { what, requirement: "a non-negative integer", value },
            ));
        }

        if value >= usize::MAX as f64 {
            return Err(self.error(
                at,
                ParseError::OutOfRange { what, requirement: "an addressable size", value },
            ));
        }

        Ok(value as usize)
    }

    fn instruction(&mut self) -> ParseResult<()> {
        let token = self.advance();
        if !token.is(TokenKind::Identifier) {
            return Err(self.error(token.at, ParseError::InvalidKeyword(token.to_string())));
        }

        let Some(keyword) = KEYWORDS.get(token.text.as_str()).copied() else {
            let err = self.error(token.at, ParseError::UnknownKeyword(token.text.clone()));
            return Err(match closest(&token.text, KEYWORDS.keys().copied()) {
                Some(keyword) => err.with_help(format!("did you mean '{keyword}'?")),
                None => err,
            });
        };

        match keyword {
            Keyword::Circle => self.circle(),
            Keyword::Ellipse => self.ellipse(),
            Keyword::Rectangle => self.rectangle(),
            Keyword::Triangle => self.triangle(),
            Keyword::Shift => self.shift(),
            Keyword::Rotate => self.rotate(),
            Keyword::Union => self.union(),
            Keyword::Difference => self.difference(),
            Keyword::Color => self.color(),
            Keyword::Fill => self.fill(),
        }
    }

    // Statements

    fn circle(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let center = self.point()?;
        let radius = self.positive("radius")?;

        self.declare(name, ShapeKind::Circle { center, radius })
    }

    fn ellipse(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let center = self.point()?;
        let semi_major = self.positive("semi-major axis")?;

        let at = self.peek().at;
        let semi_minor = self.positive("semi-minor axis")?;
        if semi_minor > semi_major {
            return Err(self.error(
                at,
                ParseError::OutOfRange {
                    what: "semi-minor axis",
                    requirement: "at most the semi-major axis",
                    value: semi_minor,
                },
            ));
        }

        self.declare(name, ShapeKind::Ellipse { center, semi_major, semi_minor })
    }

    fn rectangle(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let center = self.point()?;
        let width = self.positive("width")?;
        let height = self.positive("height")?;

        self.declare(name, ShapeKind::Rectangle { center, width, height })
    }

    fn triangle(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let vertices = [self.point()?, self.point()?, self.point()?];

        self.declare(name, ShapeKind::Triangle { vertices })
    }

    fn shift(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let offset = self.point()?;
        let target = self.shape_reference()?;

        self.declare(name, ShapeKind::Translate { offset, target })
    }

    fn rotate(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let angle = self.number()?;
        let pivot = self.point()?;
        let target = self.shape_reference()?;

        self.declare(name, ShapeKind::Rotate { angle, pivot, target })
    }

    fn union(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        self.expect(TokenKind::OpenBrace)?;

        let mut members = vec![self.shape_reference()?];
        while self.peek().is(TokenKind::Identifier) {
            members.push(self.shape_reference()?);
        }
        self.expect(TokenKind::CloseBrace)?;

        self.declare(name, ShapeKind::Union { members })
    }

    fn difference(&mut self) -> ParseResult<()> {
        let name = self.new_shape_name()?;
        let base = self.shape_reference()?;
        let subtrahend = self.shape_reference()?;

        self.declare(name, ShapeKind::Difference { base, subtrahend })
    }

    fn color(&mut self) -> ParseResult<()> {
        let token = self.expect_described(TokenKind::Identifier, "a color name")?;
        if let Some(first) = self.scene.colors.position(&token.text) {
            return Err(self.error(token.at, ParseError::DuplicateColor { name: token.text, first }));
        }

        let color = self.color_definition()?;
        self.scene
            .declare_color(&token.text, color, token.at)
            .map_err(|first| self.error(token.at, ParseError::DuplicateColor { name: token.text.clone(), first }))?;

        debug!("{}: color '{}' declared at {}", self.file, token.text, token.at);
        Ok(())
    }

    fn fill(&mut self) -> ParseResult<()> {
        let target = self.shape_reference()?;
        let color = self.color_definition()?;
        self.scene.fill(target, color);

        debug!("{}: fill '{}'", self.file, self.scene.shapes[target].name);
        Ok(())
    }

    // Names

    /// Name of a shape about to be declared. Checked before the body is
    /// parsed, so a shape can never refer to itself.
    fn new_shape_name(&mut self) -> ParseResult<Token> {
        let token = self.expect_described(TokenKind::Identifier, "a shape name")?;

        match self.scene.shape_names.position(&token.text) {
            Some(first) => Err(self.error(token.at, ParseError::DuplicateShape { name: token.text, first })),
            None => Ok(token),
        }
    }

    fn declare(&mut self, name: Token, kind: ShapeKind) -> ParseResult<()> {
        debug!("{}: {} '{}' declared at {}", self.file, kind.keyword(), name.text, name.at);

        self.scene
            .declare_shape(&name.text, kind, name.at)
            .map(|_| ())
            .map_err(|first| self.error(name.at, ParseError::DuplicateShape { name: name.text.clone(), first }))
    }

    fn shape_reference(&mut self) -> ParseResult<ShapeId> {
        let token = self.expect_described(TokenKind::Identifier, "a shape name")?;

        self.scene.shape(&token.text).ok_or_else(|| {
            let err = self.error(token.at, ParseError::UndefinedShape(token.text.clone()));
            match self.scene.shape_names.suggest(&token.text) {
                Some(name) => err.with_help(format!("did you mean '{name}'?")),
                None => err,
            }
        })
    }

    // Values

    fn color_definition(&mut self) -> ParseResult<Rgb> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::OpenBrace => {
                self.advance();
                let (red, green, blue) = (self.channel()?, self.channel()?, self.channel()?);
                self.expect(TokenKind::CloseBrace)?;

                Ok(Srgb::new(red, green, blue).into_format())
            }
            TokenKind::Identifier => {
                self.advance();
                self.scene.color(&token.text).ok_or_else(|| {
                    let err = self.error(token.at, ParseError::UndefinedColor(token.text.clone()));
                    match self.scene.colors.suggest(&token.text) {
                        Some(name) => err.with_help(format!("did you mean '{name}'?")),
                        None => err,
                    }
                })
            }
            _ => Err(self.unexpected("a color")),
        }
    }

    fn channel(&mut self) -> ParseResult<f64> {
        let at = self.peek().at;
        let value = self.number()?;

        if !(0.0..=1.0).contains(&value) {
            return Err(self.error(
                at,
                ParseError::OutOfRange { what: "color channel", requirement: "between 0 and 1", value },
            ));
        }

        Ok(value)
    }

    fn positive(&mut self, what: &'static str) -> ParseResult<f64> {
        let at = self.peek().at;
        let value = self.number()?;

        if value <= 0.0 {
            return Err(self.error(
                at,
                ParseError::OutOfRange { what, requirement: "greater than 0", value },
            ));
        }

        Ok(value)
    }

    /// A literal, or one coordinate of a point: `{1 2}.x`, `a.ne.y`.
    fn number(&mut self) -> ParseResult<f64> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                token
                    .text
                    .parse::<f64>()
                    .map_err(|_| self.error(token.at, ParseError::Expected {
                        expected: "a number".to_owned(),
                        found: token.text.clone(),
                    }))
            }
            kind if kind.starts_point() => {
                let point = self.point()?;
                self.expect(TokenKind::Dot)?;
                let coordinate = self.expect_described(TokenKind::Identifier, "a coordinate")?;

                match coordinate.text.as_str() {
                    "x" => Ok(point.x),
                    "y" => Ok(point.y),
                    _ => Err(self.error(coordinate.at, ParseError::InvalidCoordinate(coordinate.text))),
                }
            }
            _ => Err(self.unexpected("a number")),
        }
    }

    fn point(&mut self) -> ParseResult<Point> {
        match self.peek().kind {
            TokenKind::OpenBrace => {
                self.advance();
                let (x, y) = (self.number()?, self.number()?);
                self.expect(TokenKind::CloseBrace)?;

                Ok(Point::new(x, y))
            }
            TokenKind::Identifier => self.named_point(),
            TokenKind::OpenParen => self.point_expression(),
            _ => Err(self.unexpected("a point")),
        }
    }

    fn named_point(&mut self) -> ParseResult<Point> {
        let shape = self.shape_reference()?;
        self.expect(TokenKind::Dot)?;
        let landmark = self.expect_described(TokenKind::Identifier, "a point name")?;

        self.scene.shapes.named_point(shape, &landmark.text).ok_or_else(|| {
            let name = self.scene.shapes[shape].name.clone();
            let available = self.scene.shapes.landmarks(shape).join(", ");

            self.error(landmark.at, ParseError::UnknownNamedPoint { shape: name.clone(), point: landmark.text })
                .with_help(format!("'{name}' has: {available}"))
        })
    }

    /// `(+ p...)`, `(- p...)`, `(* p k)` or `(/ p k)`.
    fn point_expression(&mut self) -> ParseResult<Point> {
        self.expect(TokenKind::OpenParen)?;
        let operator = self.expect(TokenKind::Operator)?;

        let result = match operator.text.as_str() {
            "+" | "-" => {
                let mut acc = self.point()?;
                while self.peek().kind.starts_point() {
                    let p = self.point()?;
                    if operator.text == "+" {
                        acc += p;
                    } else {
                        acc -= p;
                    }
                }
                acc
            }
            "*" => {
                let p = self.point()?;
                p * self.number()?
            }
            "/" => {
                let p = self.point()?;
                let divisor = self.number()?;
                if divisor == 0.0 {
                    return Err(self.error(operator.at, ParseError::DivisionByZero));
                }
                p / divisor
            }
            _ => {
                return Err(self.error(
                    operator.at,
                    ParseError::Expected { expected: "an operator".to_owned(), found: operator.text.clone() },
                ));
            }
        };

        self.expect(TokenKind::CloseParen)?;
        Ok(result)
    }
}
