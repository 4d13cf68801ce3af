use std::{f64::consts::FRAC_1_SQRT_2, fmt::Display, ops::Index};

use palette::Srgb;

use super::{Domain, Point};

pub type Rgb = Srgb<u8>;

/// Handle into [`Shapes`]. A derived shape can only hold handles of shapes
/// pushed before it, so the reference graph is always acyclic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Circle { center: Point, radius: f64 },
    Ellipse { center: Point, semi_major: f64, semi_minor: f64 },
    Rectangle { center: Point, width: f64, height: f64 },
    Triangle { vertices: [Point; 3] },
    Translate { offset: Point, target: ShapeId },
    Rotate { angle: f64, pivot: Point, target: ShapeId },
    Union { members: Vec<ShapeId> },
    Difference { base: ShapeId, subtrahend: ShapeId },
}

impl ShapeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ShapeKind::Circle { .. } => "circ",
            ShapeKind::Ellipse { .. } => "elli",
            ShapeKind::Rectangle { .. } => "rect",
            ShapeKind::Triangle { .. } => "tri",
            ShapeKind::Translate { .. } => "shift",
            ShapeKind::Rotate { .. } => "rot",
            ShapeKind::Union { .. } => "union",
            ShapeKind::Difference { .. } => "diff",
        }
    }

    /// Shapes this one is built from, in declaration order.
    pub fn references(&self) -> Vec<ShapeId> {
        match self {
            ShapeKind::Translate { target, .. } | ShapeKind::Rotate { target, .. } => vec![*target],
            ShapeKind::Union { members } => members.clone(),
            ShapeKind::Difference { base, subtrahend } => vec![*base, *subtrahend],
            _ => vec![],
        }
    }
}

impl Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeKind::Circle { center, radius } => write!(f, "circ {center} {radius}"),
            ShapeKind::Ellipse { center, semi_major, semi_minor } => {
                write!(f, "elli {center} {semi_major} {semi_minor}")
            }
            ShapeKind::Rectangle { center, width, height } => {
                write!(f, "rect {center} {width} {height}")
            }
            ShapeKind::Triangle { vertices: [v0, v1, v2] } => write!(f, "tri {v0} {v1} {v2}"),
            ShapeKind::Translate { offset, .. } => write!(f, "shift {offset}"),
            ShapeKind::Rotate { angle, pivot, .. } => write!(f, "rot {angle} {pivot}"),
            ShapeKind::Union { members } => write!(f, "union of {}", members.len()),
            ShapeKind::Difference { .. } => write!(f, "diff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    pub fill: Option<Rgb>,
}

const COMPASS: [&str; 9] = ["c", "n", "ne", "e", "se", "s", "sw", "w", "nw"];
const ELLIPSE_POINTS: [&str; 11] = ["c", "n", "ne", "e", "se", "s", "sw", "w", "nw", "f1", "f2"];
const TRIANGLE_POINTS: [&str; 7] = ["c", "v0", "v1", "v2", "s01", "s02", "s12"];

/// Arena owning every declared shape in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Shapes {
    inner: Vec<Shape>,
}

impl Shapes {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn push(&mut self, name: String, kind: ShapeKind) -> ShapeId {
        let id = ShapeId(self.inner.len());

        debug_assert!(
            kind.references().iter().all(|r| *r < id),
            "shape '{name}' references a shape that is not declared yet"
        );

        self.inner.push(Shape { name, kind, fill: None });
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.inner.iter().enumerate().map(|(i, shape)| (ShapeId(i), shape))
    }

    /// Colour is the only thing that may change after a shape is declared.
    pub fn set_fill(&mut self, id: ShapeId, color: Rgb) {
        self.inner[id.0].fill = Some(color);
    }

    pub fn contains(&self, id: ShapeId, p: Point) -> bool {
        match &self[id].kind {
            ShapeKind::Circle { center, radius } => {
                let d = p - *center;
                d.x * d.x + d.y * d.y <= radius * radius
            }
            ShapeKind::Ellipse { center, semi_major: a, semi_minor: b } => {
                let d = p - *center;
                (d.x * b).powi(2) + (d.y * a).powi(2) <= (a * b).powi(2)
            }
            ShapeKind::Rectangle { center, width, height } => {
                let d = p - *center;
                d.x.abs() <= width / 2.0 && d.y.abs() <= height / 2.0
            }
            ShapeKind::Triangle { vertices } => triangle_contains(vertices, p),
            ShapeKind::Translate { offset, target } => self.contains(*target, p.shift(-*offset)),
            ShapeKind::Rotate { angle, pivot, target } => {
                self.contains(*target, p.rotate(*pivot, -angle))
            }
            ShapeKind::Union { members } => members.iter().any(|m| self.contains(*m, p)),
            ShapeKind::Difference { base, subtrahend } => {
                self.contains(*base, p) && !self.contains(*subtrahend, p)
            }
        }
    }

    pub fn domain(&self, id: ShapeId) -> Domain {
        match &self[id].kind {
            ShapeKind::Circle { center, radius } => {
                let r = Point::new(*radius, *radius);
                Domain::new(*center - r, *center + r)
            }
            ShapeKind::Ellipse { center, semi_major, semi_minor } => {
                let r = Point::new(*semi_major, *semi_minor);
                Domain::new(*center - r, *center + r)
            }
            ShapeKind::Rectangle { center, width, height } => {
                let half = Point::new(width / 2.0, height / 2.0);
                Domain::new(*center - half, *center + half)
            }
            ShapeKind::Triangle { vertices } => {
                Domain::from_points(*vertices).unwrap_or(Domain::new(vertices[0], vertices[0]))
            }
            ShapeKind::Translate { offset, target } => self.domain(*target).shift(*offset),
            ShapeKind::Rotate { angle, pivot, target } => {
                self.domain(*target).rotate(*pivot, *angle)
            }
            ShapeKind::Union { members } => members
                .iter()
                .map(|m| self.domain(*m))
                .reduce(Domain::union)
                .unwrap_or(Domain::new(Point::ORIGIN, Point::ORIGIN)),
            // the subtrahend never widens the base
            ShapeKind::Difference { base, .. } => self.domain(*base),
        }
    }

    /// Looks up a landmark such as `c`, `ne` or `v1`. `None` when the shape
    /// has no landmark with that name.
    pub fn named_point(&self, id: ShapeId, name: &str) -> Option<Point> {
        match &self[id].kind {
            ShapeKind::Circle { center, radius } => {
                ellipse_point(*center, *radius, *radius, name).filter(|_| !is_focus(name))
            }
            ShapeKind::Ellipse { center, semi_major, semi_minor } => {
                ellipse_point(*center, *semi_major, *semi_minor, name)
            }
            ShapeKind::Rectangle { center, width, height } => {
                compass_point(*center, width / 2.0, height / 2.0, 1.0, name)
            }
            ShapeKind::Triangle { vertices: [v0, v1, v2] } => match name {
                "c" => Some((*v0 + *v1 + *v2) / 3.0),
                "v0" => Some(*v0),
                "v1" => Some(*v1),
                "v2" => Some(*v2),
                "s01" => Some((*v0 + *v1) / 2.0),
                "s02" => Some((*v0 + *v2) / 2.0),
                "s12" => Some((*v1 + *v2) / 2.0),
                _ => None,
            },
            ShapeKind::Translate { offset, target } => {
                self.named_point(*target, name).map(|p| p.shift(*offset))
            }
            ShapeKind::Rotate { angle, pivot, target } => {
                self.named_point(*target, name).map(|p| p.rotate(*pivot, *angle))
            }
            ShapeKind::Union { members } => {
                members.first().and_then(|first| self.named_point(*first, name))
            }
            ShapeKind::Difference { base, .. } => self.named_point(*base, name),
        }
    }

    /// Names accepted by [`Shapes::named_point`] for this shape.
    pub fn landmarks(&self, id: ShapeId) -> &'static [&'static str] {
        match &self[id].kind {
            ShapeKind::Circle { .. } | ShapeKind::Rectangle { .. } => &COMPASS,
            ShapeKind::Ellipse { .. } => &ELLIPSE_POINTS,
            ShapeKind::Triangle { .. } => &TRIANGLE_POINTS,
            ShapeKind::Translate { target, .. } | ShapeKind::Rotate { target, .. } => {
                self.landmarks(*target)
            }
            ShapeKind::Union { members } => match members.first() {
                Some(first) => self.landmarks(*first),
                None => &[],
            },
            ShapeKind::Difference { base, .. } => self.landmarks(*base),
        }
    }
}

impl Index<ShapeId> for Shapes {
    type Output = Shape;

    fn index(&self, id: ShapeId) -> &Shape {
        &self.inner[id.0]
    }
}

fn is_focus(name: &str) -> bool {
    matches!(name, "f1" | "f2")
}

fn ellipse_point(center: Point, a: f64, b: f64, name: &str) -> Option<Point> {
    match name {
        "f1" | "f2" => {
            let focal = (a * a - b * b).sqrt();
            let sign = if name == "f1" { 1.0 } else { -1.0 };
            Some(Point::new(center.x + sign * focal, center.y))
        }
        _ => compass_point(center, a, b, FRAC_1_SQRT_2, name),
    }
}

/// Compass landmarks of a box-like outline with half extents `dx`/`dy`.
/// `diagonal` scales the extents for the four diagonal directions.
fn compass_point(center: Point, dx: f64, dy: f64, diagonal: f64, name: &str) -> Option<Point> {
    let (kx, ky) = match name {
        "c" => (0.0, 0.0),
        "n" => (0.0, 1.0),
        "ne" => (diagonal, diagonal),
        "e" => (1.0, 0.0),
        "se" => (diagonal, -diagonal),
        "s" => (0.0, -1.0),
        "sw" => (-diagonal, -diagonal),
        "w" => (-1.0, 0.0),
        "nw" => (-diagonal, diagonal),
        _ => return None,
    };

    Some(Point::new(center.x + kx * dx, center.y + ky * dy))
}

fn edge(a: Point, b: Point, p: Point) -> f64 {
    (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
}

fn triangle_contains([v0, v1, v2]: &[Point; 3], p: Point) -> bool {
    let area = (v1.x - v0.x) * (v2.y - v0.y) - (v2.x - v0.x) * (v1.y - v0.y);
    if area == 0.0 {
        return false;
    }

    let d = [edge(*v0, *v1, p), edge(*v1, *v2, p), edge(*v2, *v0, p)];
    let has_negative = d.iter().any(|d| *d < 0.0);
    let has_positive = d.iter().any(|d| *d > 0.0);

    !(has_negative && has_positive)
}
