use std::{fmt::Display, ops::RangeInclusive};

use super::Point;

/// Axis-aligned box enclosing a shape. Only used to prune rasterization, so it
/// may be larger than the shape but never smaller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub lower_left: Point,
    pub upper_right: Point,
}

impl Domain {
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        Self { lower_left, upper_right }
    }

    /// Bounding box of a non-empty set of points.
    pub fn from_points<I>(points: I) -> Option<Domain>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(Domain::new(first, first), |domain, p| {
            Domain::new(
                Point::new(domain.lower_left.x.min(p.x), domain.lower_left.y.min(p.y)),
                Point::new(domain.upper_right.x.max(p.x), domain.upper_right.y.max(p.y)),
            )
        }))
    }

    pub fn union(self, other: Domain) -> Domain {
        Domain::new(
            Point::new(
                self.lower_left.x.min(other.lower_left.x),
                self.lower_left.y.min(other.lower_left.y),
            ),
            Point::new(
                self.upper_right.x.max(other.upper_right.x),
                self.upper_right.y.max(other.upper_right.y),
            ),
        )
    }

    pub fn shift(self, offset: Point) -> Domain {
        Domain::new(self.lower_left.shift(offset), self.upper_right.shift(offset))
    }

    /// Rotating breaks axis alignment, so the rotated corners are boxed again.
    pub fn rotate(self, pivot: Point, angle: f64) -> Domain {
        let corners = self.corners().map(|corner| corner.rotate(pivot, angle));

        Domain::from_points(corners).unwrap_or(self)
    }

    /// Corners in the order nw, se, sw, ne.
    pub fn corners(&self) -> [Point; 4] {
        let (ll, ur) = (self.lower_left, self.upper_right);

        [
            Point::new(ll.x, ur.y),
            Point::new(ur.x, ll.y),
            ll,
            ur,
        ]
    }

    /// Pixel indices along both axes whose centres `(i + 0.5, j + 0.5)` lie in
    /// the domain, clamped to a `width` x `height` canvas. `None` when no pixel
    /// centre is covered.
    pub fn pixel_span(
        &self,
        width: usize,
        height: usize,
    ) -> Option<(RangeInclusive<usize>, RangeInclusive<usize>)> {
        let xs = axis_span(self.lower_left.x, self.upper_right.x, width)?;
        let ys = axis_span(self.lower_left.y, self.upper_right.y, height)?;

        Some((xs, ys))
    }
}

/// Slack for bounds that land a rounding error past a pixel centre, as
/// rotated corners do.
const EPSILON: f64 = 1e-9;

fn axis_span(low: f64, high: f64, len: usize) -> Option<RangeInclusive<usize>> {
    if len == 0 || !low.is_finite() || !high.is_finite() {
        return None;
    }

    let first = (low - 0.5 - EPSILON).ceil().max(0.0);
    let last = (high - 0.5 + EPSILON).floor().min((len - 1) as f64);

    if first > last {
        return None;
    }

    Some(first as usize..=last as usize)
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {}]", self.lower_left, self.upper_right)
    }
}
