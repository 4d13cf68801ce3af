//! Turns a parsed scene into a pixel buffer.

use clap::ValueEnum;
use log::debug;

use crate::{
    geometry::{Point, Rgb},
    scene::Scene,
};

/// Which fill ends up on top where filled shapes overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FillOrder {
    /// The first `fill` statement is topmost.
    #[default]
    First,
    /// The last `fill` statement is topmost.
    Last,
}

/// Row-major RGB buffer. Row 0 is the bottom of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgb>,
}

impl Image {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width * height],
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Rows from the top of the canvas down.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.width.max(1)).rev()
    }
}

/// Samples every filled shape at pixel centres `(x + 0.5, y + 0.5)`. Each
/// pixel takes the colour of the topmost shape containing its centre; the
/// others keep `background`. Only pixels inside a shape's domain are tested.
pub fn rasterize(scene: &Scene, order: FillOrder, background: Rgb) -> Image {
    let mut image = Image::new(scene.width, scene.height, background);
    let mut painted = vec![false; scene.width * scene.height];

    let fills: Box<dyn Iterator<Item = _>> = match order {
        FillOrder::First => Box::new(scene.fills.iter()),
        FillOrder::Last => Box::new(scene.fills.iter().rev()),
    };

    for id in fills {
        let shape = &scene.shapes[*id];
        let Some(color) = shape.fill else {
            continue;
        };

        let domain = scene.shapes.domain(*id);
        let Some((xs, ys)) = domain.pixel_span(scene.width, scene.height) else {
            debug!("'{}' is off canvas ({domain})", shape.name);
            continue;
        };

        let mut count = 0;
        for y in ys {
            for x in xs.clone() {
                let index = y * scene.width + x;
                if painted[index] {
                    continue;
                }

                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if scene.shapes.contains(*id, center) {
                    image.set(x, y, color);
                    painted[index] = true;
                    count += 1;
                }
            }
        }

        debug!("'{}' painted {count} pixels", shape.name);
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use proptest::prelude::*;

    const BLACK: Rgb = Rgb::new(0, 0, 0);
    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn render(src: &str, order: FillOrder) -> Image {
        let scene = parse(src, "test.paint").unwrap_or_else(|err| panic!("{err}"));
        rasterize(&scene, order, BLACK)
    }

    #[test]
    fn red_circle() {
        let image = render("size 10 10\ncirc a {5 5} 3\nfill a {1 0 0}", FillOrder::First);

        assert_eq!(image.pixels.len(), 100);
        assert_eq!(image.get(5, 5), Some(RED));
        assert_eq!(image.get(0, 0), Some(BLACK));
        assert_eq!(image.get(9, 9), Some(BLACK));
        // centre (7.5, 5.5) is about 2.55 away
        assert_eq!(image.get(7, 5), Some(RED));
        // centre (8.5, 5.5) is about 3.54 away
        assert_eq!(image.get(8, 5), Some(BLACK));
    }

    #[test]
    fn unfilled_shapes_are_invisible() {
        let image = render("size 4 4\nrect r {2 2} 4 4", FillOrder::First);
        assert!(image.pixels.iter().all(|p| *p == BLACK));
    }

    #[test]
    fn background_color() {
        let scene = parse("size 2 1", "test.paint").unwrap();
        let image = rasterize(&scene, FillOrder::First, BLUE);

        assert_eq!(image.pixels, vec![BLUE, BLUE]);
    }

    #[test]
    fn fill_precedence() {
        let src = "size 4 1\nrect a {1 0.5} 2 1\nrect b {2 0.5} 2 1\nfill a {1 0 0}\nfill b {0 0 1}";

        let first = render(src, FillOrder::First);
        assert_eq!(first.pixels, vec![RED, RED, BLUE, BLACK]);

        let last = render(src, FillOrder::Last);
        assert_eq!(last.pixels, vec![RED, BLUE, BLUE, BLACK]);
    }

    #[test]
    fn refilled_shape_uses_last_color() {
        let image = render(
            "size 1 1\nrect a {0.5 0.5} 1 1\nfill a {1 0 0}\nfill a {0 0 1}",
            FillOrder::First,
        );
        assert_eq!(image.pixels, vec![BLUE]);
    }

    #[test]
    fn difference_leaves_a_hole() {
        let image = render(
            "size 3 3\nrect r {1.5 1.5} 3 3\nrect h {1.5 1.5} 1 1\ndiff d r h\nfill d {1 0 0}",
            FillOrder::First,
        );

        assert_eq!(image.get(1, 1), Some(BLACK));
        assert_eq!(image.pixels.iter().filter(|p| **p == RED).count(), 8);
    }

    #[test]
    fn rotated_shape() {
        // a horizontal bar turned upright around its centre
        let image = render(
            "size 5 5\nrect bar {2.5 2.5} 5 1\nrot up 90 bar.c bar\nfill up {1 0 0}",
            FillOrder::First,
        );

        for y in 0..5 {
            assert_eq!(image.get(2, y), Some(RED), "row {y}");
        }
        assert_eq!(image.get(0, 2), Some(BLACK));
    }

    #[test]
    fn quarter_turn_edges_on_pixel_centres() {
        for angle in [90, 180, 270] {
            let src = format!(
                "size 6 6\nrect r {{2.5 2.5}} 1 3\nrot q {angle} {{1 3}} r\nshift s {{0.5 0.5}} q\nfill s {{1 0 0}}"
            );
            let scene = parse(&src, "test.paint").unwrap();
            let image = rasterize(&scene, FillOrder::First, BLACK);
            let s = scene.shape("s").unwrap();

            for y in 0..6 {
                for x in 0..6 {
                    let inside = scene.shapes.contains(s, Point::new(x as f64 + 0.5, y as f64 + 0.5));
                    assert_eq!(image.get(x, y) == Some(RED), inside, "angle {angle} pixel ({x}, {y})");
                }
            }

            if angle == 90 {
                assert_eq!(image.get(0, 4), Some(RED));
            }
        }
    }

    #[test]
    fn shapes_off_canvas_are_skipped() {
        let image = render("size 3 3\ncirc far {-10 -10} 2\nfill far {1 0 0}", FillOrder::First);
        assert!(image.pixels.iter().all(|p| *p == BLACK));

        let empty = render("size 0 0\ncirc c {0 0} 2\nfill c {1 0 0}", FillOrder::First);
        assert!(empty.pixels.is_empty());
    }

    #[test]
    fn rows_are_listed_top_first() {
        let image = render("size 2 2\nrect top {1 1.5} 2 1\nfill top {1 0 0}", FillOrder::First);
        let rows: Vec<_> = image.rows_top_down().collect();

        assert_eq!(rows[0], &[RED, RED]);
        assert_eq!(rows[1], &[BLACK, BLACK]);
    }

    proptest! {
        #[test]
        fn reversed_fills_with_reversed_policy_match(
            xs in proptest::collection::vec(0.0..8.0f64, 1..6),
        ) {
            let mut declarations = String::from("size 8 8\n");
            let mut fills = Vec::new();
            for (i, x) in xs.iter().enumerate() {
                declarations.push_str(&format!("circ s{i} {{{x} {x}}} 2\n"));
                fills.push(format!("fill s{i} {{{} 0 1}}\n", i as f64 / 10.0));
            }

            let forward = format!("{declarations}{}", fills.concat());
            fills.reverse();
            let backward = format!("{declarations}{}", fills.concat());

            prop_assert_eq!(
                render(&forward, FillOrder::First),
                render(&backward, FillOrder::Last)
            );
        }

        #[test]
        fn domain_pruning_matches_brute_force(
            cx in -2.0..10.0f64, cy in -2.0..10.0f64,
            angle in 0.0..360.0f64,
        ) {
            let src = format!(
                "size 8 8\ntri t {{{cx} {cy}}} {{{} {cy}}} {{{cx} {}}}\nrot r {angle} {{4 4}} t\nfill r {{1 0 0}}",
                cx + 3.0, cy + 2.0
            );
            let scene = parse(&src, "test.paint").unwrap();
            let image = rasterize(&scene, FillOrder::First, BLACK);
            let r = scene.shape("r").unwrap();

            for y in 0..8 {
                for x in 0..8 {
                    let inside = scene.shapes.contains(r, Point::new(x as f64 + 0.5, y as f64 + 0.5));
                    prop_assert_eq!(image.get(x, y) == Some(RED), inside);
                }
            }
        }
    }
}
