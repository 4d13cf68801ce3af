//! Points, bounding domains and the shape arena the parser builds.

pub mod domain;
pub mod point;
pub mod shape;

pub use domain::Domain;
pub use point::Point;
pub use shape::{Rgb, Shape, ShapeId, ShapeKind, Shapes};
