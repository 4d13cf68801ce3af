//! The parsed program: canvas size, shapes, named colours and fills.

pub mod symbol_table;

use std::fmt::Display;

use text_trees::StringTreeNode;

use crate::{
    geometry::{Rgb, ShapeId, ShapeKind, Shapes},
    parser::token::Position,
};
pub use symbol_table::SymbolTable;

pub trait PrettyPrintable {
    fn pretty_print(&self) -> StringTreeNode;
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    pub shapes: Shapes,
    pub shape_names: SymbolTable<ShapeId>,
    pub colors: SymbolTable<Rgb>,
    /// Filled shapes in `fill` statement order.
    pub fills: Vec<ShapeId>,
}

impl Scene {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Adds a shape under a fresh name, or returns where the name was taken.
    pub fn declare_shape(&mut self, name: &str, kind: ShapeKind, at: Position) -> Result<ShapeId, Position> {
        if let Some(first) = self.shape_names.position(name) {
            return Err(first);
        }

        let id = self.shapes.push(name.to_owned(), kind);
        self.shape_names.declare(name, id, at)?;
        Ok(id)
    }

    pub fn declare_color(&mut self, name: &str, color: Rgb, at: Position) -> Result<(), Position> {
        self.colors.declare(name, color, at)
    }

    pub fn shape(&self, name: &str) -> Option<ShapeId> {
        self.shape_names.get(name).copied()
    }

    pub fn color(&self, name: &str) -> Option<Rgb> {
        self.colors.get(name).copied()
    }

    /// A shape filled again keeps its slot in the list and takes the new colour.
    pub fn fill(&mut self, id: ShapeId, color: Rgb) {
        self.shapes.set_fill(id, color);
        self.fills.push(id);
    }

    pub fn stats(&self) -> Stats {
        Stats {
            shapes: self.shapes.len(),
            colors: self.colors.len(),
            fills: self.fills.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub shapes: usize,
    pub colors: usize,
    pub fills: usize,
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of shapes : {}", self.shapes)?;
        writeln!(f, "Number of colors : {}", self.colors)?;
        write!(f, "Number of fills : {}", self.fills)
    }
}

fn hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

impl Scene {
    fn shape_node(&self, id: ShapeId) -> StringTreeNode {
        let shape = &self.shapes[id];
        let mut data = format!("{} = {}", shape.name, shape.kind);
        if let Some(color) = shape.fill {
            data.push_str(&format!(" [fill {}]", hex(color)));
        }

        let references = shape.kind.references();
        if references.is_empty() {
            StringTreeNode::new(data)
        } else {
            StringTreeNode::with_child_nodes(
                data,
                references.into_iter().map(|r| self.shape_node(r)),
            )
        }
    }
}

impl PrettyPrintable for Scene {
    fn pretty_print(&self) -> StringTreeNode {
        let shapes = StringTreeNode::with_child_nodes(
            "shapes".to_owned(),
            self.shapes.iter().map(|(id, _)| self.shape_node(id)),
        );

        let colors = StringTreeNode::with_child_nodes(
            "colors".to_owned(),
            self.colors
                .iter()
                .map(|e| StringTreeNode::new(format!("{} = {}", e.name, hex(e.value)))),
        );

        let fills = StringTreeNode::with_child_nodes(
            "fills".to_owned(),
            self.fills
                .iter()
                .map(|id| StringTreeNode::new(self.shapes[*id].name.clone())),
        );

        StringTreeNode::with_child_nodes(
            format!("scene {}x{}", self.width, self.height),
            vec![shapes, colors, fills].into_iter(),
        )
    }
}
