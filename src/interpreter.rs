use std::{fs, path::Path};

use miette::{NamedSource, Report, Result};

use crate::{
    cli::RenderConfig,
    error::PaintError,
    geometry::Rgb,
    parser,
    raster::{FillOrder, Image, rasterize},
    scene::Scene,
    timed,
};

/// Drives the stages: source text to scene, scene to image.
pub struct Interpreter {
    order: FillOrder,
    background: Rgb,
}

impl Interpreter {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            order: config.precedence,
            background: config.background,
        }
    }

    pub fn parse(&self, paint_src: String, source_name: String) -> Result<Scene> {
        let scene = timed!(parser::parse(&paint_src, &source_name));

        scene.map_err(|err| {
            Report::new(err).with_source_code(NamedSource::new(source_name, paint_src))
        })
    }

    pub fn parse_file<P>(&self, path: P) -> Result<Scene>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let paint_src = fs::read_to_string(path).map_err(|source| PaintError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse(paint_src, path.display().to_string())
    }

    pub fn render(&self, scene: &Scene) -> Image {
        timed!(rasterize(scene, self.order, self.background))
    }
}
