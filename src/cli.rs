use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use miette::Result;

use crate::{error::PaintError, geometry::Rgb, raster::FillOrder};

pub const SOURCE_EXTENSION: &str = "paint";
pub const OUTPUT_EXTENSION: &str = "ppm";

#[derive(Parser, Debug)]
#[command(author, version, about = "Compiles .paint scene descriptions into PPM images", long_about = None)]
pub struct Cli {
    /// Activate debug mode: log every stage and print the scene tree
    #[arg(long)]
    pub debug: bool,

    /// Only print the diagnostic line on errors, without the source snippet
    #[arg(long)]
    pub plain: bool,

    /// Validate the file and print statistics without rendering
    #[arg(long)]
    pub check: bool,

    /// Print the number of shapes, colors and fills
    #[arg(long)]
    pub stats: bool,

    /// The input source file
    pub file: PathBuf,

    #[clap(flatten)]
    pub render_config: RenderConfig,
}

impl Cli {
    /// The input path, if it names a `.paint` file.
    pub fn source(&self) -> Result<&Path, PaintError> {
        match self.file.extension().and_then(|e| e.to_str()) {
            Some(SOURCE_EXTENSION) => Ok(&self.file),
            _ => Err(PaintError::Input(format!(
                "'{}' is not a .{SOURCE_EXTENSION} file.",
                self.file.display()
            ))),
        }
    }

    /// The explicit output path, or the input path with a `.ppm` extension.
    pub fn output(&self) -> PathBuf {
        self.render_config
            .output_file
            .clone()
            .unwrap_or_else(|| self.file.with_extension(OUTPUT_EXTENSION))
    }
}

#[derive(Debug, Args)]
pub struct RenderConfig {
    /// The output for the generated PPM image
    pub output_file: Option<PathBuf>,

    /// Which fill is drawn on top where filled shapes overlap
    #[arg(long, value_enum, default_value_t = FillOrder::First)]
    pub precedence: FillOrder,

    /// Background of unfilled pixels as three channels in [0,1], e.g. 1,1,1
    #[arg(long, value_parser = parse_background, default_value = "0,0,0")]
    pub background: Rgb,
}

fn parse_background(arg: &str) -> Result<Rgb, String> {
    let channels = arg
        .split(',')
        .map(|c| {
            let value: f64 = c.trim().parse().map_err(|_| format!("'{c}' is not a number"))?;
            if (0.0..=1.0).contains(&value) {
                Ok(value)
            } else {
                Err(format!("channel {value} is not between 0 and 1"))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    match channels[..] {
        [red, green, blue] => Ok(palette::Srgb::new(red, green, blue).into_format()),
        _ => Err(format!("expected 3 channels, got {}", channels.len())),
    }
}
