//! Binary PPM (`P6`) codec. Files store the top row first, so rows are
//! flipped relative to [`Image`].

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{error::PaintError, raster::Image};

pub const MAGIC: &str = "P6";
pub const MAX_VALUE: usize = 255;

pub fn encode<W: Write>(image: &Image, mut out: W) -> io::Result<()> {
    writeln!(out, "{MAGIC} {} {} {MAX_VALUE}", image.width, image.height)?;

    let mut row_bytes = Vec::with_capacity(image.width * 3);
    for row in image.rows_top_down() {
        row_bytes.clear();
        for pixel in row {
            row_bytes.extend_from_slice(&[pixel.red, pixel.green, pixel.blue]);
        }
        out.write_all(&row_bytes)?;
    }

    out.flush()
}

pub fn output_ppm(image: &Image, path: &Path) -> Result<(), PaintError> {
    let to_error = |source| PaintError::Output { path: path.to_path_buf(), source };

    let file = fs::File::create(path).map_err(to_error)?;
    encode(image, BufWriter::new(file)).map_err(to_error)
}
