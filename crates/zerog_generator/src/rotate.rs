//! Raster rotation.

use crate::geometry::Rotation;
use image::ImageError;
use std::io::Cursor;

/// Rotates an encoded image and returns it encoded again.
pub trait ImageRotator {
    fn rotate(&self, bytes: &[u8], rotation: Rotation) -> Result<Vec<u8>, ImageError>;
}

/// [`ImageRotator`] backed by the `image` crate.
///
/// The output is encoded in the same format as the input, which is detected from
/// the content rather than the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterRotator;

impl ImageRotator for RasterRotator {
    fn rotate(&self, bytes: &[u8], rotation: Rotation) -> Result<Vec<u8>, ImageError> {
        let format = image::guess_format(bytes)?;
        let img = image::load_from_memory_with_format(bytes, format)?;

        let rotated = match rotation {
            Rotation::Clockwise => img.rotate90(),
            Rotation::Half => img.rotate180(),
            Rotation::CounterClockwise => img.rotate270(),
        };

        let mut out = Vec::new();
        rotated.write_to(&mut Cursor::new(&mut out), format)?;
        Ok(out)
    }
}
