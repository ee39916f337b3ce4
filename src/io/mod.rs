//! Image-size probing via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Only the header is read;
//! pixel data is never decoded.

use crate::util::{DetError, DetResult};
use image::GenericImageView;
use std::path::Path;

/// Returns `(width, height)` of the image at `path`.
pub fn image_size<P: AsRef<Path>>(path: P) -> DetResult<(u32, u32)> {
    image::image_dimensions(path).map_err(|err| DetError::ImageIo {
        reason: err.to_string(),
    })
}

/// Returns `(width, height)` of an already decoded image.
pub fn dynamic_image_size(img: &image::DynamicImage) -> (u32, u32) {
    img.dimensions()
}
