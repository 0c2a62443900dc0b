//! Vertical compositor for captured slices
//!
//! Slices arrive in capture order as PNG bytes; the output is one image
//! of the first slice's width and the summed height, composited over an
//! opaque white background. Overlap trimming is the capture loop's
//! business; the stitcher only concatenates.

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use image::{Rgba, RgbaImage, imageops};

use crate::capture::CaptureSlice;

/// Stack the slices top to bottom into a single image.
///
/// Any undecodable slice or width mismatch aborts the whole stitch; a
/// partial image is never produced.
pub fn stitch(slices: &[CaptureSlice]) -> Result<RgbaImage> {
    if slices.is_empty() {
        bail!("nothing captured: no slices to stitch");
    }

    let mut decoded = Vec::with_capacity(slices.len());
    for (i, slice) in slices.iter().enumerate() {
        let img = image::load_from_memory(&slice.png)
            .with_context(|| format!("slice {i} is not a decodable image"))?
            .to_rgba8();
        decoded.push(img);
    }

    let width = decoded[0].width();
    for (i, img) in decoded.iter().enumerate() {
        if img.width() != width {
            bail!(
                "slice {i} width {} does not match first slice width {width}",
                img.width()
            );
        }
    }

    let total_height: u32 = decoded.iter().map(|img| img.height()).sum();
    let mut canvas = RgbaImage::from_pixel(width, total_height, Rgba([255, 255, 255, 255]));

    let mut y = 0i64;
    for img in &decoded {
        imageops::overlay(&mut canvas, img, 0, y);
        y += i64::from(img.height());
    }

    log::debug!(
        "stitched {} slices into {width}x{total_height}",
        decoded.len()
    );
    Ok(canvas)
}

/// Encode a stitched image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("failed to encode stitched image as PNG")?;
    Ok(bytes)
}
