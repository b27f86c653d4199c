use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Image;
use crate::foundation::error::{BlurError, BlurResult};

/// Decode any format the `image` crate recognises into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> BlurResult<Image> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Image::new(width, height, rgba.into_raw())
}

/// Read and decode the file at `path`; I/O and decode errors name the path.
pub fn load_image(path: &Path) -> BlurResult<Image> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| match e {
        BlurError::Other(err) => BlurError::Other(err.context(format!("load '{}'", path.display()))),
        other => other,
    })
}

/// Encode `image` as an RGBA8 PNG in memory.
pub fn encode_png(image: &Image) -> BlurResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        image.pixels(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode png")?;
    Ok(buf)
}

/// Write `image` as PNG, creating the parent directory if needed.
pub fn save_png(image: &Image, path: &Path) -> BlurResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        image.pixels(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
