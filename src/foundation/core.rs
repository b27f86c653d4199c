use std::ops::Range;

use crate::foundation::buffer::{CHANNELS, rgba_len};
use crate::foundation::error::{BlurError, BlurResult};

/// Straight (non-premultiplied) RGBA8 raster, row-major, tightly packed.
///
/// Channel `c` of pixel `(row, col)` lives at `(row * width + col) * 4 + c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Wrap `pixels`, which must hold exactly `width * height * 4` bytes. Both dimensions
    /// must be non-zero.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> BlurResult<Self> {
        if width == 0 || height == 0 {
            return Err(BlurError::validation(format!(
                "image dimensions must be > 0, got {width}x{height}"
            )));
        }
        let expected_len = rgba_len(width, height)?;
        if pixels.len() != expected_len {
            return Err(BlurError::validation(format!(
                "image buffer has {} bytes, expected width*height*4 = {expected_len}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image where every pixel is `px`.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> BlurResult<Self> {
        let pixel_count = rgba_len(width, height)? / CHANNELS;
        Self::new(width, height, px.repeat(pixel_count))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 samples.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Give up the image and return its sample buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Offset of one channel sample in [`Image::pixels`].
    pub fn channel_index(&self, row: u32, col: u32, channel: usize) -> usize {
        (row as usize * self.width as usize + col as usize) * CHANNELS + channel
    }

    /// RGBA samples of the pixel at `(row, col)`.
    ///
    /// Panics if `(row, col)` is outside the image.
    pub fn pixel(&self, row: u32, col: u32) -> [u8; 4] {
        let idx = self.channel_index(row, col, 0);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

/// Inclusive range of image rows handled by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RowBand {
    /// First row of the band.
    pub start: u32,
    /// Last row of the band, inclusive.
    pub end: u32,
}

impl RowBand {
    /// Validated band; `start` must not exceed `end`.
    pub fn new(start: u32, end: u32) -> BlurResult<Self> {
        if start > end {
            return Err(BlurError::validation(format!(
                "RowBand start must be <= end, got [{start}, {end}]"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of rows, never 0.
    pub fn len_rows(self) -> u32 {
        self.end - self.start + 1
    }

    /// Whether `row` falls inside the band.
    pub fn contains(self, row: u32) -> bool {
        self.start <= row && row <= self.end
    }

    /// Byte range this band occupies in an RGBA8 buffer of the given width.
    pub fn byte_range(self, width: u32) -> Range<usize> {
        let stride = width as usize * CHANNELS;
        self.start as usize * stride..(self.end as usize + 1) * stride
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
