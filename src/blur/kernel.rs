use crate::foundation::buffer::{CHANNELS, alloc_zeroed};
use crate::foundation::core::{Image, RowBand};
use crate::foundation::error::{BlurError, BlurResult};

/// Neighbourhood radius of the box filter (3x3 window).
pub const RADIUS: i64 = 1;

/// Average of the 3x3 window around `(row, col)`, clipped to the image bounds.
///
/// Out-of-bounds neighbours are skipped rather than padded or mirrored, so corner pixels
/// average 4 samples and edge pixels 6. Each channel is `sum / count` with truncating
/// division.
pub fn box3_pixel(image: &Image, row: u32, col: u32) -> BlurResult<[u8; 4]> {
    if row >= image.height() || col >= image.width() {
        return Err(BlurError::validation(format!(
            "pixel ({row}, {col}) outside {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let h = i64::from(image.height());
    let w = i64::from(image.width());
    let src = image.pixels();

    let mut acc = [0u32; 4];
    let mut count = 0u32;
    for dy in -RADIUS..=RADIUS {
        let y = i64::from(row) + dy;
        if y < 0 || y >= h {
            continue;
        }
        for dx in -RADIUS..=RADIUS {
            let x = i64::from(col) + dx;
            if x < 0 || x >= w {
                continue;
            }
            let idx = image.channel_index(y as u32, x as u32, 0);
            for c in 0..CHANNELS {
                acc[c] += u32::from(src[idx + c]);
            }
            count += 1;
        }
    }

    if count == 0 {
        return Err(BlurError::worker(format!(
            "box window for pixel ({row}, {col}) has no in-bounds samples"
        )));
    }
    Ok(acc.map(|sum| (sum / count) as u8))
}

/// Blur every row of `band` and commit the result into `out_rows`.
///
/// `out_rows` is the band's slice of the shared output buffer (exactly
/// `band.len_rows() * stride` bytes). The band is first computed into a private scratch
/// buffer and only copied into `out_rows` once every pixel succeeded, so a failing worker
/// never leaves a half-written band behind. Reads always go to `image`, never to output.
pub fn run_band(image: &Image, band: RowBand, out_rows: &mut [u8]) -> BlurResult<()> {
    if band.start > band.end || band.end >= image.height() {
        return Err(BlurError::validation(format!(
            "band [{}, {}] outside image of height {}",
            band.start,
            band.end,
            image.height()
        )));
    }
    let band_len = band.byte_range(image.width()).len();
    if out_rows.len() != band_len {
        return Err(BlurError::validation(format!(
            "band [{}, {}] expects {band_len} output bytes, got {}",
            band.start,
            band.end,
            out_rows.len()
        )));
    }

    let stride = image.stride();
    let mut scratch = alloc_zeroed(band_len, "worker scratch buffer")?;
    for (dst_row, row) in scratch.chunks_exact_mut(stride).zip(band.start..=band.end) {
        for (col, px) in dst_row.chunks_exact_mut(CHANNELS).enumerate() {
            px.copy_from_slice(&box3_pixel(image, row, col as u32)?);
        }
    }

    out_rows.copy_from_slice(&scratch);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/blur/kernel.rs"]
mod tests;
