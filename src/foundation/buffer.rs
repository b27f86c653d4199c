use crate::foundation::error::{BlurError, BlurResult};

/// Samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Byte length of a tightly packed RGBA8 buffer, or an allocation error on overflow.
pub fn rgba_len(width: u32, height: u32) -> BlurResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| {
            BlurError::allocation(format!("rgba buffer size overflow for {width}x{height}"))
        })
}

/// Reserve `len` zeroed bytes without aborting the process on exhaustion.
pub fn alloc_zeroed(len: usize, what: &str) -> BlurResult<Vec<u8>> {
    let mut buf = Vec::<u8>::new();
    buf.try_reserve_exact(len)
        .map_err(|e| BlurError::allocation(format!("{what}: cannot reserve {len} bytes: {e}")))?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/buffer.rs"]
mod tests;
