use crate::foundation::core::RowBand;
use crate::foundation::error::{BlurError, BlurResult};

/// Reject worker counts that cannot give every worker at least one row.
pub fn check_worker_count(height: u32, workers: usize) -> BlurResult<()> {
    if workers == 0 {
        return Err(BlurError::config("worker count must be >= 1"));
    }
    if workers > height as usize {
        return Err(BlurError::config(format!(
            "worker count {workers} exceeds image height {height}"
        )));
    }
    Ok(())
}

/// Split rows `[0, height-1]` into `workers` contiguous bands in increasing order.
///
/// Every band gets `height / workers` rows; the remainder is appended to the last band.
pub fn plan_bands(height: u32, workers: usize) -> BlurResult<Vec<RowBand>> {
    check_worker_count(height, workers)?;

    // Bounded by `height` after the check above.
    let n = workers as u32;
    let base = height / n;

    let mut bands = Vec::with_capacity(workers);
    for i in 0..n {
        let start = i * base;
        let end = if i + 1 == n {
            height - 1
        } else {
            (i + 1) * base - 1
        };
        bands.push(RowBand { start, end });
    }
    Ok(bands)
}

#[cfg(test)]
#[path = "../../tests/unit/blur/plan.rs"]
mod tests;
