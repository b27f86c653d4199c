use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use rayon::prelude::*;

use crate::blur::kernel::run_band;
use crate::blur::plan::plan_bands;
use crate::foundation::buffer::alloc_zeroed;
use crate::foundation::core::{Image, RowBand};
use crate::foundation::error::{BlurError, BlurResult};

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 8;

/// How the per-pass workers are realised. Both produce byte-identical output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheduler {
    /// One scoped OS thread per band, joined before the pass returns.
    #[default]
    ScopedThreads,
    /// A dedicated rayon pool with one thread per band, built per pass and joined before the
    /// pass returns.
    RayonPool,
}

/// Options for a single blur pass.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlurOpts {
    /// Number of row bands, one worker each. Must be in `1..=height`.
    pub workers: usize,
    /// Where the workers run.
    pub scheduler: Scheduler,
}

impl Default for BlurOpts {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            scheduler: Scheduler::default(),
        }
    }
}

/// What a finished pass did.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PassReport {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of workers (and bands) used.
    pub workers: usize,
    /// Scheduler the workers ran on.
    pub scheduler: Scheduler,
    /// Row bands in worker order.
    pub bands: Vec<RowBand>,
    /// Wall time of the pass in microseconds, from planning until the last join.
    pub elapsed_us: u64,
}

/// Output of [`blur_with_opts`].
#[derive(Clone, Debug)]
pub struct BlurPass {
    /// The blurred image.
    pub image: Image,
    /// Summary of the pass.
    pub report: PassReport,
}

/// Blur `image` with a 3x3 box filter using `workers` row bands.
///
/// Fails with [`BlurError::Config`] when `workers` is 0 or larger than the image height.
pub fn blur(image: &Image, workers: usize) -> BlurResult<Image> {
    let opts = BlurOpts {
        workers,
        ..BlurOpts::default()
    };
    blur_with_opts(image, &opts).map(|pass| pass.image)
}

/// Run one blur pass.
///
/// The worker count is validated before anything is allocated. Each worker reads the
/// whole input and writes a disjoint row band of the output; the output is returned only
/// after every worker has been joined. If any worker fails, the first error in band order
/// is returned and no image is produced.
#[tracing::instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn blur_with_opts(image: &Image, opts: &BlurOpts) -> BlurResult<BlurPass> {
    let started = Instant::now();
    let bands = plan_bands(image.height(), opts.workers)?;
    let mut out = alloc_zeroed(image.pixels().len(), "output image")?;

    let slots = split_bands(&mut out, &bands, image.width());
    run_bands(opts.scheduler, slots, |idx, band, rows| {
        run_worker(image, idx, band, rows)
    })?;

    let output = Image::new(image.width(), image.height(), out)?;
    let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    tracing::info!(
        workers = opts.workers,
        scheduler = ?opts.scheduler,
        elapsed_us,
        "blur pass complete"
    );

    Ok(BlurPass {
        image: output,
        report: PassReport {
            width: image.width(),
            height: image.height(),
            workers: opts.workers,
            scheduler: opts.scheduler,
            bands,
            elapsed_us,
        },
    })
}

fn split_bands<'a>(
    out: &'a mut [u8],
    bands: &[RowBand],
    width: u32,
) -> Vec<(RowBand, &'a mut [u8])> {
    let mut slots = Vec::with_capacity(bands.len());
    let mut rest = out;
    for &band in bands {
        let len = band.byte_range(width).len();
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
        slots.push((band, head));
        rest = tail;
    }
    slots
}

fn run_worker(image: &Image, idx: usize, band: RowBand, rows: &mut [u8]) -> BlurResult<()> {
    tracing::debug!(worker = idx, start = band.start, end = band.end, "worker started");
    run_band(image, band, rows)?;
    tracing::debug!(worker = idx, "worker finished");
    Ok(())
}

fn panicked(band: RowBand) -> BlurError {
    BlurError::worker(format!(
        "worker for rows [{}, {}] panicked",
        band.start, band.end
    ))
}

/// Run `work` once per slot on `scheduler`, joining every worker before returning.
///
/// Returns the first error in band order; a panicking worker counts as a
/// [`BlurError::Worker`].
fn run_bands<F>(
    scheduler: Scheduler,
    slots: Vec<(RowBand, &mut [u8])>,
    work: F,
) -> BlurResult<()>
where
    F: Fn(usize, RowBand, &mut [u8]) -> BlurResult<()> + Sync,
{
    match scheduler {
        Scheduler::ScopedThreads => run_scoped(slots, work),
        Scheduler::RayonPool => run_rayon(slots, work),
    }
}

fn run_scoped<F>(slots: Vec<(RowBand, &mut [u8])>, work: F) -> BlurResult<()>
where
    F: Fn(usize, RowBand, &mut [u8]) -> BlurResult<()> + Sync,
{
    let work = &work;
    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(slots.len());
        let mut spawn_err = None;

        for (idx, (band, rows)) in slots.into_iter().enumerate() {
            let spawned = std::thread::Builder::new()
                .name(format!("rowblur-worker-{idx}"))
                .spawn_scoped(scope, move || work(idx, band, rows));
            match spawned {
                Ok(handle) => handles.push((band, handle)),
                Err(e) => {
                    // Stop launching; workers already running are still joined below.
                    spawn_err = Some(BlurError::worker(format!(
                        "failed to spawn worker {idx}: {e}"
                    )));
                    break;
                }
            }
        }

        let mut first_err = None;
        for (band, handle) in handles {
            let res = handle.join().unwrap_or_else(|_| Err(panicked(band)));
            if let Err(e) = res {
                tracing::warn!(start = band.start, end = band.end, error = %e, "worker failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        match first_err.or(spawn_err) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}

fn run_rayon<F>(slots: Vec<(RowBand, &mut [u8])>, work: F) -> BlurResult<()>
where
    F: Fn(usize, RowBand, &mut [u8]) -> BlurResult<()> + Sync,
{
    let threads = slots.len();
    if threads == 0 {
        return Err(BlurError::config("rayon pool needs at least one thread"));
    }

    // `build_scoped` spawns the pool inside `std::thread::scope`, so every pool thread has
    // exited by the time it returns.
    let results = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("rowblur-rayon-{i}"))
        .build_scoped(
            |thread| thread.run(),
            |pool| {
                pool.install(|| {
                    slots
                        .into_par_iter()
                        .enumerate()
                        .map(|(idx, (band, rows))| {
                            catch_unwind(AssertUnwindSafe(|| work(idx, band, rows)))
                                .unwrap_or_else(|_| Err(panicked(band)))
                        })
                        .collect::<Vec<_>>()
                })
            },
        )
        .map_err(|e| BlurError::worker(format!("failed to build rayon thread pool: {e}")))?;

    for (idx, res) in results.iter().enumerate() {
        if let Err(e) = res {
            tracing::warn!(worker = idx, error = %e, "worker failed");
        }
    }
    results.into_iter().collect()
}

#[cfg(test)]
#[path = "../../tests/unit/blur/coordinator.rs"]
mod tests;
