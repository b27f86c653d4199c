use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::blur::kernel::box3_pixel;

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn noise_image(width: u32, height: u32, seed: u64) -> Image {
    let len = (width * height * 4) as usize;
    let raw = (0..len as u64)
        .map(|i| (mix64(seed ^ i) & 0xFF) as u8)
        .collect::<Vec<_>>();
    Image::new(width, height, raw).unwrap()
}

fn reference_blur(image: &Image) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.pixels().len());
    for row in 0..image.height() {
        for col in 0..image.width() {
            out.extend_from_slice(&box3_pixel(image, row, col).unwrap());
        }
    }
    out
}

#[test]
fn flat_image_is_unchanged() {
    let img = Image::filled(7, 5, [12, 34, 56, 78]).unwrap();
    let out = blur(&img, 3).unwrap();
    assert_eq!(out, img);
}

#[test]
fn single_pixel_image_is_unchanged() {
    let img = Image::new(1, 1, vec![1, 2, 3, 4]).unwrap();
    let out = blur(&img, 1).unwrap();
    assert_eq!(out.pixels(), &[1, 2, 3, 4]);
}

#[test]
fn dimensions_are_preserved() {
    let img = noise_image(9, 4, 1);
    let out = blur(&img, 2).unwrap();
    assert_eq!((out.width(), out.height()), (9, 4));
    assert_eq!(out.pixels().len(), img.pixels().len());
}

#[test]
fn output_matches_per_pixel_reference() {
    let img = noise_image(11, 13, 7);
    let out = blur(&img, 4).unwrap();
    assert_eq!(out.pixels(), reference_blur(&img).as_slice());
}

#[test]
fn worker_count_does_not_change_output() {
    // height divisible and not divisible by 4
    for (w, h) in [(10u32, 8u32), (10, 11), (3, 17)] {
        let img = noise_image(w, h, u64::from(w * 31 + h));
        let one = blur(&img, 1).unwrap();
        let four = blur(&img, 4).unwrap();
        assert_eq!(one.pixels(), four.pixels(), "{w}x{h}");
        let every_row = blur(&img, h as usize).unwrap();
        assert_eq!(one.pixels(), every_row.pixels(), "{w}x{h}");
    }
}

#[test]
fn schedulers_produce_identical_output() {
    let img = noise_image(16, 10, 99);
    let scoped = blur_with_opts(
        &img,
        &BlurOpts {
            workers: 3,
            scheduler: Scheduler::ScopedThreads,
        },
    )
    .unwrap();
    let pooled = blur_with_opts(
        &img,
        &BlurOpts {
            workers: 3,
            scheduler: Scheduler::RayonPool,
        },
    )
    .unwrap();
    assert_eq!(scoped.image, pooled.image);
}

#[test]
fn zero_workers_is_config_error() {
    let img = noise_image(4, 4, 0);
    assert!(matches!(blur(&img, 0), Err(BlurError::Config(_))));
}

#[test]
fn more_workers_than_rows_is_config_error() {
    let img = noise_image(4, 3, 0);
    for scheduler in [Scheduler::ScopedThreads, Scheduler::RayonPool] {
        let res = blur_with_opts(
            &img,
            &BlurOpts {
                workers: 4,
                scheduler,
            },
        );
        assert!(matches!(res, Err(BlurError::Config(_))));
    }
}

#[test]
fn report_describes_the_pass() {
    let img = noise_image(5, 10, 3);
    let pass = blur_with_opts(
        &img,
        &BlurOpts {
            workers: 3,
            scheduler: Scheduler::RayonPool,
        },
    )
    .unwrap();

    let report = &pass.report;
    assert_eq!((report.width, report.height), (5, 10));
    assert_eq!(report.workers, 3);
    assert_eq!(report.scheduler, Scheduler::RayonPool);
    assert_eq!(
        report.bands,
        vec![
            RowBand { start: 0, end: 2 },
            RowBand { start: 3, end: 5 },
            RowBand { start: 6, end: 9 },
        ]
    );

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["scheduler"], "rayon_pool");
    assert_eq!(json["bands"][2]["end"], 9);
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: BlurOpts = serde_json::from_str(r#"{ "workers": 3 }"#).unwrap();
    assert_eq!(opts.workers, 3);
    assert_eq!(opts.scheduler, Scheduler::ScopedThreads);

    let opts: BlurOpts = serde_json::from_str(r#"{ "scheduler": "rayon_pool" }"#).unwrap();
    assert_eq!(opts.workers, DEFAULT_WORKERS);
    assert_eq!(opts.scheduler, Scheduler::RayonPool);
}

#[test]
fn split_bands_hands_out_disjoint_row_slices() {
    let mut out = vec![0u8; 2 * 5 * 4];
    let bands = plan_bands(5, 2).unwrap();
    let slots = split_bands(&mut out, &bands, 2);
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].1.len(), 2 * 2 * 4);
    assert_eq!(slots[1].1.len(), 3 * 2 * 4);
}

/// Six one-row bands of a 2x6 image; band `panic_at` panics, band `err_at` fails, the rest
/// fill their rows with 7. Returns the pass result, the output buffer and how many bands ran.
fn faulty_pass(
    scheduler: Scheduler,
    panic_at: usize,
    err_at: usize,
) -> (BlurResult<()>, Vec<u8>, usize) {
    let mut out = vec![0u8; 2 * 6 * 4];
    let bands = plan_bands(6, 6).unwrap();
    let slots = split_bands(&mut out, &bands, 2);
    let ran = AtomicUsize::new(0);

    let res = run_bands(scheduler, slots, |idx, band, rows| {
        ran.fetch_add(1, Ordering::SeqCst);
        if idx == panic_at {
            panic!("band {idx} blew up");
        }
        if idx == err_at {
            return Err(BlurError::worker(format!("band {} failed", band.start)));
        }
        rows.fill(7);
        Ok(())
    });
    (res, out, ran.into_inner())
}

#[test]
fn first_failing_band_wins_and_every_band_runs() {
    for scheduler in [Scheduler::ScopedThreads, Scheduler::RayonPool] {
        let (res, out, ran) = faulty_pass(scheduler, 3, 1);

        let err = res.unwrap_err();
        assert!(matches!(err, BlurError::Worker(_)), "{scheduler:?}: {err}");
        assert!(
            err.to_string().contains("band 1 failed"),
            "{scheduler:?}: {err}"
        );
        assert_eq!(ran, 6, "{scheduler:?}");

        for band in [0usize, 2, 4, 5] {
            let rows = &out[band * 8..(band + 1) * 8];
            assert!(rows.iter().all(|&b| b == 7), "{scheduler:?} band {band}");
        }
    }
}

#[test]
fn panicking_band_becomes_worker_error() {
    for scheduler in [Scheduler::ScopedThreads, Scheduler::RayonPool] {
        let (res, _, ran) = faulty_pass(scheduler, 0, 4);

        let err = res.unwrap_err();
        assert!(matches!(err, BlurError::Worker(_)), "{scheduler:?}: {err}");
        assert!(
            err.to_string().contains("rows [0, 0] panicked"),
            "{scheduler:?}: {err}"
        );
        assert_eq!(ran, 6, "{scheduler:?}");
    }
}

#[test]
fn healthy_bands_all_commit() {
    for scheduler in [Scheduler::ScopedThreads, Scheduler::RayonPool] {
        let (res, out, ran) = faulty_pass(scheduler, usize::MAX, usize::MAX);
        assert!(res.is_ok());
        assert_eq!(ran, 6);
        assert!(out.iter().all(|&b| b == 7));
    }
}
