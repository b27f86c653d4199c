use std::path::PathBuf;

use rowblur::{BlurOpts, Image, Scheduler, blur_with_opts, save_png};

fn parse_scheduler() -> anyhow::Result<Scheduler> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("threads") | None => Ok(Scheduler::ScopedThreads),
        Some("rayon") => Ok(Scheduler::RayonPool),
        Some(other) => anyhow::bail!("unknown scheduler '{other}', expected 'threads' or 'rayon'"),
    }
}

fn checkerboard(width: u32, height: u32, cell: u32) -> anyhow::Result<Image> {
    let mut raw = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            let px = if on {
                [240, 240, 240, 255]
            } else {
                [20, 24, 36, 255]
            };
            raw.extend_from_slice(&px);
        }
    }
    Ok(Image::new(width, height, raw)?)
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let scheduler = parse_scheduler()?;
    let img = checkerboard(256, 256, 16)?;

    let mut current = img;
    for _ in 0..4 {
        let pass = blur_with_opts(
            &current,
            &BlurOpts {
                workers: 8,
                scheduler,
            },
        )?;
        current = pass.image;
    }

    let out_path = PathBuf::from("target").join("demos").join("blur.png");
    save_png(&current, &out_path)?;
    eprintln!("wrote {}", out_path.display());
    Ok(())
}
