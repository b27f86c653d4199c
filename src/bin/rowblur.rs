use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "rowblur", version)]
struct Cli {
    /// Input image (PNG or any other format the decoder understands).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Number of row bands, one worker thread each (default 8).
    #[arg(long)]
    workers: Option<usize>,

    /// How worker threads are created.
    #[arg(long, value_enum)]
    scheduler: Option<SchedulerChoice>,

    /// JSON file with blur options. Flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the pass report as JSON on stdout.
    #[arg(long)]
    report: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchedulerChoice {
    Threads,
    Rayon,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let opts = resolve_opts(&cli)?;

    let input = rowblur::load_image(&cli.in_path)?;
    eprintln!("resolution: {} x {}", input.width(), input.height());

    let pass = rowblur::blur_with_opts(&input, &opts)
        .with_context(|| format!("blur '{}'", cli.in_path.display()))?;
    rowblur::save_png(&pass.image, &cli.out)?;

    if cli.report {
        let json = serde_json::to_string_pretty(&pass.report).context("serialize pass report")?;
        println!("{json}");
    }

    eprintln!("wrote {}", cli.out.display());
    Ok(())
}

fn resolve_opts(cli: &Cli) -> anyhow::Result<rowblur::BlurOpts> {
    let mut opts = match &cli.config {
        Some(path) => read_opts_json(path)?,
        None => rowblur::BlurOpts::default(),
    };
    if let Some(workers) = cli.workers {
        opts.workers = workers;
    }
    if let Some(choice) = cli.scheduler {
        opts.scheduler = match choice {
            SchedulerChoice::Threads => rowblur::Scheduler::ScopedThreads,
            SchedulerChoice::Rayon => rowblur::Scheduler::RayonPool,
        };
    }
    Ok(opts)
}

fn read_opts_json(path: &Path) -> anyhow::Result<rowblur::BlurOpts> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let opts: rowblur::BlurOpts =
        serde_json::from_reader(r).with_context(|| "parse blur options JSON")?;
    Ok(opts)
}
