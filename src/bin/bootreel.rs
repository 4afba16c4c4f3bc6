use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bootreel::{
    AnimationConfig, CancelToken, FailurePolicy, FrameIndex, FrameSequencer, PngSequenceSink,
    SequenceOpts,
};

#[derive(Parser, Debug)]
#[command(name = "bootreel", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the whole animation as a numbered PNG sequence.
    Render(RenderArgs),
}

/// Config layering shared by every subcommand: defaults, then `--config`, then flags.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    fps: Option<u32>,

    /// Duration in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Particle count.
    #[arg(long)]
    particles: Option<u32>,

    /// Wordmark text.
    #[arg(long)]
    title: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<AnimationConfig> {
        let mut cfg = match &self.config {
            Some(path) => AnimationConfig::from_path(path)?,
            None => AnimationConfig::default(),
        };
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.fps {
            cfg.fps = v;
        }
        if let Some(v) = self.duration {
            cfg.duration_secs = v;
        }
        if let Some(v) = self.particles {
            cfg.particle_count = v;
        }
        if let Some(v) = &self.title {
            cfg.title = v.clone();
        }
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out: PathBuf,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Keep going when a frame fails instead of aborting.
    #[arg(long, default_value_t = false)]
    skip_failed: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.config.load()?;
    let seq = FrameSequencer::new(cfg)?;
    let frame = seq.render_frame(FrameIndex(args.frame))?;
    bootreel::write_png(&args.out, &frame)
        .with_context(|| format!("save frame {}", args.frame))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = args.config.load()?;
    let seq = FrameSequencer::new(cfg)?;

    let opts = SequenceOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        failure_policy: if args.skip_failed {
            FailurePolicy::SkipAndContinue
        } else {
            FailurePolicy::Abort
        },
        ..SequenceOpts::default()
    };
    let mut sink = PngSequenceSink::new(&args.out);
    let stats = seq.render_all(&opts, &mut sink, &CancelToken::new())?;

    let cfg = seq.config();
    println!("Generated {} frames", stats.frames_rendered);
    if stats.frames_skipped > 0 {
        println!("Skipped: {} frames", stats.frames_skipped);
    }
    println!("Frame rate: {} fps", cfg.fps);
    println!("Duration: {} seconds", cfg.duration_secs);
    println!("Resolution: {}x{}", cfg.width, cfg.height);
    println!("Output: {}", args.out.display());
    Ok(())
}
