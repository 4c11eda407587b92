use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fxchain::render::device::TextureData;
use fxchain::{
    Compositor, CubeLut, EffectRegistry, EngineConfig, FramePlan, FrameIndex, GpuDevice, LutCache,
    LutDim, RecordingDevice, RenderContext, register_builtins,
};

#[derive(Parser, Debug)]
#[command(name = "fxchain", version, about = "Chained-effects compositor tools")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a Cube LUT and print its header.
    LutInfo(LutInfoArgs),
    /// Apply a Cube LUT to an image on the CPU.
    ApplyLut(ApplyLutArgs),
    /// Compose a JSON frame plan against the recording device and print the outcome.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct LutInfoArgs {
    /// Input `.cube` file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ApplyLutArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// `.cube` file to apply.
    #[arg(long)]
    lut: PathBuf,

    /// Output image path; format follows the extension.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Frame plan JSON.
    #[arg(long)]
    plan: PathBuf,

    /// Engine config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compose the plan this many times in a row (frame index advances).
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Print every recorded device command.
    #[arg(long)]
    dump_commands: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::LutInfo(args) => cmd_lut_info(args),
        Command::ApplyLut(args) => cmd_apply_lut(args),
        Command::Compose(args) => cmd_compose(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_lut_info(args: LutInfoArgs) -> anyhow::Result<()> {
    let lut = CubeLut::load(&args.in_path)?;
    let dim = match lut.dim {
        LutDim::OneD => "1d",
        LutDim::ThreeD => "3d",
    };
    println!("title: {}", lut.title.as_deref().unwrap_or("-"));
    println!("dimension: {dim}");
    println!("size: {}", lut.size);
    println!("entries: {}", lut.entry_count());
    println!("domain_min: {:?}", lut.domain_min);
    println!("domain_max: {:?}", lut.domain_max);
    Ok(())
}

fn cmd_apply_lut(args: ApplyLutArgs) -> anyhow::Result<()> {
    let lut = CubeLut::load(&args.lut)?;
    let img = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?;
    let mut rgba = img.to_rgba8();
    lut.apply_rgba8(&mut rgba)?;
    rgba.save(&args.out)
        .with_context(|| format!("write image '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        rgba.width(),
        rgba.height()
    );
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let plan = FramePlan::from_json_file(&args.plan)?;
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let lut_root = args
        .plan
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let luts = LutCache::with_loader(config.lut_eviction, config.lut_failure, move |path| {
        CubeLut::load(&lut_root.join(path))
    });

    let mut effects = EffectRegistry::new();
    register_builtins(&mut effects, &luts)?;
    let compositor = Compositor::new(&config);
    let mut ctx = RenderContext::enter(RecordingDevice::new(), luts, config, &mut effects)?;

    let mut sources = Vec::with_capacity(plan.tracks.len());
    for track in &plan.tracks {
        let (w, h) = (track.source.width, track.source.height);
        let texels = vec![128u8; w as usize * h as usize * 4];
        let texture = ctx.device_mut().create_texture(TextureData::Rgba8 {
            width: w,
            height: h,
            texels: &texels,
        })?;
        sources.push(texture);
    }

    for n in 0..args.frames {
        let frame = FrameIndex(plan.frame.0 + n);
        let mut tracks = plan.build_tracks(&effects)?;
        for (track, texture) in tracks.iter_mut().zip(&sources) {
            track.source.texture = Some(*texture);
        }
        ctx.begin_frame(plan.canvas);
        let outcomes = {
            let mut scope = ctx.scope();
            compositor.compose_frame(&mut scope, &mut effects, frame, &mut tracks)
        };
        for o in &outcomes {
            match &o.error {
                None => println!(
                    "frame {} track {}: {:?} draws={} skipped={} dropped={}",
                    frame.0, o.track, o.state, o.draws, o.skipped, o.dropped
                ),
                Some(err) => println!("frame {} track {}: skipped ({err})", frame.0, o.track),
            }
        }
    }

    if args.dump_commands {
        for cmd in ctx.device().commands() {
            println!("{cmd:?}");
        }
    }
    println!("draws: {}", ctx.device().draw_count());

    let mut device = ctx.teardown(&mut effects);
    for texture in sources {
        device.delete_texture(texture);
    }
    let (textures, buffers, programs) = device.live_objects();
    tracing::debug!(textures, buffers, programs, "device objects after teardown");
    Ok(())
}
