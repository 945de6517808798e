use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scenecraft::{
    AssetTable, CLIP_FADE_SEC, ElementIdx, FrameReport, ManualScheduler, MemoryAudio,
    PRE_ROLL_SEC, PlayheadController, SceneCraftConfig, StackedView, TrackState,
    lint_clip_bindings, parse_scene,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "scenecraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a chapter fragment and print its elements as JSON.
    Parse(ParseArgs),
    /// Validate a scene config and check its clip bindings against a chapter.
    Check(CheckArgs),
    /// Scroll a synthetic layout through a chapter and print the audio timeline.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct ParseArgs {
    /// Input chapter markup.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Scene config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Chapter markup to check clip bindings against.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Directory audio and image names resolve against.
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input chapter markup.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory audio and image names resolve against. Every name resolves when omitted.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Title shown while in the scene zone.
    #[arg(long)]
    title: Option<String>,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 900.0)]
    viewport: f64,

    /// Scroll speed in pixels per second.
    #[arg(long, default_value_t = 240.0)]
    speed: f64,

    /// Repaints per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Print the timeline as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Parse(args) => cmd_parse(args),
        Command::Check(args) => cmd_check(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn read_fragment(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read chapter '{}'", path.display()))
}

fn read_config(path: &Path) -> anyhow::Result<SceneCraftConfig> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("read scene config '{}'", path.display()))?;
    SceneCraftConfig::from_json(&s).with_context(|| format!("load '{}'", path.display()))
}

type Resolve = Box<dyn Fn(&str) -> Option<String>>;

fn resolver(assets: Option<&Path>) -> Resolve {
    match assets {
        Some(dir) => {
            let dir = dir.to_path_buf();
            Box::new(move |name: &str| {
                let p = dir.join(name);
                p.is_file().then(|| p.display().to_string())
            })
        }
        None => Box::new(|name: &str| Some(name.to_owned())),
    }
}

fn cmd_parse(args: ParseArgs) -> anyhow::Result<()> {
    let elements = parse_scene(&read_fragment(&args.in_path)?);
    let out = if args.pretty {
        serde_json::to_string_pretty(&elements)?
    } else {
        serde_json::to_string(&elements)?
    };
    println!("{out}");
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;
    let elements = match &args.in_path {
        Some(p) => parse_scene(&read_fragment(p)?),
        None => Vec::new(),
    };

    let mut problems = 0usize;
    if args.in_path.is_some() {
        for issue in lint_clip_bindings(&elements, &config) {
            println!("binding: {issue}");
            problems += 1;
        }
    }
    if let Some(dir) = args.assets.as_deref() {
        let resolve = resolver(Some(dir));
        let audio = AssetTable::prepare_audio(&config, &elements, &*resolve);
        let images = AssetTable::prepare_images(&config, &elements, &*resolve);
        for name in audio.missing() {
            println!("missing audio: {name}");
            problems += 1;
        }
        for name in images.missing() {
            println!("missing image: {name}");
            problems += 1;
        }
    }

    if problems > 0 {
        anyhow::bail!("{problems} problem(s) found");
    }
    println!("ok");
    Ok(())
}

#[derive(Debug, Serialize)]
struct Event {
    at_sec: f64,
    what: String,
}

#[derive(Debug, Default)]
struct Timeline {
    events: Vec<Event>,
    tracks: Vec<TrackState>,
    last: FrameReport,
}

impl Timeline {
    fn push(&mut self, at_sec: f64, what: String) {
        self.events.push(Event { at_sec, what });
    }

    fn observe_report(&mut self, at_sec: f64, report: &FrameReport) {
        if report.in_zone != self.last.in_zone {
            let what = if report.in_zone { "zone enter" } else { "zone exit" };
            self.push(at_sec, what.to_owned());
        }
        for (label, prev, cur) in [
            ("dialogue", self.last.dialogue, report.dialogue),
            ("sticky", self.last.sticky, report.sticky),
            ("paragraph", self.last.paragraph, report.paragraph),
        ] {
            if prev != cur {
                self.push(at_sec, format!("{label} -> {}", show(cur)));
            }
        }
        self.last = report.clone();
    }

    fn observe_tracks(&mut self, at_sec: f64, now: &[TrackState]) {
        for (i, t) in now.iter().enumerate() {
            let was_playing = match self.tracks.get(i) {
                Some(before) => before.playing,
                None => {
                    let looped = if t.looped { " (loop)" } else { "" };
                    self.push(at_sec, format!("open {}{looped}", t.src));
                    false
                }
            };
            if was_playing && !t.playing {
                self.push(
                    at_sec,
                    format!("stop {} (peak {:.2})", t.src, t.peak_volume),
                );
            }
        }
        self.tracks = now.to_vec();
    }
}

fn show(idx: Option<ElementIdx>) -> String {
    idx.map_or_else(|| "none".to_owned(), |i| i.to_string())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.viewport > 0.0, "--viewport must be > 0");
    anyhow::ensure!(args.speed > 0.0, "--speed must be > 0");
    anyhow::ensure!(args.fps > 0, "--fps must be > 0");

    let elements = parse_scene(&read_fragment(&args.in_path)?);
    let config = match args.config.as_deref() {
        Some(p) => read_config(p)?,
        None => SceneCraftConfig::default(),
    };

    let resolve = resolver(args.assets.as_deref());
    let audio_table = AssetTable::prepare_audio(&config, &elements, &*resolve);
    let image_table = AssetTable::prepare_images(&config, &elements, &*resolve);
    for name in audio_table.missing().chain(image_table.missing()) {
        tracing::warn!(name, "reference did not resolve; playback stays silent for it");
    }

    let mut view = StackedView::new(&elements, args.viewport);
    let backend = MemoryAudio::new();
    let mut scheduler = ManualScheduler::new();
    let tail_sec = config.fade_out.max(CLIP_FADE_SEC) + 0.5;

    let mut controller = PlayheadController::new(elements, config);
    if let Some(title) = args.title {
        controller = controller.with_title(title);
    }
    controller.start(audio_table, image_table, backend.clone(), &mut scheduler);

    let dt = 1.0 / f64::from(args.fps);
    let total_sec = PRE_ROLL_SEC + view.max_scroll() / args.speed + tail_sec;
    let frames = (total_sec / dt).ceil() as u64;
    tracing::info!(frames, total_sec, "simulating");

    let mut timeline = Timeline::default();
    for i in 0..=frames {
        let now = i as f64 * dt;
        view.set_scroll(args.speed * (now - PRE_ROLL_SEC).max(0.0));
        for request in scheduler.advance(now) {
            if let Some(report) = controller.on_frame(request, now, &mut view, &mut scheduler) {
                timeline.observe_report(now, &report);
            }
        }
        timeline.observe_tracks(now, &backend.tracks());
    }
    controller.stop(&mut scheduler);
    timeline.observe_tracks(frames as f64 * dt, &backend.tracks());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timeline.events)?);
    } else {
        for e in &timeline.events {
            println!("{:>9.3}s  {}", e.at_sec, e.what);
        }
    }
    Ok(())
}
