use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser, ValueEnum};
use dialoguer::{Input, Select};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(feature = "server")]
use untangle::serve::{ServeArgs, run_serve};
use untangle::{
    Bounds, GameConfig, Level, Phase, Point, Puzzle, PuzzleSnapshot, generate_with_rng,
    render_svg, render_text,
};

#[derive(Debug, Clone)]
enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    /// `-` is stdout; no path at all means `level-<n>.<ext>` in the working
    /// directory.
    fn resolve(output: Option<&str>, level: u32, format: Option<OutputFormat>) -> Result<Self> {
        let path = match output {
            Some("-") => return Ok(Self::Stdout),
            Some(path) => PathBuf::from(path),
            None => {
                let ext = format.unwrap_or(OutputFormat::Svg).extension();
                return Ok(Self::File(PathBuf::from(format!("level-{level}.{ext}"))));
            }
        };

        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
                bail!("cannot write to '{}': no such directory", dir.display())
            }
            _ => Ok(Self::File(path)),
        }
    }

    fn format(&self, forced: Option<OutputFormat>) -> Result<OutputFormat> {
        match (forced, self) {
            (Some(format), _) => Ok(format),
            (None, Self::Stdout) => Ok(OutputFormat::Svg),
            (None, Self::File(path)) => OutputFormat::from_path(path).with_context(|| {
                format!(
                    "cannot infer a format from '{}'; pass --output-format",
                    path.display()
                )
            }),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "untangle",
    about = "Generate untangle puzzle levels and write them as SVG, PNG or JSON."
)]
pub struct RenderArgs {
    /// Level to generate (defaults to UNTANGLE_START_LEVEL or 1).
    #[arg(short = 'l', long = "level")]
    level: Option<u32>,

    /// Seed for the layout; a random seed is chosen and reported when omitted.
    #[arg(short = 'S', long = "seed")]
    seed: Option<u64>,

    /// Width of the playable area.
    #[arg(long)]
    width: Option<f32>,

    /// Height of the playable area.
    #[arg(long)]
    height: Option<f32>,

    /// Path to the output file. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Output format (defaults to the output file extension or svg).
    #[arg(short = 'e', long = "output-format")]
    output_format: Option<OutputFormat>,

    /// Convenience flag to force PNG output without specifying --output-format.
    #[arg(long = "png", action = ArgAction::SetTrue, conflicts_with = "output_format")]
    png: bool,

    /// Scale factor when rasterizing PNG output.
    #[arg(long = "scale", default_value_t = 1.0)]
    scale: f32,

    /// Background color for the rendered level.
    #[arg(short = 'b', long = "background-color", default_value = "white")]
    background_color: String,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

#[derive(Debug, Parser)]
#[command(name = "untangle play", about = "Play levels interactively in the terminal.")]
pub struct PlayArgs {
    /// Level to start at (defaults to UNTANGLE_START_LEVEL or 1).
    #[arg(short = 'l', long = "level")]
    level: Option<u32>,

    /// Seed for reproducible layouts.
    #[arg(short = 'S', long = "seed")]
    seed: Option<u64>,

    /// Width of the playable area.
    #[arg(long)]
    width: Option<f32>,

    /// Height of the playable area.
    #[arg(long)]
    height: Option<f32>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
        {
            Some(ext) if ext == "svg" => Some(OutputFormat::Svg),
            Some(ext) if ext == "png" => Some(OutputFormat::Png),
            Some(ext) if ext == "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayAction {
    Move,
    Skip,
    Quit,
}

impl PlayAction {
    const ALL: [PlayAction; 3] = [PlayAction::Move, PlayAction::Skip, PlayAction::Quit];

    fn label(self) -> &'static str {
        match self {
            PlayAction::Move => "Move a node",
            PlayAction::Skip => "Skip to the next level",
            PlayAction::Quit => "Quit",
        }
    }
}

fn resolve_level(requested: Option<u32>, config: &GameConfig) -> Result<u32> {
    let level = requested.unwrap_or(config.start_level);
    if level == 0 {
        bail!("--level must be at least 1");
    }
    Ok(level)
}

fn resolve_bounds(config: &GameConfig, width: Option<f32>, height: Option<f32>) -> Result<Bounds> {
    config
        .bounds(width, height)
        .context("invalid playable area")
}

fn run_render(cli: RenderArgs) -> Result<()> {
    let config = GameConfig::default();
    let number = resolve_level(cli.level, &config)?;
    let bounds = resolve_bounds(&config, cli.width, cli.height)?;

    let format_preference = if cli.png {
        Some(OutputFormat::Png)
    } else {
        cli.output_format
    };
    let output_dest = OutputDestination::resolve(cli.output.as_deref(), number, format_preference)?;
    let format = output_dest.format(format_preference)?;

    if format == OutputFormat::Png {
        bounds.raster_size(cli.scale).context("invalid --scale")?;
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    debug!(level = number, seed, "generating level");
    let level = generate_with_rng(number, &bounds, &mut StdRng::seed_from_u64(seed));

    let output_bytes = match format {
        OutputFormat::Svg => render_svg(&level, &bounds, &cli.background_color)?.into_bytes(),
        OutputFormat::Png => render_png_bytes(&level, &bounds, &cli.background_color, cli.scale)?,
        OutputFormat::Json => {
            let snapshot = PuzzleSnapshot::of(&level, Phase::Playing);
            let mut json = serde_json::to_string_pretty(&snapshot)?;
            json.push('\n');
            json.into_bytes()
        }
    };

    write_output(output_dest, &output_bytes, &level, seed, cli.quiet)?;

    Ok(())
}

#[cfg(feature = "png")]
fn render_png_bytes(level: &Level, bounds: &Bounds, background: &str, scale: f32) -> Result<Vec<u8>> {
    untangle::render_png(level, bounds, background, scale)
}

#[cfg(not(feature = "png"))]
fn render_png_bytes(_level: &Level, _bounds: &Bounds, _background: &str, _scale: f32) -> Result<Vec<u8>> {
    bail!("PNG output requires the 'png' feature to be enabled")
}

fn run_play(cli: PlayArgs) -> Result<()> {
    let config = GameConfig::default();
    let number = resolve_level(cli.level, &config)?;
    let bounds = resolve_bounds(&config, cli.width, cli.height)?;
    let mut puzzle = Puzzle::starting_at(number, bounds, cli.seed);

    println!(
        "Drag nodes until no edges cross. The area is {:.0}x{:.0}.",
        bounds.width(),
        bounds.height()
    );

    loop {
        println!();
        print!("{}", render_text(puzzle.level(), puzzle.phase()));

        let labels: Vec<&str> = PlayAction::ALL.iter().map(|action| action.label()).collect();
        let selection = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()
            .context("selection was cancelled")?;

        match PlayAction::ALL[selection] {
            PlayAction::Move => {
                let (node, target) = prompt_move(puzzle.level())?;
                puzzle.set_position(node, target);
                if puzzle.release() == Phase::Cleared {
                    println!("Level {} cleared!", puzzle.level().number());
                    puzzle.advance_level();
                }
            }
            PlayAction::Skip => puzzle.advance_level(),
            PlayAction::Quit => break,
        }
    }

    Ok(())
}

fn prompt_move(level: &Level) -> Result<(usize, Point)> {
    let count = level.node_count();
    let node: usize = Input::new()
        .with_prompt(format!("Node to move (0-{})", count - 1))
        .validate_with(move |value: &usize| -> Result<(), String> {
            if *value < count {
                Ok(())
            } else {
                Err(format!("pick a node between 0 and {}", count - 1))
            }
        })
        .interact_text()
        .context("node selection was cancelled")?;

    let current = level.position(node);
    let x: f32 = Input::new()
        .with_prompt("New x")
        .default(current.x)
        .validate_with(finite_coordinate)
        .interact_text()
        .context("x coordinate was cancelled")?;
    let y: f32 = Input::new()
        .with_prompt("New y")
        .default(current.y)
        .validate_with(finite_coordinate)
        .interact_text()
        .context("y coordinate was cancelled")?;

    Ok((node, Point::new(x, y)))
}

fn finite_coordinate(value: &f32) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{value} is not a usable coordinate"))
    }
}

#[cfg(feature = "server")]
pub async fn dispatch() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let serve_args = ServeArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_serve(serve_args).await
        }
        _ => dispatch_sync_from(args),
    }
}

#[cfg(not(feature = "server"))]
pub fn dispatch_sync() -> Result<()> {
    dispatch_sync_from(std::env::args().collect())
}

fn dispatch_sync_from(args: Vec<String>) -> Result<()> {
    match args.get(1).map(|s| s.as_str()) {
        Some("play") => {
            let play_args = PlayArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_play(play_args)
        }
        Some("render") => {
            let render_args = RenderArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_render(render_args)
        }
        Some("serve") => Err(anyhow!(
            "'serve' command requires the 'server' feature to be enabled"
        )),
        _ => {
            let render_args = RenderArgs::parse_from(args);
            run_render(render_args)
        }
    }
}

fn write_output(
    dest: OutputDestination,
    bytes: &[u8],
    level: &Level,
    seed: u64,
    quiet: bool,
) -> Result<()> {
    match dest {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
        OutputDestination::File(path) => {
            fs::write(&path, bytes)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            if !quiet {
                println!(
                    "Generated level {} ({} nodes, seed {}) -> {}",
                    level.number(),
                    level.node_count(),
                    seed,
                    path.display()
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension_unless_forced() {
        let dest = OutputDestination::File(PathBuf::from("board.PNG"));
        assert_eq!(dest.format(None).unwrap(), OutputFormat::Png);
        assert_eq!(
            dest.format(Some(OutputFormat::Json)).unwrap(),
            OutputFormat::Json
        );
        assert_eq!(OutputDestination::Stdout.format(None).unwrap(), OutputFormat::Svg);
        let unknown = OutputDestination::File(PathBuf::from("board.txt"));
        assert!(unknown.format(None).is_err());
    }

    #[test]
    fn default_output_is_named_after_the_level() {
        match OutputDestination::resolve(None, 3, Some(OutputFormat::Json)).unwrap() {
            OutputDestination::File(path) => assert_eq!(path, PathBuf::from("level-3.json")),
            OutputDestination::Stdout => panic!("expected a file destination"),
        }
        assert!(matches!(
            OutputDestination::resolve(Some("-"), 1, None).unwrap(),
            OutputDestination::Stdout
        ));
        assert!(OutputDestination::resolve(Some("/definitely/missing/dir/out.svg"), 1, None).is_err());
    }

    #[test]
    fn play_prompts_refuse_non_finite_coordinates() {
        assert!(finite_coordinate(&12.5).is_ok());
        assert!(finite_coordinate(&f32::NAN).is_err());
        assert!(finite_coordinate(&f32::NEG_INFINITY).is_err());
    }

    #[test]
    fn level_zero_is_refused() {
        let config = GameConfig::from_lookup(|_| None);
        assert!(resolve_level(Some(0), &config).is_err());
        assert_eq!(resolve_level(None, &config).unwrap(), 1);
    }
}
