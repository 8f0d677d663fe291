#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter exercising the LevelForge core over JSON-serialized
//! grids: `generate`, `validate`, `refine`, and an ASCII `render` preview.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use levelforge_core::{
    Cell, GeneratorKnobs, PlayerSpec, RefineRect, RefineRequest, SemanticGrid, SerializedGrid,
    GRID_HEIGHT, GRID_WIDTH,
};
use levelforge_system_generator::LevelGenerator;
use levelforge_system_reachability::ReachabilityValidator;
use levelforge_system_refiner::RegionRefiner;

#[derive(Parser)]
#[command(name = "levelforge", about = "Procedural platformer level generation toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a validated level from a seed.
    Generate(GenerateArgs),
    /// Validate an existing grid's reachability.
    Validate(ValidateArgs),
    /// Regenerate a rectangular region of an existing grid.
    Refine(RefineArgs),
    /// Print an ASCII preview of a grid.
    Render(RenderArgs),
}

#[derive(Args, Clone, Copy)]
struct MovementArgs {
    #[arg(long, default_value_t = 4)]
    jump_height: i32,
    #[arg(long, default_value_t = 5)]
    jump_distance: i32,
    #[arg(long, default_value_t = 6)]
    safe_drop: i32,
}

impl MovementArgs {
    fn to_spec(self) -> PlayerSpec {
        PlayerSpec::new(self.jump_height, self.jump_distance, self.safe_drop)
    }
}

#[derive(Args, Clone, Copy)]
struct KnobArgs {
    #[arg(long, default_value_t = 8)]
    count: i32,
    #[arg(long, default_value_t = 2)]
    min_width: i32,
    #[arg(long, default_value_t = 6)]
    max_width: i32,
    #[arg(long, default_value_t = 0.5)]
    verticality: f64,
    #[arg(long, default_value_t = 0.3)]
    difficulty: f64,
}

impl KnobArgs {
    fn to_knobs(self) -> GeneratorKnobs {
        GeneratorKnobs {
            target_foothold_count: self.count,
            min_foothold_width: self.min_width,
            max_foothold_width: self.max_width,
            verticality: self.verticality,
            difficulty: self.difficulty,
        }
    }
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long)]
    seed: u64,
    #[command(flatten)]
    knobs: KnobArgs,
    #[command(flatten)]
    movement: MovementArgs,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let generator = LevelGenerator::new(args.movement.to_spec());
    let result = generator
        .generate(args.seed, args.knobs.to_knobs())
        .context("level generation failed")?;

    write_grid(&result.grid, args.out.as_deref())?;
    eprintln!(
        "generated in {} attempt(s), seed {} | {}",
        result.attempts, result.seed_used, result.report
    );
    Ok(())
}

#[derive(Args)]
struct ValidateArgs {
    #[arg(long = "in")]
    input: PathBuf,
    #[command(flatten)]
    movement: MovementArgs,
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let grid = read_grid(&args.input)?;
    let validator = ReachabilityValidator::new(args.movement.to_spec());
    let report = validator.validate(&grid, None, None);
    println!("{report}");
    if !report.reachable {
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Args)]
struct RefineArgs {
    #[arg(long = "in")]
    input: PathBuf,
    #[arg(long, value_parser = parse_rect)]
    rect: RectArg,
    #[arg(long, default_value_t = 0.0)]
    difficulty_delta: f64,
    #[arg(long, default_value_t = 0.0)]
    verticality_delta: f64,
    #[arg(long)]
    add_secret: bool,
    #[arg(long)]
    smooth_silhouette: bool,
    #[arg(long)]
    seed: u64,
    #[command(flatten)]
    knobs: KnobArgs,
    #[command(flatten)]
    movement: MovementArgs,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug)]
struct RectArg {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

fn parse_rect(s: &str) -> Result<RectArg, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,w,h, got `{s}`"));
    }
    let mut nums = [0i32; 4];
    for (slot, part) in nums.iter_mut().zip(parts.iter()) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid integer `{part}` in rect"))?;
    }
    Ok(RectArg {
        x: nums[0],
        y: nums[1],
        w: nums[2],
        h: nums[3],
    })
}

fn run_refine(args: RefineArgs) -> Result<()> {
    let grid = read_grid(&args.input)?;
    let rect = RefineRect::new(args.rect.x, args.rect.y, args.rect.w, args.rect.h);
    let request = RefineRequest {
        difficulty_delta: args.difficulty_delta,
        verticality_delta: args.verticality_delta,
        add_secret: args.add_secret,
        smooth_silhouette: args.smooth_silhouette,
    };
    let refiner = RegionRefiner::new(args.movement.to_spec());
    let (new_grid, report) = refiner.refine(&grid, rect, request, args.seed, args.knobs.to_knobs());
    write_grid(&new_grid, Some(&args.out))?;
    eprintln!("{report}");
    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long = "in")]
    input: PathBuf,
}

fn run_render(args: RenderArgs) -> Result<()> {
    let grid = read_grid(&args.input)?;
    println!("{}", render_ascii(&grid));
    Ok(())
}

/// ASCII preview using a fixed precedence scheme: `#` solid, `^` hazard,
/// `=` oneway, `G` goal, `S` start, `.` empty.
fn render_ascii(grid: &SemanticGrid) -> String {
    let mut out = String::new();
    for y in 0..GRID_HEIGHT as i32 {
        for x in 0..GRID_WIDTH as i32 {
            let cell = grid.get(x, y).expect("within grid bounds");
            let ch = if cell.intersects(Cell::SOLID) {
                '#'
            } else if cell.intersects(Cell::HAZARD) {
                '^'
            } else if cell.intersects(Cell::ONEWAY) {
                '='
            } else if cell.intersects(Cell::GOAL) {
                'G'
            } else if cell.intersects(Cell::START) {
                'S'
            } else {
                '.'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

fn read_grid(path: &Path) -> Result<SemanticGrid> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let serialized: SerializedGrid = serde_json::from_str(&data)
        .with_context(|| format!("parsing {} as a serialized grid", path.display()))?;
    SemanticGrid::from_serialized(&serialized).context("decoding serialized grid")
}

fn write_grid(grid: &SemanticGrid, out: Option<&Path>) -> Result<()> {
    let serialized = grid.to_serialized();
    let json = serde_json::to_string_pretty(&serialized).context("encoding grid as JSON")?;
    match out {
        Some(path) => fs::write(path, json).with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Refine(args) => run_refine(args),
        Command::Render(args) => run_render(args),
    }
}
