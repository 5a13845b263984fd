use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use projview::config::Config;
use projview::encoding::{encode, EncodingState, OutsideWindowPolicy};
use projview::rendering;
use projview::session::{Event, Session};
use projview::table::{FeatureTable, Granularity};
use projview::utils::{logger, report};
use projview::viewer::{periodic, project, AxisColors, RepetitionSpec};
use projview::{io, Dataset};

/// Feature-space projection viewer for atomistic datasets
#[derive(Parser, Debug)]
#[command(name = "projview")]
#[command(version)]
#[command(about = "Scatter-plot projections of structure features linked to 3D viewer payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to settings.json in the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extended XYZ file with the structures
    #[arg(long, global = true)]
    fxyz: Option<String>,

    /// Table granularity: structure (molecular) or atom (atomic)
    #[arg(long, global = true)]
    mode: Option<Granularity>,

    /// Species kept in atom mode: "all" or a list like "Si,O"
    #[arg(long, global = true)]
    species: Option<String>,

    /// Title of the viewer
    #[arg(long, global = true)]
    title: Option<String>,

    /// Radius of the cutoff sphere drawn around the selected atom (Å)
    #[arg(long, global = true)]
    soap_cutoff: Option<f64>,

    /// Radius of the marker sphere on the selected atom (Å)
    #[arg(long, global = true)]
    marker_radius: Option<f64>,

    /// Cell axis colours: abc_blue_red_green or abc_red_green_blue
    #[arg(long, global = true)]
    axis_colors: Option<AxisColors>,

    /// More output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summary of the structures and the feature table
    Info,

    /// Scatter figure of chosen columns
    Plot(PlotArgs),

    /// 3D viewer payload of one table row
    View(ViewArgs),

    /// Feed a JSON array of events through a session, one update per line
    Replay(ReplayArgs),

    /// Write the periodic repetition of one structure as extended XYZ
    Supercell(SupercellArgs),
}

#[derive(Parser, Debug)]
struct PlotArgs {
    /// x column (name or index)
    #[arg(long, default_value = "0")]
    x: String,

    /// y column (name or index)
    #[arg(long, default_value = "0")]
    y: String,

    /// Marker size column (name or index)
    #[arg(long, default_value = "0")]
    size: String,

    /// Marker colour column (name or index)
    #[arg(long, default_value = "0")]
    color: String,

    /// Marker size range in px
    #[arg(long, value_delimiter = ',', num_args = 2, default_value = "5,50")]
    size_range: Vec<f64>,

    /// Size clamp window, percent of the value span
    #[arg(long, value_delimiter = ',', num_args = 2, default_value = "0,100")]
    size_limits: Vec<f64>,

    /// Colour window, percent of the value span
    #[arg(long, value_delimiter = ',', num_args = 2, default_value = "0,100")]
    color_limits: Vec<f64>,

    /// Marker opacity in [0, 1]
    #[arg(long)]
    opacity: Option<String>,

    /// Colourscale name (e.g. Viridis, RdBu, Jet_r)
    #[arg(long)]
    colorscale: Option<String>,

    /// Points outside the colour window: clamp or hide
    #[arg(long)]
    outside_window: Option<OutsideWindowPolicy>,

    /// Figure JSON output (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Also render the plot to an SVG file
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Also render the plot to a PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Width of the rendered image (px)
    #[arg(long, default_value = "900")]
    width: u32,
}

#[derive(Parser, Debug)]
struct ViewArgs {
    /// Table row to show
    #[arg(long, default_value = "0")]
    row: usize,

    /// Periodic repetition, e.g. "(0,2) (0,1) (0,1)"
    #[arg(long, default_value = "(0,1) (0,1) (0,1)")]
    repeat: String,

    /// Payload JSON output (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// JSON file holding an array of events
    events: PathBuf,

    /// Skip the updates emitted for the initial load
    #[arg(long)]
    skip_initial: bool,
}

#[derive(Parser, Debug)]
struct SupercellArgs {
    /// Index of the structure in the file
    #[arg(long, default_value = "0")]
    index: usize,

    /// Periodic repetition, e.g. "(0,2) (0,2) (0,1)"
    #[arg(long)]
    repeat: String,

    /// Output file (.xyz or .json)
    #[arg(long, short = 'o', required = true)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(logger::level_for_verbosity(cli.verbose)) {
        eprintln!("Logger setup failed: {}", e);
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    // 1. Config file, then command-line overrides
    let (mut cfg, msg) = Config::load(cli.config.as_deref());
    if msg.starts_with("Error") {
        log::warn!("{}", msg);
    } else {
        log::info!("{}", msg);
    }

    if let Some(path) = cli.fxyz {
        cfg.extended_xyz_file = Some(path);
    }
    if let Some(mode) = cli.mode {
        cfg.mode = mode;
    }
    if let Some(species) = cli.species {
        cfg.consider_species = species;
    }
    if let Some(title) = cli.title {
        cfg.title = title;
    }
    if let Some(r) = cli.soap_cutoff {
        cfg.soap_cutoff_radius = r;
    }
    if let Some(r) = cli.marker_radius {
        cfg.marker_radius = r;
    }
    if let Some(c) = cli.axis_colors {
        cfg.axis_colors = c;
    }

    // 2. Data
    let path = cfg
        .extended_xyz_file
        .clone()
        .ok_or("No structure file given (--fxyz or extended_xyz_file in the config)")?;
    let dataset = Dataset::load_with_species(&path, cfg.mode, &cfg.species())
        .map_err(|e| format!("{}: {}", path, e))?;

    // 3. Command
    match cli.command {
        Commands::Info => {
            print!("{}", report::dataset_summary(&dataset, &path));
            Ok(())
        }
        Commands::Plot(args) => run_plot(&dataset, &cfg, args),
        Commands::View(args) => {
            let spec: RepetitionSpec = args.repeat.parse()?;
            let payload = project(&dataset, args.row, &spec, &cfg.viewer_settings())
                .map_err(|e| e.to_string())?;
            write_json(args.output.as_deref(), &payload)
        }
        Commands::Replay(args) => run_replay(dataset, &cfg, args),
        Commands::Supercell(args) => run_supercell(&dataset, args),
    }
}

fn run_plot(dataset: &Dataset, cfg: &Config, args: PlotArgs) -> Result<(), String> {
    let table = &dataset.table;
    let state = EncodingState {
        x: column_index(table, &args.x)?,
        y: column_index(table, &args.y)?,
        size: column_index(table, &args.size)?,
        color: column_index(table, &args.color)?,
        size_range: pair(&args.size_range, [5.0, 50.0]),
        size_limits: pair(&args.size_limits, [0.0, 100.0]),
        color_limits: pair(&args.color_limits, [0.0, 100.0]),
        opacity: args.opacity,
        colorscale: args.colorscale,
        outside_window: args.outside_window.unwrap_or(cfg.outside_window),
    };

    let enc = encode(table, &state, dataset.hover_texts()).map_err(|e| e.to_string())?;
    let size = (args.width, cfg.height_graph);

    if let Some(svg) = &args.svg {
        rendering::save_svg(&enc, &cfg.title, &svg.to_string_lossy(), size)?;
    }
    if let Some(png) = &args.png {
        rendering::save_png(&enc, &cfg.title, &png.to_string_lossy(), size)?;
    }

    write_json(args.output.as_deref(), &enc.figure(Some(cfg.height_graph)))
}

fn run_replay(dataset: Dataset, cfg: &Config, args: ReplayArgs) -> Result<(), String> {
    let text = fs::read_to_string(&args.events)
        .map_err(|e| format!("{}: {}", args.events.display(), e))?;
    let events: Vec<Event> =
        serde_json::from_str(&text).map_err(|e| format!("{}: {}", args.events.display(), e))?;

    let encoding = EncodingState {
        outside_window: cfg.outside_window,
        ..EncodingState::default()
    };
    let mut session = Session::new(dataset, cfg.viewer_settings())
        .with_graph_height(cfg.height_graph)
        .with_encoding(encoding);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if !args.skip_initial {
        for update in session.initial_updates() {
            write_line(&mut out, &update)?;
        }
    }

    for event in events {
        for update in session.handle(event) {
            write_line(&mut out, &update)?;
        }
    }
    out.flush().map_err(|e| e.to_string())
}

fn run_supercell(dataset: &Dataset, args: SupercellArgs) -> Result<(), String> {
    let spec: RepetitionSpec = args.repeat.parse()?;
    let structure = dataset
        .structures
        .get(args.index)
        .ok_or_else(|| format!("No structure {} ({} loaded)", args.index, dataset.structures.len()))?;
    if !structure.is_3d_periodic() {
        return Err(format!("Structure {} has no 3D cell to repeat", args.index));
    }

    let supercell = periodic::supercell(structure, &spec);

    let output = args.output.to_string_lossy().to_string();
    io::save_structures(&output, &[supercell]).map_err(|e| format!("{}: {}", output, e))?;
    log::info!("Supercell {} of structure {} written to {}", spec, args.index, output);
    Ok(())
}

/// Column by name, or by index when the text is a number.
fn column_index(table: &FeatureTable, key: &str) -> Result<usize, String> {
    if let Some(i) = table.column_names().iter().position(|n| *n == key) {
        return Ok(i);
    }
    match key.parse::<usize>() {
        Ok(i) if i < table.n_columns() => Ok(i),
        _ => Err(format!(
            "Unknown column '{}'. Available: {}",
            key,
            table.column_names().join(", ")
        )),
    }
}

fn pair(values: &[f64], default: [f64; 2]) -> [f64; 2] {
    match values {
        [lo, hi] => [*lo, *hi],
        _ => default,
    }
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), String> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|e| e.to_string())?;
            log::info!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
            println!("{}", text);
            Ok(())
        }
    }
}

fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), String> {
    serde_json::to_writer(&mut *out, value).map_err(|e| e.to_string())?;
    writeln!(out).map_err(|e| e.to_string())
}
