use crate::config::load_config;
use crate::geometry::{Point, Rect};
use crate::layout_dump::write_layout_dump;
use crate::parser::{LoadReport, load_pois_csv, load_pois_json};
use crate::projection::ViewState;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::{OverlayOptions, layout_overlay};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "poilay", version, about = "Declutter POI icons, labels and popups over a zoomable image")]
pub struct Args {
    /// POI rows (JSON array of objects, or CSV with a header row), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Row format. Defaults to csv for `.csv` inputs and json otherwise.
    #[arg(long = "inputFormat", value_enum)]
    pub input_format: Option<InputFormat>,

    /// View state JSON ({"zoom", "pan", "viewport"}); overrides the flags below
    #[arg(short = 'v', long = "view")]
    pub view: Option<PathBuf>,

    /// Zoom factor (screen px per image px)
    #[arg(long = "zoom", default_value_t = 1.0)]
    pub zoom: f32,

    /// Horizontal pan in screen px
    #[arg(long = "pan-x", default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_x: f32,

    /// Vertical pan in screen px
    #[arg(long = "pan-y", default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_y: f32,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Open the popup of this POI id
    #[arg(long = "open")]
    pub open: Option<String>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file. Defaults to stdout for JSON and SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let format = input_format(args.input_format, args.input.as_deref());
    let report = load_rows(&input, format).context("failed to read POI rows")?;
    if !report.dropped.is_empty() {
        warn!(dropped = report.dropped.len(), "some rows had no usable position");
    }
    info!(pois = report.pois.len(), "rows loaded");

    let view = match args.view.as_deref() {
        Some(path) => read_view(path)?,
        None => ViewState::new(
            args.zoom,
            Point::new(args.pan_x, args.pan_y),
            Rect::new(0.0, 0.0, config.render.width, config.render.height),
        ),
    };

    let options = OverlayOptions {
        config,
        open: args.open.clone(),
    };
    let dump = layout_overlay(report.pois, &view, &options);
    if let Some(id) = options.open.as_deref()
        && dump.open_popup.as_deref() != Some(id)
    {
        warn!(id, "requested popup is not open");
    }

    match args.output_format {
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &dump)?,
            None => println!("{}", serde_json::to_string_pretty(&dump)?),
        },
        OutputFormat::Svg => {
            let svg = render_svg(&dump, &options.config.theme);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&dump, &options.config.theme);
            write_output_png(&svg, &output, &options.config.render, &options.config.theme)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn input_format(flag: Option<InputFormat>, path: Option<&Path>) -> InputFormat {
    if let Some(format) = flag {
        return format;
    }
    let is_csv = path
        .and_then(Path::extension)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv { InputFormat::Csv } else { InputFormat::Json }
}

fn load_rows(input: &str, format: InputFormat) -> crate::Result<LoadReport> {
    match format {
        InputFormat::Json => load_pois_json(input),
        InputFormat::Csv => load_pois_csv(input),
    }
}

fn read_view(path: &Path) -> Result<ViewState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_view(&raw)
}

fn parse_view(raw: &str) -> Result<ViewState> {
    let view: ViewState = json5::from_str(raw).context("invalid view state")?;
    Ok(view)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
