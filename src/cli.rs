use crate::config::load_config;
use crate::normalize::ChartEntry;
use crate::render::{ChartSeries, write_output_png, write_output};
use crate::session::{EditorSession, PointerEvent};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "allot", version, about = "Budget allocation pie: normalize weights, replay drags, render")]
pub struct Args {
    /// Weight payload (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, editor geometry)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Recorded pointer events to replay through the drag controller
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Rebalance to 100% after replaying events
    #[arg(long = "auto-fill")]
    pub auto_fill: bool,

    /// PNG raster width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// PNG raster height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Json,
    Png,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    chart: ChartSeries,
    entries: &'a [ChartEntry],
    total: u32,
    balanced: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let mut session = EditorSession::from_payload(&input, config)?;

    if let Some(path) = args.events.as_deref() {
        let events = read_events(path)?;
        let transfers = session.replay(&events);
        info!(events = events.len(), transfers, "replayed pointer events");
    }
    if args.auto_fill && session.auto_fill() {
        info!("auto-filled allocation to 100%");
    }
    let status = session.store().status();
    if !status.balanced {
        warn!(total = status.total, "allocation does not sum to 100%");
    }

    match args.output_format {
        OutputFormat::Svg => {
            write_output(&session.render_svg(), args.output.as_deref())?;
        }
        OutputFormat::Json => {
            let entries = session.chart_entries();
            let report = Report {
                chart: ChartSeries::from_entries(&entries),
                entries: &entries,
                total: status.total,
                balanced: status.balanced,
            };
            let json = serde_json::to_string_pretty(&report)?;
            write_output(&json, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&session.render_svg(), &output, &session.config().render)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading weight payload {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_events(path: &Path) -> Result<Vec<PointerEvent>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading pointer events {}", path.display()))?;
    parse_events(&contents)
}

fn parse_events(contents: &str) -> Result<Vec<PointerEvent>> {
    match serde_json::from_str(contents) {
        Ok(events) => Ok(events),
        Err(err) => json5::from_str(contents).map_err(|_| err.into()),
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "allot",
            "-i",
            "weights.json",
            "-e",
            "json",
            "--auto-fill",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("weights.json")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.auto_fill);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("out.png")), "png").unwrap(),
            PathBuf::from("out.png")
        );
    }

    #[test]
    fn events_accept_json5() {
        let events = parse_events("[{type: 'down', x: 1, y: 2}, {type: 'up'}]").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], PointerEvent::up());
    }

    #[test]
    fn report_flattens_chart_series() {
        let entries = vec![ChartEntry {
            label: "Bills".to_string(),
            value: 100.0,
        }];
        let report = Report {
            chart: ChartSeries::from_entries(&entries),
            entries: &entries,
            total: 100,
            balanced: true,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["labels"][0], "Bills");
        assert_eq!(json["entries"][0]["value"], 100.0);
        assert_eq!(json["balanced"], true);
    }
}
