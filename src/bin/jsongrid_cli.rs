//! CLI tool for jsongrid - prints the grid window a JSON path projects to
//!
//! Usage:
//!   jsongrid_cli data.json --path root.monsters
//!   jsongrid_cli data.json --path root.monsters --collapse stats --format json
//!   RUST_LOG=jsongrid=debug jsongrid_cli data.json --scroll 2000

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use jsongrid::{GridConfig, GridEngine, JsonDocument, Path, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Tab-separated rows with a header line
    Table,
    /// The full render frame as JSON
    Json,
}

/// Project a JSON document into a grid and print the visible window
#[derive(Parser, Debug)]
#[command(name = "jsongrid_cli", version, about)]
struct CliArgs {
    /// JSON document to load
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Path whose grid context is shown
    #[arg(short, long, default_value = "root")]
    path: String,

    /// Vertical scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Collapse a column or column group (relative key, repeatable)
    #[arg(long, value_name = "KEY")]
    collapse: Vec<String>,

    /// Expand a collapsed column (relative key, repeatable)
    #[arg(long, value_name = "KEY")]
    expand: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Grid configuration JSON (partial objects allowed)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> jsongrid::Result<String> {
    let config = match &args.config {
        Some(path) => GridConfig::from_json(&fs::read_to_string(path)?)?,
        None => GridConfig::default(),
    };
    let document = JsonDocument::from_json_str(&fs::read_to_string(&args.input)?)?;
    let mut engine = GridEngine::new(document, config);
    engine.set_selection(&args.path)?;

    for key in &args.collapse {
        if !engine.collapse_column(&Path::parse(key)?) {
            tracing::warn!(key = %key, "no collapsible column with this key");
        }
    }
    for key in &args.expand {
        if !engine.expand_column(&Path::parse(key)?) {
            tracing::warn!(key = %key, "no column with this key");
        }
    }

    engine.resize_viewport(args.height);
    engine.scroll_to(args.scroll);
    let frame = engine.render();

    match args.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&frame)?),
        OutputFormat::Table => Ok(format_table(&frame)),
    }
}

fn format_table(frame: &RenderFrame) -> String {
    let mut lines = Vec::with_capacity(frame.rows.len() + 2);
    let header: Vec<String> = std::iter::once("#".to_string())
        .chain(frame.columns.iter().map(|c| {
            if c.id.is_empty() {
                c.def.name.clone()
            } else {
                c.id.clone()
            }
        }))
        .collect();
    lines.push(header.join("\t"));

    for row in &frame.rows {
        let cells = row.cells.iter().map(|cell| truncate(&cell.text, 32));
        let line: Vec<String> = std::iter::once(row.index.to_string()).chain(cells).collect();
        lines.push(line.join("\t"));
    }

    lines.push(match &frame.window {
        Some(w) => format!(
            "-- rows {}..={} of {} at {}px (total {}px)",
            w.start, w.end, frame.shape.row_count, frame.scroll_offset, w.total_height
        ),
        None => "-- no rows".to_string(),
    });
    lines.join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\t', '\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut short: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
