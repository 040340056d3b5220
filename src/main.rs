use std::str::FromStr;

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, debug, info, warn};
use serde_json::json;

use crestview::config::load_config;
use crestview::export::{Exporter, HtmlExporter, SvgExporter};
use crestview::layout::{layout_request, load_layout};
use crestview::scene::{CellKind, Surface};
use crestview::session::{Environment, FrameMetrics, RenderSession};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render laid-out CREST diagrams", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a layout result to SVG or HTML
    Render {
        #[arg(value_name = "LAYOUT_JSON")]
        layout: Utf8PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Svg)]
        format: Format,

        /// Select cells by id before exporting (highlights their edges)
        #[arg(long = "select", value_name = "ID")]
        select: Vec<String>,

        /// Width of the hosting frame in pixels
        #[arg(long, default_value_t = 960.0)]
        width: f64,
    },
    /// Print a JSON summary of the materialized scene
    Inspect {
        #[arg(value_name = "LAYOUT_JSON")]
        layout: Utf8PathBuf,
    },
    /// Print the layout engine request for a declarative graph
    Request {
        #[arg(value_name = "GRAPH_JSON")]
        graph: Utf8PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Html,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
    debug!(cli:?; "Parsed arguments");

    let config = load_config(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Render {
            layout,
            output,
            format,
            select,
            width,
        } => {
            let root = load_layout(&layout).with_context(|| format!("Failed to read {layout}"))?;
            let env = Environment {
                frame: FrameMetrics {
                    frame_width: width,
                    ..FrameMetrics::default()
                },
                ..Environment::default()
            };
            let mut session = RenderSession::open(&root, &config, env)
                .with_context(|| format!("Failed to render {layout}"))?;

            let mut selected = Vec::new();
            for id in &select {
                match session.lookup(id) {
                    Some(h) => selected.push(h),
                    None => warn!(id = id.as_str(); "No cell with this id to select"),
                }
            }
            if !selected.is_empty() {
                session.select(&selected);
            }

            let doc = match format {
                Format::Svg => SvgExporter::new().render(&session),
                Format::Html => HtmlExporter::new().render(&session),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, doc).with_context(|| format!("Write {path}"))?;
                    info!(path = path.as_str(); "Diagram written");
                }
                None => println!("{doc}"),
            }
        }
        Command::Inspect { layout } => {
            let root = load_layout(&layout).with_context(|| format!("Failed to read {layout}"))?;
            let session = RenderSession::open(&root, &config, Environment::default())
                .with_context(|| format!("Failed to render {layout}"))?;
            let summary = inspect_summary(&session);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Request { graph } => {
            let text =
                std::fs::read_to_string(&graph).with_context(|| format!("Open {graph}"))?;
            let value: serde_json::Value =
                serde_json::from_str(&text).with_context(|| format!("Parse {graph}"))?;
            if !value.is_object() {
                bail!("{graph} does not contain a JSON object");
            }
            let request = layout_request(value, &config.layout)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
    }
    Ok(())
}

fn inspect_summary(session: &RenderSession) -> serde_json::Value {
    let scene = session.scene();
    let report = session.report();
    let bounds = scene.graph_bounds();
    let cells: Vec<_> = scene
        .cells()
        .map(|(h, cell)| {
            let kind = match cell.kind {
                CellKind::Layer => "layer",
                CellKind::Vertex => "vertex",
                CellKind::Edge { .. } => "edge",
                CellKind::Anchor => "anchor",
            };
            let mut entry = json!({
                "id": cell.id,
                "kind": kind,
                "style": cell.tag.map(|t| t.as_str()),
            });
            if cell.is_vertex() {
                let b = scene.absolute_bounds(h).unwrap_or_default();
                entry["bounds"] = json!([b.x, b.y, b.width, b.height]);
            }
            if cell.is_edge() {
                let endpoint = |c: Option<crestview::CellHandle>| {
                    c.and_then(|c| scene.cell(c)).map(|c| c.id.clone())
                };
                entry["source"] = json!(endpoint(cell.source()));
                entry["target"] = json!(endpoint(cell.target()));
                entry["points"] = json!(cell.points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>());
            }
            entry
        })
        .collect();
    json!({
        "vertices": report.vertices,
        "edges": report.edges,
        "anchors": report.anchors,
        "midpoints": report.midpoints,
        "skipped": report.skipped.iter().map(|s| json!({
            "edge": s.edge,
            "reason": s.reason.to_string(),
        })).collect::<Vec<_>>(),
        "bounds": [bounds.x, bounds.y, bounds.width, bounds.height],
        "cells": cells,
    })
}
