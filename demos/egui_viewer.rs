//! Browse a laid-out CREST diagram using egui (requires `--features egui`).
//!
//! Usage:
//!   cargo run --features egui --example egui_viewer -- <layout.json> [-c crestview.toml]

#[cfg(feature = "egui")]
use anyhow::{Context, Result};
#[cfg(feature = "egui")]
use camino::Utf8PathBuf;
#[cfg(feature = "egui")]
use clap::Parser;
#[cfg(feature = "egui")]
use crestview::{config::load_config, egui_app::ViewerApp, layout::load_layout};

#[cfg(feature = "egui")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Browse a laid-out CREST diagram using egui", long_about = None)]
struct Args {
    /// Layout result (JSON) produced by the layout engine
    #[arg(value_name = "LAYOUT_JSON")]
    file: Utf8PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,
}

#[cfg(feature = "egui")]
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref()).context("Failed to load configuration")?;
    let layout =
        load_layout(&args.file).with_context(|| format!("Failed to read {}", args.file))?;
    let app = ViewerApp::from_layout(&layout, &config)
        .with_context(|| format!("Failed to render {}", args.file))?;

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "crestview diagram viewer",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

#[cfg(not(feature = "egui"))]
fn main() {
    eprintln!(
        "This example requires the 'egui' feature. Try: cargo run --features egui --example egui_viewer -- <layout.json>"
    );
}
