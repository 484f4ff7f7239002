use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bubblecase::cache::CellCache;
use bubblecase::config::KeyboardDefinition;
use bubblecase::export::{Exporter, SummaryExporter};
use bubblecase::keyboard::Keyboard;

/// Build the front and back shells of a bubble key keyboard case.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Keyboard definition to load and generate.
    #[arg(long, default_value = "keyboards/keyboard-right-def.json5")]
    keyboard_def: PathBuf,

    /// Override the probe grid resolution of the definition.
    #[arg(long)]
    resolution: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let definition = KeyboardDefinition::load(&args.keyboard_def)
        .with_context(|| format!("loading {}", args.keyboard_def.display()))?;

    let mut cache = CellCache::new(definition.parameters.clone());
    let keyboard = Keyboard::new(&definition.placements, &mut cache)?;
    let shell = keyboard.shell(definition.composition);

    let mut settings = definition.export;
    if let Some(resolution) = args.resolution {
        settings.resolution = resolution;
    }
    SummaryExporter::new(settings).export(&shell)?;
    Ok(())
}
