use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stream_grid::{
    config::Config,
    console::{self, Command, DemoSource, Outcome},
    demo,
    engine::gst::{GstEngineFactory, SinkConfig},
    gst_utils, GridManager, Layout,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "stream-grid.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Grid layout as ROWSxCOLUMNS, overriding the configuration
    #[arg(short, long)]
    layout: Option<Layout>,

    /// Source for the next tile, in row-major order (repeatable)
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// Load the demo files into every tile on startup
    #[arg(long)]
    demo: bool,

    /// Check available GStreamer plugins and exit
    #[arg(long)]
    check_plugins: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load_or_default(&args.config).await?;

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.app.log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting {} v{}", config.app.name, env!("CARGO_PKG_VERSION"));

    if args.check_plugins {
        let capabilities = gst_utils::initialize()?;
        gst_utils::print_plugin_info(&capabilities);
        return Ok(());
    }

    let layout = match args.layout {
        Some(layout) => layout,
        None => config.layout()?,
    };

    let factory = Arc::new(GstEngineFactory::new(SinkConfig {
        video_sink: config.playback.video_sink.clone(),
        audio_sink: config.playback.audio_sink.clone(),
    }));
    let mut grid = GridManager::new(factory, config.playback.options(), layout)?;

    let demo_source = DemoSource {
        directory: config.demo.directory(),
        files: config.demo.files.clone(),
    };

    if args.demo {
        demo::load_demo(&mut grid, &demo_source.directory, &demo_source.files);
    } else if !args.sources.is_empty() {
        if args.sources.len() > grid.len() {
            warn!(
                "{} sources given for {} tiles, ignoring the rest",
                args.sources.len(),
                grid.len()
            );
        }
        for (tile, source) in grid.tiles_mut().iter_mut().zip(&args.sources) {
            tile.set_source(source.as_str());
            tile.connect();
        }
    }

    println!("{}", console::HELP);
    println!("{}", console::status_report(&grid));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(notification) = grid.next_notification() => {
                let tile = notification.tile;
                if grid.dispatch(notification) {
                    if let Some(tile) = grid.tiles().iter().find(|t| t.id() == tile) {
                        info!("Tile {} is now {}", tile.id(), tile.status());
                    }
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Input closed");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read command: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let outcome = line
                    .parse::<Command>()
                    .and_then(|command| console::execute(&mut grid, command, &demo_source));
                match outcome {
                    Ok(Outcome::Continue(Some(output))) => println!("{}", output),
                    Ok(Outcome::Continue(None)) => {}
                    Ok(Outcome::Quit) => break,
                    Err(e) => println!("error: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    grid.shutdown();
    info!("Stream grid stopped");

    Ok(())
}
