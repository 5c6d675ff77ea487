//! Line-oriented host commands, the console stand-in for the grid's buttons.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::demo;
use crate::grid::{GridManager, Layout, LayoutError};

pub const HELP: &str = "\
commands:
  layout [RxC]        rebuild the grid (e.g. layout 3x3), or switch
                      between the 2x2 and 3x3 presets
  source N TEXT       set the URL or file path of tile N
  connect N|all       connect tile N, or every tile
  pause N             pause or resume tile N
  stop N|all          stop tile N, or every tile
  demo                load the demo files into every tile
  status              print the status of every tile
  help                show this text
  quit                dispose all tiles and exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Tile(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Layout(Layout),
    NextPreset,
    Source(usize, String),
    Connect(Target),
    TogglePause(usize),
    Stop(Target),
    Demo,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command {0:?}, try 'help'")]
    Unknown(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("Invalid tile index {0:?}")]
    InvalidIndex(String),

    #[error("No tile {index} in a grid of {len}")]
    NoSuchTile { index: usize, len: usize },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

fn parse_index(arg: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    let arg = arg.ok_or(CommandError::MissingArgument(command))?;
    arg.parse()
        .map_err(|_| CommandError::InvalidIndex(arg.to_string()))
}

fn parse_target(arg: Option<&str>, command: &'static str) -> Result<Target, CommandError> {
    match arg {
        Some(a) if a.eq_ignore_ascii_case("all") => Ok(Target::All),
        other => parse_index(other, command).map(Target::Tile),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "layout" | "grid" => match args.next() {
                Some(layout) => Ok(Command::Layout(layout.parse()?)),
                None => Ok(Command::NextPreset),
            },
            "source" | "url" => {
                let index = parse_index(args.next(), "source")?;
                // Everything after the index, spaces included, is the source.
                let text = rest
                    .split_once(char::is_whitespace)
                    .map(|(_, text)| text.trim().to_string())
                    .unwrap_or_default();
                Ok(Command::Source(index, text))
            }
            "connect" | "play" => Ok(Command::Connect(parse_target(args.next(), "connect")?)),
            "pause" | "resume" => Ok(Command::TogglePause(parse_index(args.next(), "pause")?)),
            "stop" => Ok(Command::Stop(parse_target(args.next(), "stop")?)),
            "demo" => Ok(Command::Demo),
            "status" | "ls" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Where the demo command takes its files from.
#[derive(Debug, Clone)]
pub struct DemoSource {
    pub directory: PathBuf,
    pub files: Vec<String>,
}

/// Outcome of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Option<String>),
    Quit,
}

pub fn execute(
    grid: &mut GridManager,
    command: Command,
    demo_source: &DemoSource,
) -> Result<Outcome, CommandError> {
    let len = grid.len();
    let no_such_tile = |index| CommandError::NoSuchTile { index, len };

    match command {
        Command::NextPreset => {
            let layout = grid.layout().next_preset();
            execute(grid, Command::Layout(layout), demo_source)
        }
        Command::Layout(layout) => {
            grid.set_layout(layout);
            Ok(Outcome::Continue(Some(format!(
                "grid {} with {} tiles",
                layout,
                grid.len()
            ))))
        }
        Command::Source(index, text) => {
            grid.tile_mut(index)
                .ok_or_else(|| no_such_tile(index))?
                .set_source(text);
            Ok(Outcome::Continue(None))
        }
        Command::Connect(Target::All) => {
            grid.connect_all();
            Ok(Outcome::Continue(None))
        }
        Command::Connect(Target::Tile(index)) => {
            grid.tile_mut(index).ok_or_else(|| no_such_tile(index))?.connect();
            Ok(Outcome::Continue(None))
        }
        Command::TogglePause(index) => {
            let tile = grid.tile_mut(index).ok_or_else(|| no_such_tile(index))?;
            tile.toggle_pause();
            Ok(Outcome::Continue(Some(format!(
                "[{}] control: {}",
                index,
                tile.pause_label().as_str()
            ))))
        }
        Command::Stop(Target::All) => {
            grid.stop_all();
            Ok(Outcome::Continue(None))
        }
        Command::Stop(Target::Tile(index)) => {
            grid.tile_mut(index).ok_or_else(|| no_such_tile(index))?.stop_hard();
            Ok(Outcome::Continue(None))
        }
        Command::Demo => {
            demo::load_demo(grid, &demo_source.directory, &demo_source.files);
            Ok(Outcome::Continue(None))
        }
        Command::Status => Ok(Outcome::Continue(Some(status_report(grid)))),
        Command::Help => Ok(Outcome::Continue(Some(HELP.to_string()))),
        Command::Quit => Ok(Outcome::Quit),
    }
}

/// One line per tile: index, grid position, caption and border color.
pub fn status_report(grid: &GridManager) -> String {
    let layout = grid.layout();
    grid.tiles()
        .iter()
        .enumerate()
        .map(|(index, tile)| {
            let (row, column) = layout.position(index).unwrap_or_default();
            let source = if tile.source().is_empty() {
                "-"
            } else {
                tile.source()
            };
            format!("[{index}] r{row}c{column} {} {}", tile.status(), source)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
