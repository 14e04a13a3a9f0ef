//! Tetratui — classic falling-block puzzle game in the terminal.

mod app;
mod game;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Options derived from the CLI that the game state needs (board size and
/// fall cadence). Dimensions are fixed once the state is constructed.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub fall_interval: Duration,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        width: args.width,
        height: args.height,
        fall_interval: Duration::from_millis(args.fall_interval_ms),
    };
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetratui",
    version,
    about = "Classic falling-block puzzle in the terminal. Stack the falling pieces; full rows clear.",
    long_about = "Tetratui is a terminal rendition of the classic falling-block puzzle.\n\n\
        Pieces spawn at the top of the board and fall on a fixed cadence. Move and rotate \
        them so that rows fill completely; full rows disappear and the stack above slides down.\n\n\
        CONTROLS (normal):\n  Left/Right  Move    Up  Rotate    Down  Soft drop    Q / Esc  Quit\n\n\
        CONTROLS (vim):\n  h/l  Move    k  Rotate    j  Soft drop    q  Quit\n\n\
        Use --theme to load a btop-style theme file with piece_* colour overrides."
)]
pub struct Args {
    /// Playfield width in columns (grid cells).
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: u16,

    /// Playfield height in rows (grid cells).
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// Milliseconds between automatic downward steps.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub fall_interval_ms: u64,

    /// Path to theme file (btop-style theme[key]="value"). Uses the classic palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
