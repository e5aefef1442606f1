mod core;
mod input;
mod renderer;
mod shared;
mod sync;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::core::pipeline::{self, PipelineOptions};
use crate::shared::constants;

#[derive(Parser)]
#[command(author, version, about = "Visualize piped text as a scrolling strip of colored columns", long_about = None)]
struct Cli {
    /// Frames per second for the column strip
    #[arg(short, long, default_value_t = constants::DEFAULT_FPS)]
    fps: u32,

    /// Width of one column in terminal cells
    #[arg(short, long, default_value_t = constants::DEFAULT_COLUMN_WIDTH)]
    column_width: u16,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect platform info
    Detect,
    /// Query the terminal size as crossterm sees it
    TerminalSize,
}

fn main() -> Result<()> {
    crate::utils::logger::init();

    // Reset terminal state in case a previous run crashed mid-frame
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = crossterm::execute!(
        std::io::stderr(),
        crossterm::terminal::LeaveAlternateScreen
    );

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Detect) => {
            let info = crate::utils::platform::PlatformInfo::detect()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Some(Commands::TerminalSize) => {
            let (cols, rows) = crossterm::terminal::size()?;
            println!("{}x{}", cols, rows);
        }
        None => {
            let opts = PipelineOptions {
                fps: cli.fps,
                column_width: cli.column_width,
            };
            if let Err(e) = pipeline::run(&opts) {
                crate::utils::logger::error(&format!("{:#}", e));
                return Err(e);
            }
        }
    }

    Ok(())
}
