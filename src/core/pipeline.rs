use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::color::Rgb;
use crate::core::history::ColumnHistory;
use crate::input::LineReader;
use crate::renderer::DisplayManager;
use crate::shared::constants;
use crate::sync::FramePacer;
use crate::utils::logger;

pub struct PipelineOptions {
    pub fps: u32,
    pub column_width: u16,
}

/// Run the visualizer until end of input or a quit signal.
///
/// One iteration is strictly sequential: drain key events, block on the next
/// line, map it to a color, append, redraw the strip, then pace. The ctrlc
/// handler only flips a flag that is checked between iterations, so nothing
/// ever runs concurrently with a history mutation.
pub fn run(opts: &PipelineOptions) -> Result<()> {
    if io::stdin().is_terminal() {
        eprintln!("stdin is a terminal");
    } else {
        eprintln!("stdin is a file or a pipe");
    }

    let mut display =
        DisplayManager::new(opts.column_width).context("failed to initialize the display")?;
    let mut history = ColumnHistory::new(display.columns());
    let mut pacer = FramePacer::new(opts.fps);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to install the interrupt handler")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = LineReader::new(stdin.lock(), stdout.lock(), constants::LINE_MAX);

    logger::info(&format!(
        "pipeline started: {} columns at {} fps",
        history.capacity(),
        pacer.stats().target_fps
    ));
    let start_time = Instant::now();

    // Paint the empty history once so the strip shows up before input does
    display.render(history.iter_newest_first())?;

    while running.load(Ordering::SeqCst) {
        if quit_requested()? {
            logger::info("quit requested");
            break;
        }

        match reader.next_line().context("failed to read input")? {
            Some(line) => {
                let color = Rgb::from_line(line);
                let was_full = history.is_full();
                history.push(color);
                if history.is_full() && !was_full {
                    logger::debug("history wrapped, oldest colors are evicted from here on");
                }
                display.render(history.iter_newest_first())?;
            }
            None => {
                logger::info("end of input");
                break;
            }
        }

        pacer.wait_for_next_frame();
    }

    let stats = pacer.stats();
    logger::info(&format!(
        "pipeline finished: {} frames rendered, {:.1} effective fps",
        stats.frames_rendered,
        stats.effective_fps(start_time.elapsed())
    ));

    Ok(())
}

/// Drain pending key events; `q`, `Esc` and `Ctrl-C` end the run.
///
/// In raw mode Ctrl-C arrives as a key event on the tty, not as SIGINT, so
/// it has to be handled here as well.
fn quit_requested() -> Result<bool> {
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(true)
                }
                _ => {}
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The ingest half of the loop, driven end to end without a terminal:
    // read -> map -> append, then check the rendering order.
    #[test]
    fn test_ingest_orders_history_newest_first() {
        let input = b"aaa\nbbb\nccc\n";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, constants::LINE_MAX);
        let mut history = ColumnHistory::new(64);

        while let Some(line) = reader.next_line().unwrap() {
            history.push(Rgb::from_line(line));
        }

        let entries: Vec<Rgb> = history.iter_newest_first().collect();
        assert_eq!(entries.len(), 64);
        assert_eq!(entries[0], Rgb::from_line(b"ccc"));
        assert_eq!(entries[1], Rgb::from_line(b"bbb"));
        assert_eq!(entries[2], Rgb::from_line(b"aaa"));
        assert!(entries[3..].iter().all(|&c| c == Rgb::BLACK));
        assert!(!history.is_full());

        assert_eq!(echo, input);
    }

    #[test]
    fn test_ingest_caps_checksum_input_at_line_max() {
        let long = vec![b'x'; constants::LINE_MAX * 2];
        let mut input = long.clone();
        input.push(b'\n');

        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, constants::LINE_MAX);
        let mut history = ColumnHistory::new(4);

        while let Some(line) = reader.next_line().unwrap() {
            assert_eq!(line.len(), constants::LINE_MAX);
            history.push(Rgb::from_line(line));
        }

        // one line, one color, full echo
        let entries: Vec<Rgb> = history.iter_newest_first().collect();
        assert_eq!(entries[0], Rgb::from_line(&long[..constants::LINE_MAX]));
        assert_eq!(echo, input);
    }
}
