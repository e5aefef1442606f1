use anyhow::{bail, Context, Result};
use crossterm::{
    cursor,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
    ExecutableCommand,
};
use std::io::{self, BufWriter, IsTerminal, Stderr, Write};

use crate::core::color::Rgb;
use crate::shared::constants;

/// Terminal renderer for the column strip.
///
/// Draws on stderr so stdout stays a byte-clean pass-through for the echoed
/// input. The column count is fixed from the terminal width at construction
/// and never changes afterwards; resize events are ignored.
pub struct DisplayManager {
    stderr: BufWriter<Stderr>,
    columns: usize,
    column_width: u16,
    rows: u16,
    last_columns: Option<Vec<Rgb>>,
    render_buffer: Vec<u8>,
}

impl DisplayManager {
    pub fn new(column_width: u16) -> Result<Self> {
        if !io::stderr().is_terminal() {
            bail!("stderr is not a terminal, nowhere to draw the column strip");
        }

        let column_width = column_width.max(1);
        let (term_cols, term_rows) = terminal::size().context("failed to query terminal size")?;
        let columns = (term_cols / column_width).max(1) as usize;

        let stderr = BufWriter::with_capacity(256 * 1024, io::stderr());
        let mut dm = Self {
            stderr,
            columns,
            column_width,
            rows: term_rows.max(1),
            last_columns: None,
            render_buffer: Vec::with_capacity(256 * 1024),
        };

        dm.initialize_terminal()
            .context("failed to take over the terminal")?;

        Ok(dm)
    }

    fn initialize_terminal(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stderr.execute(EnterAlternateScreen)?;
        self.stderr.execute(cursor::Hide)?;
        self.stderr.execute(SetTitle(constants::APP_NAME))?;

        // Disable line wrapping so the rightmost column cannot scroll the screen
        self.stderr.execute(Print("\x1b[?7l"))?;

        // Synchronized updates (DECSM 2026): the terminal holds partial frames
        self.stderr.execute(Print("\x1b[?2026h"))?;

        Ok(())
    }

    /// Number of columns the strip can show; the history is sized to match.
    pub fn columns(&self) -> usize {
        self.columns
    }

    // Zero-allocation decimal writers for escape sequence parameters.
    #[inline(always)]
    fn write_u8_fast(buffer: &mut Vec<u8>, mut n: u8) {
        if n >= 100 {
            buffer.push(b'0' + n / 100);
            n %= 100;
            buffer.push(b'0' + n / 10);
            buffer.push(b'0' + n % 10);
        } else if n >= 10 {
            buffer.push(b'0' + n / 10);
            buffer.push(b'0' + n % 10);
        } else {
            buffer.push(b'0' + n);
        }
    }

    #[inline(always)]
    fn write_u16_fast(buffer: &mut Vec<u8>, n: u16) {
        let mut digits = [0u8; 5];
        let mut len = 0;
        let mut n = n;
        loop {
            digits[len] = b'0' + (n % 10) as u8;
            n /= 10;
            len += 1;
            if n == 0 {
                break;
            }
        }
        while len > 0 {
            len -= 1;
            buffer.push(digits[len]);
        }
    }

    /// Paint one column per color, newest first from the left edge.
    ///
    /// Only columns that changed since the previous frame are repainted; the
    /// first frame clears the screen and redraws everything. The whole frame
    /// is composed into one buffer, bracketed by synchronized-update marks,
    /// and flushed in a single write.
    pub fn render<I>(&mut self, colors: I) -> Result<()>
    where
        I: IntoIterator<Item = Rgb>,
    {
        self.render_buffer.clear();
        let buffer = &mut self.render_buffer;

        buffer.extend_from_slice(b"\x1b[?2026h");

        let mut force_redraw = false;
        if self.last_columns.is_none() {
            buffer.extend_from_slice(b"\x1b[2J");
            self.last_columns = Some(vec![Rgb::BLACK; self.columns]);
            force_redraw = true;
        }
        let last_columns = match &mut self.last_columns {
            Some(v) => v,
            None => return Ok(()),
        };

        let mut last_bg: Option<Rgb> = None;

        for (index, color) in colors.into_iter().take(self.columns).enumerate() {
            if !force_redraw && last_columns[index] == color {
                continue;
            }

            if last_bg != Some(color) {
                buffer.extend_from_slice(b"\x1b[48;2;");
                Self::write_u8_fast(buffer, color.red);
                buffer.push(b';');
                Self::write_u8_fast(buffer, color.green);
                buffer.push(b';');
                Self::write_u8_fast(buffer, color.blue);
                buffer.push(b'm');
                last_bg = Some(color);
            }

            let left = index as u16 * self.column_width;
            for row in 0..self.rows {
                buffer.extend_from_slice(b"\x1b[");
                Self::write_u16_fast(buffer, row + 1);
                buffer.push(b';');
                Self::write_u16_fast(buffer, left + 1);
                buffer.push(b'H');
                for _ in 0..self.column_width {
                    buffer.push(b' ');
                }
            }

            last_columns[index] = color;
        }

        buffer.extend_from_slice(b"\x1b[0m\x1b[?2026l");

        self.stderr.write_all(buffer)?;
        self.stderr.flush()?;

        Ok(())
    }
}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        let _ = self.stderr.execute(Print("\x1b[?2026l"));
        let _ = self.stderr.execute(Print("\x1b[?7h"));
        let _ = self.stderr.execute(cursor::Show);
        let _ = self.stderr.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
