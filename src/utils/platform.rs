use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;

/// Snapshot of the terminal environment the visualizer will run in.
///
/// `stdin_is_tty` decides the startup notice (a tty means nothing is piped
/// in); `stderr_is_tty` decides whether there is anywhere to draw at all.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os_name: String,
    pub arch: String,
    pub terminal: String,
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub supports_ansi: bool,
    pub supports_truecolor: bool,
}

impl PlatformInfo {
    pub fn detect() -> Result<Self> {
        let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));

        Ok(Self {
            os_name: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
            terminal: Self::detect_terminal(),
            terminal_width: width,
            terminal_height: height,
            stdin_is_tty: std::io::stdin().is_terminal(),
            stdout_is_tty: std::io::stdout().is_terminal(),
            stderr_is_tty: std::io::stderr().is_terminal(),
            supports_ansi: true, // Most modern terminals support ANSI
            supports_truecolor: Self::detect_truecolor(),
        })
    }

    fn detect_terminal() -> String {
        if let Ok(term) = env::var("TERM_PROGRAM") {
            return term;
        }
        if let Ok(term) = env::var("TERM") {
            return term;
        }
        "Unknown".to_string()
    }

    fn detect_truecolor() -> bool {
        env::var("COLORTERM")
            .map(|v| v.contains("truecolor") || v.contains("24bit"))
            .unwrap_or(false)
    }
}
