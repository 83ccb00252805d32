//! Terminal plumbing shared by the interactive commands.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use trainclock_core::Event;

/// Line-oriented commands from stdin.
pub struct Input {
    lines: Lines<BufReader<Stdin>>,
    open: bool,
}

impl Input {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            open: true,
        }
    }

    /// Next non-empty command. Never resolves once stdin is closed, so the
    /// caller's tick branch keeps running on its own.
    pub async fn next(&mut self) -> String {
        loop {
            if !self.open {
                std::future::pending::<()>().await;
            }
            match self.lines.next_line().await {
                Ok(Some(line)) if !line.trim().is_empty() => return line.trim().to_string(),
                Ok(Some(_)) => {}
                Ok(None) => self.open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin closed");
                    self.open = false;
                }
            }
        }
    }
}

/// Rewrite the current terminal line.
pub fn status_line(text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "\r{text}\x1b[K");
    let _ = out.flush();
}

/// Finish the status line before printing regular output.
pub fn end_status_line() {
    println!();
}

pub fn print_json_line(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
