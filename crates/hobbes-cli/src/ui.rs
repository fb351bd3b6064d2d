//! Terminal output: status lines, tables, and the progress reporter the
//! core pipeline calls back into.

use std::io::Write;
use std::sync::Mutex;

use comfy_table::{presets::NOTHING, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use hobbes_core::Reporter;

/// Print a success line.
pub fn success(message: &str) {
    println!("{} {}", "ok".green().bold(), message);
}

/// Print a warning line to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// A borderless table in the house style.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h.to_uppercase())));
    table
}

/// Human-readable byte count.
pub fn fmt_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Reporter that narrates pipeline progress on the terminal.
///
/// Progress state is behind a mutex because the core trait takes `&self`
/// from async context.
#[derive(Debug)]
pub struct ConsoleReporter {
    quiet: bool,
    progress: Mutex<ProgressState>,
}

#[derive(Debug, Default)]
struct ProgressState {
    received: u64,
    total: Option<u64>,
    last_percent: u64,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            progress: Mutex::new(ProgressState::default()),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn downloading(&self, name: &str, total: Option<u64>) {
        if let Ok(mut state) = self.progress.lock() {
            *state = ProgressState {
                received: 0,
                total,
                last_percent: 0,
            };
        }
        if !self.quiet {
            match total {
                Some(bytes) => println!("  downloading {name} ({})", fmt_size(bytes)),
                None => println!("  downloading {name}"),
            }
        }
    }

    fn download_progress(&self, received: u64) {
        if self.quiet {
            return;
        }
        let Ok(mut state) = self.progress.lock() else {
            return;
        };
        state.received += received;
        let Some(total) = state.total.filter(|t| *t > 0) else {
            return;
        };
        let percent = state.received * 100 / total;
        // Redraw at 10% steps to keep non-tty output readable
        if percent >= state.last_percent + 10 {
            state.last_percent = percent - percent % 10;
            print!("\r  {percent:>3}%");
            let _ = std::io::stdout().flush();
            if percent >= 100 {
                println!();
            }
        }
    }

    fn verifying(&self, name: &str) {
        if !self.quiet {
            println!("  verifying {name}");
        }
    }

    fn extracting(&self, name: &str) {
        if !self.quiet {
            println!("  extracting {name}");
        }
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            println!("  {message}");
        }
    }

    fn warning(&self, message: &str) {
        warning(message);
    }
}
