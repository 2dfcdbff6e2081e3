use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

use genpool_api::{Destination, Report, ReportKind, ReportSink, SinkError};

/// Renders reports on an interactive console.
///
/// Status reports rewrite the current line; the final report starts a new one.
pub struct ConsoleSink<W: Write + Send> {
    out: Mutex<W>,
    ansi: bool,
}

impl ConsoleSink<io::Stdout> {
    /// Console sink on stdout, coloured when stdout is a terminal.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), atty::is(atty::Stream::Stdout))
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out: Mutex::new(out),
            ansi,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, report: &Report) -> String {
        match report.kind {
            ReportKind::Status => {
                let prefix = "[STATUS]";
                if self.ansi {
                    format!("\r{} {}", prefix.cyan(), report)
                } else {
                    format!("\r{} {}", prefix, report)
                }
            }
            ReportKind::Final => format!("\n{}\n", report),
        }
    }
}

impl<W: Write + Send> fmt::Debug for ConsoleSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink").field("ansi", &self.ansi).finish()
    }
}

impl<W: Write + Send> ReportSink for ConsoleSink<W> {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError> {
        if destination != Destination::Console {
            return Ok(());
        }

        let line = self.render(report);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(line.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
