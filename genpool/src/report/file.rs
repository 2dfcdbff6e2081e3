use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use genpool_api::{
    Destination, PoolError, Report, ReportFormat, ReportSink, RunConfig, SinkError, StatusSnapshot,
};

#[derive(Serialize)]
struct FinalReportDocument<'a> {
    snapshot: &'a StatusSnapshot,
    summary: String,
    config: &'a RunConfig,
}

/// Writes the final report to a file, as JSON or as the statistics line.
///
/// The file is created when the sink is built so an unusable path fails the
/// run at startup. Status reports are ignored.
#[derive(Debug)]
pub struct ReportFileSink {
    path: PathBuf,
    format: ReportFormat,
    config: RunConfig,
    file: Mutex<File>,
}

impl ReportFileSink {
    pub fn create(path: &Path, format: ReportFormat, config: RunConfig) -> Result<Self, PoolError> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            config,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, report: &Report) -> Result<String, SinkError> {
        match self.format {
            ReportFormat::Text => Ok(format!("{}\n", report.snapshot.final_line())),
            ReportFormat::Json => {
                let document = FinalReportDocument {
                    snapshot: &report.snapshot,
                    summary: report.snapshot.final_line(),
                    config: &self.config,
                };
                Ok(serde_json::to_string_pretty(&document)? + "\n")
            }
        }
    }
}

impl ReportSink for ReportFileSink {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError> {
        if !report.is_final() || destination != Destination::Log {
            return Ok(());
        }

        let body = self.render(report)?;
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
