// Integration tests for the report sinks

use std::path::PathBuf;

use genpool::report::{CompositeSink, ConsoleSink, ReportFileSink};
use genpool_api::{
    Destination, Report, ReportFormat, ReportSink, RunConfig, SinkError, StatusSnapshot,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("genpool-{}-{}", uuid::Uuid::new_v4(), name))
}

fn final_report() -> Report {
    Report::final_report(StatusSnapshot::from_parts(12.5, 5000, 3, 0))
}

#[derive(Debug)]
struct FailingSink;

impl ReportSink for FailingSink {
    fn emit(&self, _report: &Report, _destination: Destination) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

#[test]
fn test_file_sink_writes_json_final_report() -> anyhow::Result<()> {
    let path = temp_path("report.json");
    let config = RunConfig::default().with_workers(2);
    let sink = ReportFileSink::create(&path, ReportFormat::Json, config)?;

    sink.emit(&final_report(), Destination::Log)?;

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(value["snapshot"]["generated"], 5000);
    assert_eq!(value["snapshot"]["found"], 3);
    assert_eq!(value["config"]["workers"], 2);
    assert!(value["summary"].as_str().unwrap().starts_with("Final: Gen: 5000"));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_file_sink_writes_text_final_report() -> anyhow::Result<()> {
    let path = temp_path("report.txt");
    let sink = ReportFileSink::create(&path, ReportFormat::Text, RunConfig::default())?;

    sink.emit(&final_report(), Destination::Log)?;
    // The console copy of the same report must not be written twice.
    sink.emit(&final_report(), Destination::Console)?;

    let contents = std::fs::read_to_string(&path)?;
    assert_eq!(contents, "Final: Gen: 5000 | Found: 3 | Time: 12.50s\n");

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_file_sink_ignores_status_reports() -> anyhow::Result<()> {
    let path = temp_path("status.json");
    let sink = ReportFileSink::create(&path, ReportFormat::Json, RunConfig::default())?;

    let status = Report::status(StatusSnapshot::from_parts(1.0, 10, 0, 1));
    sink.emit(&status, Destination::Log)?;
    assert!(std::fs::read_to_string(&path)?.is_empty());

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_file_sink_unwritable_path() {
    let path = temp_path("missing-dir").join("report.json");
    let result = ReportFileSink::create(&path, ReportFormat::Json, RunConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_composite_reaches_all_sinks_despite_failure() {
    let sink = CompositeSink::new()
        .with(FailingSink)
        .with(ConsoleSink::new(Vec::new(), false));
    assert_eq!(sink.len(), 2);

    let result = sink.emit(&final_report(), Destination::Console);
    assert!(matches!(result, Err(SinkError::Closed)));
}

#[test]
fn test_empty_composite_is_ok() {
    let sink = CompositeSink::new();
    assert!(sink.is_empty());
    assert!(sink.emit(&final_report(), Destination::Log).is_ok());
}
