use genpool_api::{Destination, Report, ReportSink, SinkError};

/// Offers every report to each inner sink in order.
///
/// All sinks are tried even if one fails; the first error is returned.
#[derive(Debug, Default)]
pub struct CompositeSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl CompositeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for CompositeSink {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(report, destination) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
