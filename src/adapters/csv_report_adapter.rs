//! CSV export of the backtest table.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::ports::report_port::ReportPort;
use std::io;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Writes header and rows to any writer.
    pub fn write_to<W: io::Write>(&self, result: &BacktestResult, writer: W) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(result.column_names()).map_err(csv_error)?;
        for row in result.rows() {
            wtr.write_record(&row).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> BacktestError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => BacktestError::Io(io),
        other => BacktestError::Io(io::Error::other(format!("{:?}", other))),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError> {
        let file = std::fs::File::create(output_path)?;
        self.write_to(result, io::BufWriter::new(file))?;
        info!(
            path = %output_path.display(),
            rows = result.len(),
            "wrote backtest table"
        );
        Ok(())
    }
}
