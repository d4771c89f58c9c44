use std::path::{Path, PathBuf};

use tracing::info;
use wirebench_model::{PayloadSizeClass, RunSummary};

use crate::ClientError;

/// Receives each finished run exactly once.
pub trait ResultSink {
    fn write(&self, summary: &RunSummary) -> Result<(), ClientError>;
}

/// Writes `<dir>/<size>_Results.csv`.
///
/// Layout: header `JsonRes,XmlRes,TotalTime`, then `NaN,NaN,<total ms>`, then one
/// `<json µs>,<xml µs>,NaN` row per sample in sample order. Failed legs are written as `NaN`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

const HEADER: [&str; 3] = ["JsonRes", "XmlRes", "TotalTime"];
const NAN: &str = "NaN";

impl CsvSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, size: &PayloadSizeClass) -> PathBuf {
        self.dir.join(format!("{size}_Results.csv"))
    }
}

impl ResultSink for CsvSink {
    fn write(&self, summary: &RunSummary) -> Result<(), ClientError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ClientError::Output {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(&summary.size);
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&path)?;

        wtr.write_record(HEADER)?;
        wtr.write_record([NAN.to_string(), NAN.to_string(), summary.total_millis().to_string()])?;
        for sample in &summary.samples {
            wtr.write_record([sample.json.to_string(), sample.xml.to_string(), NAN.to_string()])?;
        }
        wtr.flush().map_err(|source| ClientError::Output {
            path: path.clone(),
            source,
        })?;

        info!(size = %summary.size, path = %path.display(), rows = summary.len(), "results written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wirebench_model::{Latency, SampleResult};

    use super::*;

    #[test]
    fn writes_header_total_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let sink = CsvSink::new(&out);

        let summary = RunSummary::new(
            PayloadSizeClass::new("10kb").unwrap(),
            vec![
                SampleResult::new(Latency::Micros(120.5), Latency::Micros(200.0)),
                SampleResult::new(Latency::Failed, Latency::Micros(180.25)),
            ],
            Duration::from_micros(1_500),
        );
        sink.write(&summary).unwrap();

        let text = std::fs::read_to_string(out.join("10kb_Results.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "JsonRes,XmlRes,TotalTime",
                "NaN,NaN,1.5",
                "120.5,200,NaN",
                "NaN,180.25,NaN",
            ]
        );
    }

    #[test]
    fn unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let sink = CsvSink::new(blocker.join("nested"));
        let summary = RunSummary::new(
            PayloadSizeClass::new("10kb").unwrap(),
            Vec::new(),
            Duration::ZERO,
        );
        assert!(matches!(
            sink.write(&summary),
            Err(ClientError::Output { .. })
        ));
    }
}
