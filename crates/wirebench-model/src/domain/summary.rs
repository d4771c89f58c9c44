use std::time::Duration;

use crate::{Latency, PayloadSizeClass, SampleResult};

/// Outcome of one size class run: every sample in index order plus the wall-clock total.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub size: PayloadSizeClass,
    pub samples: Vec<SampleResult>,
    pub total: Duration,
}

impl RunSummary {
    pub fn new(size: PayloadSizeClass, samples: Vec<SampleResult>, total: Duration) -> Self {
        Self {
            size,
            samples,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean JSON latency; failed if any JSON leg failed.
    pub fn json_average(&self) -> Latency {
        Latency::mean(self.samples.iter().map(|s| s.json))
    }

    /// Mean XML latency; failed if any XML leg failed.
    pub fn xml_average(&self) -> Latency {
        Latency::mean(self.samples.iter().map(|s| s.xml))
    }

    /// Number of failed legs across all samples.
    pub fn failures(&self) -> usize {
        self.samples.iter().map(SampleResult::failures).sum()
    }

    /// Total run time in fractional milliseconds.
    pub fn total_millis(&self) -> f64 {
        self.total.as_nanos() as f64 / 1_000_000.0
    }
}
