use crate::Latency;

/// Timings of one sample: the JSON leg followed by the XML leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResult {
    pub json: Latency,
    pub xml: Latency,
}

impl SampleResult {
    pub fn new(json: Latency, xml: Latency) -> Self {
        Self { json, xml }
    }

    /// Sample whose both legs produced no measurement.
    pub fn failed() -> Self {
        Self::new(Latency::Failed, Latency::Failed)
    }

    /// Number of failed legs (0..=2).
    pub fn failures(&self) -> usize {
        usize::from(self.json.is_failed()) + usize::from(self.xml.is_failed())
    }
}
