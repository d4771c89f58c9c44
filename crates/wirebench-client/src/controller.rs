use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use wirebench_model::{PayloadSizeClass, RunSummary};

use crate::{BatchDispatcher, ClientError, FixtureSource, ResultSink};

/// Runs size classes one after another and reports each to the sink.
pub struct RunController<F, S> {
    dispatcher: BatchDispatcher,
    fixtures: F,
    sink: S,
    samples: usize,
    cooldown: Duration,
}

impl<F, S> RunController<F, S>
where
    F: FixtureSource,
    S: ResultSink,
{
    pub fn new(dispatcher: BatchDispatcher, fixtures: F, sink: S, samples: usize) -> Self {
        Self {
            dispatcher,
            fixtures,
            sink,
            samples,
            cooldown: Duration::from_secs(10),
        }
    }

    /// Pause between two size classes so the server can settle.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Measure every size class, strictly sequentially.
    ///
    /// A fixture or sink error aborts the remaining run. Individual request failures never do.
    pub async fn run(&self, sizes: &[PayloadSizeClass]) -> Result<Vec<RunSummary>, ClientError> {
        let mut summaries = Vec::with_capacity(sizes.len());

        for (i, size) in sizes.iter().enumerate() {
            if i > 0 && !self.cooldown.is_zero() {
                info!(cooldown_ms = self.cooldown.as_millis() as u64, "cooling down");
                tokio::time::sleep(self.cooldown).await;
            }
            summaries.push(self.run_size(size).await?);
        }

        Ok(summaries)
    }

    #[instrument(level = "info", skip(self), fields(size = %size, samples = self.samples))]
    async fn run_size(&self, size: &PayloadSizeClass) -> Result<RunSummary, ClientError> {
        let fixture = self.fixtures.load(size)?;

        let started = Instant::now();
        let samples = self.dispatcher.run_samples(self.samples, &fixture).await;
        let total = started.elapsed();

        let summary = RunSummary::new(size.clone(), samples, total);
        let failures = summary.failures();
        if failures > 0 {
            warn!(failures, "some requests failed; averages are NaN");
        }
        info!(
            results = summary.len(),
            json_avg_us = %summary.json_average(),
            xml_avg_us = %summary.xml_average(),
            total_ms = summary.total_millis(),
            "size class finished"
        );

        self.sink.write(&summary)?;
        Ok(summary)
    }
}
