use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, instrument, warn};
use wirebench_model::{ContentKind, SampleResult};

use crate::{DispatchStrategy, Fixture, Transport};

/// Runs a fixed number of (JSON, XML) sample units with bounded concurrency.
///
/// Guarantees, whatever the transport does:
/// - exactly `samples` results, in sample-index order;
/// - never more than `concurrency` units in flight;
/// - a failed leg is recorded as [`Latency::Failed`](wirebench_model::Latency::Failed) and
///   never stops the remaining legs or samples.
pub struct BatchDispatcher {
    transport: Arc<dyn Transport>,
    concurrency: usize,
    strategy: DispatchStrategy,
}

impl BatchDispatcher {
    /// `concurrency` is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(transport: Arc<dyn Transport>, concurrency: usize, strategy: DispatchStrategy) -> Self {
        Self {
            transport,
            concurrency: concurrency.clamp(1, Semaphore::MAX_PERMITS),
            strategy,
        }
    }

    #[instrument(level = "debug", skip(self, fixture), fields(concurrency = self.concurrency, strategy = %self.strategy))]
    pub async fn run_samples(&self, samples: usize, fixture: &Fixture) -> Vec<SampleResult> {
        let mut slots: Vec<Option<SampleResult>> = vec![None; samples];

        match self.strategy {
            DispatchStrategy::Pipelined => self.pipelined(fixture, &mut slots).await,
            DispatchStrategy::Batched => self.batched(fixture, &mut slots).await,
        }

        let lost = slots.iter().filter(|s| s.is_none()).count();
        if lost > 0 {
            warn!(lost, "sample units did not report; recorded as failed");
        }
        slots
            .into_iter()
            .map(|s| s.unwrap_or_else(SampleResult::failed))
            .collect()
    }

    async fn pipelined(&self, fixture: &Fixture, slots: &mut [Option<SampleResult>]) {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for index in 0..slots.len() {
            // Never closed while this function holds it.
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let transport = Arc::clone(&self.transport);
            let fixture = fixture.clone();
            set.spawn(async move {
                let result = run_unit(transport.as_ref(), &fixture).await;
                drop(permit);
                (index, result)
            });
        }

        drain(&mut set, slots).await;
    }

    async fn batched(&self, fixture: &Fixture, slots: &mut [Option<SampleResult>]) {
        let total = slots.len();
        let mut set = JoinSet::new();

        for start in (0..total).step_by(self.concurrency) {
            let end = start.saturating_add(self.concurrency).min(total);
            for index in start..end {
                let transport = Arc::clone(&self.transport);
                let fixture = fixture.clone();
                set.spawn(async move { (index, run_unit(transport.as_ref(), &fixture).await) });
            }
            drain(&mut set, slots).await;
            debug!(start, end, "batch settled");
        }
    }
}

/// JSON leg first, then XML, strictly sequential.
async fn run_unit(transport: &dyn Transport, fixture: &Fixture) -> SampleResult {
    let json = transport
        .send(ContentKind::Json.path(), fixture.json.clone(), ContentKind::Json)
        .await;
    let xml = transport
        .send(ContentKind::Xml.path(), fixture.xml.clone(), ContentKind::Xml)
        .await;
    SampleResult::new(json, xml)
}

async fn drain(set: &mut JoinSet<(usize, SampleResult)>, slots: &mut [Option<SampleResult>]) {
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!(error = %e, "sample unit aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use bytes::Bytes;
    use wirebench_model::Latency;

    use super::*;

    /// Tracks concurrently active calls and the order of legs.
    #[derive(Default)]
    struct Recorder {
        active: AtomicUsize,
        peak: AtomicUsize,
        json_calls: AtomicUsize,
        legs: Mutex<Vec<ContentKind>>,
        fail: bool,
        delay_ms: u64,
    }

    impl Recorder {
        fn ok(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay_ms,
                ..Default::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                delay_ms: 1,
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, _endpoint: &str, _body: Bytes, kind: ContentKind) -> Latency {
            let ordinal = match kind {
                ContentKind::Json => self.json_calls.fetch_add(1, Ordering::SeqCst),
                ContentKind::Xml => 0,
            };
            self.legs.lock().unwrap().push(kind);

            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Earlier units sleep longer so completion order differs from start order.
            let jitter = 4u64.saturating_sub(ordinal as u64 % 4);
            tokio::time::sleep(Duration::from_millis(self.delay_ms + jitter)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                Latency::Failed
            } else {
                Latency::Micros(ordinal as f64)
            }
        }
    }

    fn fixture() -> Fixture {
        Fixture::new(Bytes::from_static(b"{}"), Bytes::from_static(b"<a/>"))
    }

    async fn run(recorder: &Arc<Recorder>, samples: usize, k: usize, s: DispatchStrategy) -> Vec<SampleResult> {
        let transport: Arc<dyn Transport> = Arc::clone(recorder) as Arc<dyn Transport>;
        BatchDispatcher::new(transport, k, s)
            .run_samples(samples, &fixture())
            .await
    }

    #[tokio::test]
    async fn returns_exactly_sample_count_in_index_order() {
        for strategy in [DispatchStrategy::Pipelined, DispatchStrategy::Batched] {
            let rec = Recorder::ok(1);
            let results = run(&rec, 11, 3, strategy).await;

            assert_eq!(results.len(), 11, "{strategy}");
            for (i, r) in results.iter().enumerate() {
                assert_eq!(r.json, Latency::Micros(i as f64), "{strategy} sample {i}");
            }
        }
    }

    #[tokio::test]
    async fn never_exceeds_concurrency_limit() {
        for strategy in [DispatchStrategy::Pipelined, DispatchStrategy::Batched] {
            let rec = Recorder::ok(2);
            run(&rec, 20, 3, strategy).await;

            let peak = rec.peak.load(Ordering::SeqCst);
            assert!(peak <= 3, "{strategy}: peak {peak}");
            assert_eq!(peak, 3, "{strategy}: limit should be reached");
        }
    }

    #[tokio::test]
    async fn limit_of_one_is_sequential() {
        let rec = Recorder::ok(1);
        run(&rec, 4, 1, DispatchStrategy::Pipelined).await;

        assert_eq!(rec.peak.load(Ordering::SeqCst), 1);
        let legs = rec.legs.lock().unwrap().clone();
        assert_eq!(
            legs,
            [ContentKind::Json, ContentKind::Xml].repeat(4),
            "json leg precedes xml leg in every sample"
        );
    }

    #[tokio::test]
    async fn always_failing_transport_yields_nan_pairs() {
        for strategy in [DispatchStrategy::Pipelined, DispatchStrategy::Batched] {
            let rec = Recorder::failing();
            let results = run(&rec, 7, 2, strategy).await;

            assert_eq!(results.len(), 7);
            assert!(results.iter().all(|r| *r == SampleResult::failed()));
            assert_eq!(rec.json_calls.load(Ordering::SeqCst), 7, "every sample attempted");
        }
    }

    #[tokio::test]
    async fn zero_samples_is_empty() {
        let rec = Recorder::ok(0);
        let results = run(&rec, 0, 2, DispatchStrategy::Pipelined).await;
        assert!(results.is_empty());
        assert_eq!(rec.json_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn out_of_range_limits_are_clamped() {
        for strategy in [DispatchStrategy::Pipelined, DispatchStrategy::Batched] {
            let rec = Recorder::ok(0);
            assert_eq!(run(&rec, 3, 0, strategy).await.len(), 3, "{strategy}");
            assert_eq!(rec.peak.load(Ordering::SeqCst), 1, "{strategy}");

            let rec = Recorder::ok(0);
            assert_eq!(run(&rec, 2, usize::MAX, strategy).await.len(), 2, "{strategy}");
        }
    }
}
