use std::{fmt, iter::Sum, ops::Add, time::Duration};

/// Round-trip latency of one request, in microseconds.
///
/// `Failed` is the "not-a-number" sentinel for a request that produced no measurement.
/// It poisons every aggregate it takes part in: adding a failed latency to anything yields
/// a failed latency, and so does the mean of a sequence containing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Latency {
    /// Measured round trip.
    Micros(f64),
    /// Request failed; no measurement.
    Failed,
}

impl Latency {
    /// Build a measurement from a monotonic elapsed duration (sub-microsecond precision kept).
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Latency::Micros(elapsed.as_nanos() as f64 / 1_000.0)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Latency::Failed)
    }

    /// Arithmetic mean.
    ///
    /// Failed if any element failed or if the sequence is empty.
    pub fn mean<I>(values: I) -> Latency
    where
        I: IntoIterator<Item = Latency>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((Latency::Micros(0.0), 0usize), |(sum, count), v| {
                (sum + v, count + 1)
            });

        match (sum, count) {
            (_, 0) => Latency::Failed,
            (Latency::Micros(total), n) => Latency::Micros(total / n as f64),
            (Latency::Failed, _) => Latency::Failed,
        }
    }
}

impl Add for Latency {
    type Output = Latency;

    fn add(self, rhs: Latency) -> Latency {
        match (self, rhs) {
            (Latency::Micros(a), Latency::Micros(b)) => Latency::Micros(a + b),
            _ => Latency::Failed,
        }
    }
}

impl Sum for Latency {
    fn sum<I: Iterator<Item = Latency>>(iter: I) -> Latency {
        iter.fold(Latency::Micros(0.0), Add::add)
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Latency::Micros(v) => write!(f, "{v}"),
            Latency::Failed => f.write_str("NaN"),
        }
    }
}
