//! Load-generating side of wirebench.
//!
//! A [`RunController`] walks a list of size classes; for each one it loads the fixture pair,
//! lets a [`BatchDispatcher`] push `samples` timed (JSON, XML) request pairs through a
//! [`Transport`] with at most `concurrency` pairs in flight, and hands the resulting
//! [`RunSummary`](wirebench_model::RunSummary) to a [`ResultSink`].
mod error;
pub use error::{ClientError, TransportError};

mod config;
pub use config::{ClientConfig, DispatchStrategy, TransportConfig};

mod transport;
pub use transport::{HttpTransport, Transport};

mod dispatch;
pub use dispatch::BatchDispatcher;

mod fixture;
pub use fixture::{Fixture, FixtureSource, FsFixtures};

mod sink;
pub use sink::{CsvSink, ResultSink};

mod controller;
pub use controller::RunController;
