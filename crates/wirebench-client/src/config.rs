use std::{fmt, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use tokio::sync::Semaphore;
use wirebench_model::PayloadSizeClass;

use crate::{
    BatchDispatcher, ClientError, CsvSink, FsFixtures, HttpTransport, RunController, Transport,
};

/// How sample units are released to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchStrategy {
    /// `concurrency` permits; a new unit starts as soon as any unit finishes.
    #[default]
    Pipelined,
    /// Units launched in groups of `concurrency`; the next group waits for the whole previous group.
    Batched,
}

impl FromStr for DispatchStrategy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pipelined" | "semaphore" => Ok(DispatchStrategy::Pipelined),
            "batched" | "batch" => Ok(DispatchStrategy::Batched),
            _ => Err(ClientError::InvalidConfig(format!(
                "invalid dispatch strategy: '{s}' (valid: pipelined, batched)"
            ))),
        }
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchStrategy::Pipelined => "pipelined",
            DispatchStrategy::Batched => "batched",
        })
    }
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Scheme, host and port of the echo server, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// `None` keeps the client default.
    pub connect_timeout: Option<Duration>,
    /// `None` means no overall deadline; a hung request stalls its unit.
    pub request_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            connect_timeout: None,
            request_timeout: None,
            pool_max_idle_per_host: 64,
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> Result<(), ClientError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base url must start with http:// or https://, got '{url}'"
            )));
        }
        Ok(())
    }
}

/// Full benchmark run configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    pub sizes: Vec<PayloadSizeClass>,
    /// Sample pairs per size class.
    pub samples: usize,
    /// Max sample units in flight.
    pub concurrency: usize,
    pub strategy: DispatchStrategy,
    /// Pause between two size classes.
    pub cooldown: Duration,
    /// Directory holding `<size>_JSON.json` / `<size>_XML.xml`.
    pub data_dir: PathBuf,
    /// Directory receiving `<size>_Results.csv`.
    pub output_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            sizes: PayloadSizeClass::defaults(),
            samples: 1000,
            concurrency: 2,
            strategy: DispatchStrategy::default(),
            cooldown: Duration::from_secs(10),
            data_dir: PathBuf::from("test_data"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ClientError> {
        self.transport.validate()?;
        if !(1..=Semaphore::MAX_PERMITS).contains(&self.concurrency) {
            return Err(ClientError::InvalidConfig(format!(
                "concurrency must be between 1 and {}, got {}",
                Semaphore::MAX_PERMITS,
                self.concurrency
            )));
        }
        if self.sizes.is_empty() {
            return Err(ClientError::InvalidConfig(
                "at least one size class is required".into(),
            ));
        }
        Ok(())
    }

    /// Wire the HTTP transport, file fixtures and CSV output into a controller.
    pub fn build_controller(&self) -> Result<RunController<FsFixtures, CsvSink>, ClientError> {
        self.validate()?;

        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&self.transport)?);
        let dispatcher = BatchDispatcher::new(transport, self.concurrency, self.strategy);

        Ok(RunController::new(
            dispatcher,
            FsFixtures::new(&self.data_dir),
            CsvSink::new(&self.output_dir),
            self.samples,
        )
        .with_cooldown(self.cooldown))
    }
}
