use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use wirebench_client::{ClientConfig, DispatchStrategy, TransportConfig};
use wirebench_model::PayloadSizeClass;
use wirebench_observe::{ColorMode, LoggerConfig, LoggerFormat, logger_init};

/// Measure JSON and XML round-trip latency across payload size classes.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the server under test
    #[arg(long, env = "BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Size classes to run, comma separated. Defaults to 10kb through 15000kb.
    #[arg(long, value_delimiter = ',')]
    sizes: Vec<PayloadSizeClass>,

    /// Samples per size class
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Sample units in flight at once
    #[arg(long, default_value_t = 2)]
    concurrency: usize,

    /// `pipelined` refills a slot as soon as it frees; `batched` waits for the whole group
    #[arg(long, default_value = "pipelined")]
    strategy: DispatchStrategy,

    /// Pause between size classes
    #[arg(long, default_value_t = 10)]
    cooldown_secs: u64,

    /// Directory holding `<size>_JSON.json` and `<size>_XML.xml`
    #[arg(long, default_value = "test_data")]
    data_dir: PathBuf,

    /// Directory receiving `<size>_Results.csv`
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Per-request timeout; none by default
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// text | json | journald
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: LoggerFormat,

    /// auto | always | never
    #[arg(long, default_value = "auto")]
    log_color: ColorMode,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            transport: TransportConfig {
                base_url: self.base_url.clone(),
                request_timeout: self.request_timeout_ms.map(Duration::from_millis),
                connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
                ..Default::default()
            },
            sizes: if self.sizes.is_empty() {
                defaults.sizes
            } else {
                self.sizes.clone()
            },
            samples: self.samples,
            concurrency: self.concurrency,
            strategy: self.strategy,
            cooldown: Duration::from_secs(self.cooldown_secs),
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) Logger
    logger_init(
        &LoggerConfig::new(cli.log_format, cli.log_level.as_str()).with_color(cli.log_color),
    )?;

    // 2) Controller
    let cfg = cli.client_config();
    let controller = cfg
        .build_controller()
        .context("invalid client configuration")?;
    info!(
        base_url = %cfg.transport.base_url,
        sizes = cfg.sizes.len(),
        samples = cfg.samples,
        concurrency = cfg.concurrency,
        strategy = %cfg.strategy,
        "starting benchmark"
    );

    // 3) Run every size class
    let summaries = controller.run(&cfg.sizes).await?;

    let failures: usize = summaries.iter().map(|s| s.failures()).sum();
    info!(
        sizes = summaries.len(),
        failures,
        output = %cfg.output_dir.display(),
        "benchmark complete"
    );
    Ok(())
}
