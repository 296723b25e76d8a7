mod collector;

use std::{sync::Arc, time::Duration};

use clap::Parser;
use promex_exporter::{ExporterConfig, GaugeSpelling};
use promex_metrics::Registry;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::collector::ProcessCollector;

#[derive(Parser)]
#[command(name = "promex", about = "Prometheus exporter for in-process runtime metrics")]
struct Cli {
    #[arg(long, env = "PROMEX_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "PROMEX_PORT", default_value = "6060")]
    port: u16,

    #[arg(long, env = "PROMEX_READ_TIMEOUT_SECS", default_value = "5")]
    read_timeout_secs: u64,

    #[arg(long, env = "PROMEX_WRITE_TIMEOUT_SECS", default_value = "10")]
    write_timeout_secs: u64,

    /// Write `gauge` instead of the legacy `gauage` type tag.
    #[arg(long, env = "PROMEX_STANDARD_GAUGE_TYPE", default_value_t = false)]
    standard_gauge_type: bool,

    #[arg(long, env = "PROMEX_REFRESH_INTERVAL_SECS", default_value = "15")]
    refresh_interval_secs: u64,

    #[arg(long, env = "PROMEX_LOG_JSON", default_value_t = false)]
    log_json: bool,
}

impl Cli {
    fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig {
            addr: format!("{}:{}", self.host, self.port),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            write_timeout: Duration::from_secs(self.write_timeout_secs),
            gauge_spelling: if self.standard_gauge_type {
                GaugeSpelling::Standard
            } else {
                GaugeSpelling::Legacy
            },
            ..ExporterConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::from_default_env()
        .add_directive("promex=info".parse()?);
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let registry = Arc::new(Registry::new());
    let collector = Arc::new(ProcessCollector::register(&registry)?);
    collector.refresh();
    let refresh_interval = Duration::from_secs(cli.refresh_interval_secs.max(1));
    let _refresh_task = collector.spawn_refresh(refresh_interval);
    info!(
        metrics = registry.len(),
        interval_secs = cli.refresh_interval_secs,
        "process collector enabled"
    );

    promex_exporter::run(registry, cli.exporter_config()).await?;

    Ok(())
}
